use alloc::vec::Vec;

use crate::binder::{log_non_benign, BindCtx, Refused};
use crate::device::DeviceHandle;
use crate::error::ErrorKind;
#[cfg(feature = "hdt")]
use crate::hdt::HdtCursor;

/// Static descriptors tried more than this many times without resolving a
/// parent are considered cyclic. Chosen to match the maximum HDT depth the
/// core commits to supporting.
const MAX_PASSES: u32 = 10;

/// Runs the fixed-point static-descriptor binder described in the binder's
/// multi-pass contract: each pass binds every descriptor whose parent slot
/// is already filled, and the outer loop retries until no pass reports a
/// pending parent or the pass budget is exhausted.
pub(crate) fn scan_static_descriptors<N: Copy>(
    ctx: &mut BindCtx<N>,
    root: DeviceHandle<N>,
) -> Result<(), ErrorKind> {
    let count = ctx.registry.descriptor_count();
    let mut slots: Vec<Option<DeviceHandle<N>>> = alloc::vec![None; count];

    for _pass in 0..MAX_PASSES {
        let mut missing_parent = false;
        let mut first_no_driver: Option<ErrorKind> = None;
        let mut first_other: Option<ErrorKind> = None;

        for idx in 0..count {
            if slots[idx].is_some() {
                continue;
            }
            let descriptor = ctx
                .registry
                .descriptor(idx)
                .expect("idx < descriptor_count");

            let parent = match descriptor.parent_idx {
                None => Some(root),
                Some(p) => {
                    if p >= count {
                        if first_other.is_none() {
                            first_other = Some(ErrorKind::BadDescriptor);
                        }
                        continue;
                    }
                    match slots[p] {
                        Some(parent_handle) => Some(parent_handle),
                        None => {
                            missing_parent = true;
                            continue;
                        }
                    }
                }
            };

            match ctx.bind_by_descriptor(parent, descriptor, idx) {
                Ok(Ok(handle)) => slots[idx] = Some(handle),
                Ok(Err(Refused)) => {}
                Err(ErrorKind::NoDriver) => {
                    if first_no_driver.is_none() {
                        first_no_driver = Some(ErrorKind::NoDriver);
                    }
                }
                Err(kind) => {
                    log_non_benign("static descriptor bind", kind);
                    if first_other.is_none() {
                        first_other = Some(kind);
                    }
                }
            }
        }

        if let Some(kind) = first_other {
            return Err(kind);
        }
        if !missing_parent {
            return match first_no_driver {
                Some(kind) => Err(kind),
                None => Ok(()),
            };
        }
    }

    Err(ErrorKind::Cycle)
}

/// Walks the immediate children of `node`, binding one device per enabled
/// subnode via compatible-string matching. Does not recurse; deeper scans
/// are the caller's responsibility via [`scan_subtree_of`].
#[cfg(feature = "hdt")]
pub(crate) fn scan_hdt<N: Copy, C: HdtCursor<Node = N>>(
    ctx: &mut BindCtx<N>,
    cursor: &C,
    parent: DeviceHandle<N>,
    node: N,
    pre_reloc_only: bool,
) -> Result<(), ErrorKind> {
    let mut first_error = None;
    let mut child = cursor.first_subnode(node);
    while let Some(subnode) = child {
        if cursor.is_enabled(subnode) {
            match ctx.bind_hdt_node(cursor, Some(parent), subnode, None, pre_reloc_only) {
                Ok(_) => {}
                Err(kind) => {
                    log_non_benign("hdt bind", kind);
                    if first_error.is_none() {
                        first_error = Some(kind);
                    }
                }
            }
        }
        child = cursor.next_subnode(subnode);
    }
    match first_error {
        Some(kind) => Err(kind),
        None => Ok(()),
    }
}

/// Binds every device reachable from `device`'s associated HDT node one
/// level deep. Used by drivers that declare a dynamic child domain (e.g. a
/// bus controller whose children are discovered, not statically known).
#[cfg(feature = "hdt")]
pub(crate) fn scan_subtree_of<N: Copy, C: HdtCursor<Node = N>>(
    ctx: &mut BindCtx<N>,
    cursor: &C,
    device: DeviceHandle<N>,
    pre_reloc_only: bool,
) -> Result<(), ErrorKind> {
    let Some(node) = device.node() else {
        return Ok(());
    };
    scan_hdt(ctx, cursor, device, node, pre_reloc_only)
}

/// Well-known auxiliary HDT paths that hold devices but are not devices
/// themselves, scanned as additional roots alongside the top-level walk.
#[cfg(feature = "hdt")]
const EXTENDED_ROOTS: &[&str] = &["/chosen", "/clocks", "/firmware"];

#[cfg(feature = "hdt")]
pub(crate) fn extended_scan<N: Copy, C: HdtCursor<Node = N>>(
    ctx: &mut BindCtx<N>,
    cursor: &C,
    root: DeviceHandle<N>,
    pre_reloc_only: bool,
) -> Result<(), ErrorKind> {
    let mut first_error = None;

    if let Err(kind) = scan_hdt(ctx, cursor, root, cursor.root_node(), pre_reloc_only) {
        first_error = Some(kind);
    }

    for path in EXTENDED_ROOTS {
        if let Some(node) = cursor.path(path) {
            if let Err(kind) = scan_hdt(ctx, cursor, root, node, pre_reloc_only) {
                if first_error.is_none() {
                    first_error = Some(kind);
                }
            }
        }
    }

    match first_error {
        Some(kind) => Err(kind),
        None => Ok(()),
    }
}
