use alloc::vec::Vec;

use crate::arena::DeviceArena;
use crate::binder::BindCtx;
use crate::device::{DeviceHandle, DmFlags, DmRemove};
use crate::error::ErrorKind;
use crate::event::{EventSink, EventTag};
#[cfg(feature = "hdt")]
use crate::hdt::HdtCursor;
use crate::probe::{free_device_blocks, probe, probe_tree};
use crate::registry::Registry;
use crate::scanner::scan_static_descriptors;
#[cfg(feature = "hdt")]
use crate::scanner::{extended_scan, scan_hdt};
use crate::uclass::UclassRegistry;

/// Raw device and uclass counts, as reported to external diagnostic commands.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Stats {
    pub device_count: usize,
    pub uclass_count: usize,
}

/// Byte counts for each kind of per-device data block the probe engine
/// allocates. Formatting this for a shell command is the caller's job.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Default)]
pub struct MemoryStats {
    pub plat_bytes: usize,
    pub priv_bytes: usize,
    pub parent_priv_bytes: usize,
    pub class_priv_bytes: usize,
}

/// Owns the whole runtime device tree: the device arena, the live uclass
/// registry, and the root device that anchors both. Exactly one `Dm` exists
/// between a successful `init` and the matching `uninit`.
///
/// The core never mutates `registry`; it is read-only for the instance's
/// entire lifetime, matching the "driver/uclass-driver/descriptor tables are
/// process-wide, never mutated" ownership note.
pub struct Dm<N: Copy> {
    registry: &'static Registry<N>,
    arena: DeviceArena<N>,
    uclasses: UclassRegistry<N>,
    root: Option<DeviceHandle<N>>,
}

// SAFETY: every method that touches `arena`, `uclasses`, or `root` takes
// `&mut self`, so the borrow checker already forbids concurrent access from
// within a single address space. The only reason a board needs `Dm<N>: Send`
// at all is to place one instance in a `static` behind its own
// `spin::Mutex` so it can be reached from interrupt or early-boot contexts
// that are not lexically the same stack frame as `init`; the mutex is what
// keeps that access exclusive, matching the "single control thread" model.
unsafe impl<N: Copy> Send for Dm<N> {}

impl<N: Copy> Dm<N> {
    pub const fn new(registry: &'static Registry<N>) -> Self {
        Self {
            registry,
            arena: DeviceArena::new(),
            uclasses: UclassRegistry::new(),
            root: None,
        }
    }

    fn ctx(&mut self) -> BindCtx<'_, N> {
        BindCtx {
            arena: &mut self.arena,
            uclasses: &mut self.uclasses,
            registry: self.registry,
        }
    }

    pub fn root(&self) -> Option<DeviceHandle<N>> {
        self.root
    }

    /// Creates the virtual root device from `root_driver_name`, rejecting a
    /// second call while a root already exists. Probes the root before
    /// returning it: dynamic-mode `init` binds, attaches the HDT root node
    /// (not modeled here — this core's root is never HDT-backed), and probes
    /// the root unconditionally, rather than leaving root activation to
    /// depend on the root driver happening to carry `PROBE_AFTER_BIND`.
    pub fn init(&mut self, root_driver_name: &str) -> Result<DeviceHandle<N>, ErrorKind> {
        if self.root.is_some() {
            return Err(ErrorKind::AlreadyInitialized);
        }
        let driver = self.registry.lookup_driver_by_name(root_driver_name)?;
        let handle = match self
            .ctx()
            .bind_with_driver(None, driver, root_driver_name, None, 0, None, None)?
        {
            Ok(handle) => handle,
            Err(_refused) => return Err(ErrorKind::Refused),
        };
        self.root = Some(handle);
        probe(handle)?;
        Ok(handle)
    }

    pub fn scan_static_descriptors(&mut self) -> Result<(), ErrorKind> {
        let root = self.root.ok_or(ErrorKind::NotFound)?;
        let mut ctx = self.ctx();
        scan_static_descriptors(&mut ctx, root)
    }

    #[cfg(feature = "hdt")]
    pub fn scan_hdt_root<C: HdtCursor<Node = N>>(
        &mut self,
        cursor: &C,
        pre_reloc_only: bool,
    ) -> Result<(), ErrorKind> {
        let root = self.root.ok_or(ErrorKind::NotFound)?;
        let mut ctx = self.ctx();
        scan_hdt(&mut ctx, cursor, root, cursor.root_node(), pre_reloc_only)
    }

    #[cfg(feature = "hdt")]
    pub fn extended_scan<C: HdtCursor<Node = N>>(
        &mut self,
        cursor: &C,
        pre_reloc_only: bool,
    ) -> Result<(), ErrorKind> {
        let root = self.root.ok_or(ErrorKind::NotFound)?;
        let mut ctx = self.ctx();
        extended_scan(&mut ctx, cursor, root, pre_reloc_only)
    }

    pub fn probe(&mut self, device: DeviceHandle<N>) -> Result<(), ErrorKind> {
        probe(device)
    }

    pub fn probe_tree(&mut self, pre_reloc_only: bool) -> Result<(), ErrorKind> {
        let root = self.root.ok_or(ErrorKind::NotFound)?;
        probe_tree(root, pre_reloc_only)
    }

    /// Convenience orchestration: `init`, the static-descriptor pass, the
    /// HDT passes (when an HDT cursor is supplied and the `hdt` feature is
    /// on), `probe_tree`, then a single event notification. This is the one
    /// entry point a board's bring-up code is expected to call; every step
    /// it composes stays available individually for boards that need a
    /// different sequencing.
    #[cfg(feature = "hdt")]
    pub fn init_and_scan<C: HdtCursor<Node = N>>(
        &mut self,
        root_driver_name: &str,
        cursor: Option<&C>,
        pre_reloc_only: bool,
        sink: &dyn EventSink,
    ) -> Result<(), ErrorKind> {
        self.init(root_driver_name)?;
        self.scan_static_descriptors()?;
        if let Some(cursor) = cursor {
            self.scan_hdt_root(cursor, pre_reloc_only)?;
            self.extended_scan(cursor, pre_reloc_only)?;
        }
        self.probe_tree(pre_reloc_only)?;

        let tag = if pre_reloc_only {
            EventTag::PreRelocation
        } else {
            EventTag::PostRelocation
        };
        sink.notify(tag)
    }

    #[cfg(not(feature = "hdt"))]
    pub fn init_and_scan(
        &mut self,
        root_driver_name: &str,
        pre_reloc_only: bool,
        sink: &dyn EventSink,
    ) -> Result<(), ErrorKind> {
        self.init(root_driver_name)?;
        self.scan_static_descriptors()?;
        self.probe_tree(pre_reloc_only)?;

        let tag = if pre_reloc_only {
            EventTag::PreRelocation
        } else {
            EventTag::PostRelocation
        };
        sink.notify(tag)
    }

    pub fn get_stats(&self) -> Stats {
        Stats {
            device_count: self.arena.len(),
            uclass_count: self.uclasses.count(),
        }
    }

    pub fn get_memory_stats(&self) -> MemoryStats {
        let mut stats = MemoryStats::default();
        for handle in self.arena.iter() {
            let driver = handle.driver();
            if handle.plat().is_some() {
                stats.plat_bytes += driver.plat_size;
            }
            if handle.priv_data().is_some() {
                stats.priv_bytes += driver.priv_size;
            }
            if handle.parent_priv().is_some() {
                if let Some(parent) = handle.parent() {
                    stats.parent_priv_bytes += parent.driver().per_child_size;
                }
            }
            if handle.class_priv().is_some() {
                if let Some(class_ptr) = handle.get().class_ptr() {
                    stats.class_priv_bytes += unsafe { class_ptr.as_ref() }.driver().per_device_size;
                }
            }
        }
        stats
    }

    fn post_order(&self, root: DeviceHandle<N>) -> Vec<DeviceHandle<N>> {
        let mut order = Vec::new();
        fn walk<N: Copy>(device: DeviceHandle<N>, order: &mut Vec<DeviceHandle<N>>) {
            for child in device.children() {
                walk(child, order);
            }
            order.push(device);
        }
        walk(root, &mut order);
        order
    }

    fn remove_one(&mut self, mut device: DeviceHandle<N>, flag: DmRemove) {
        if !device.is_activated() {
            return;
        }
        if let Some(class_ptr) = device.get_mut().class_ptr() {
            if let Some(pre_remove) = unsafe { class_ptr.as_ref() }.driver().ops.pre_remove {
                let _ = pre_remove(device.get_mut());
            }
        }
        if let Some(remove) = device.driver().ops.remove {
            let _ = remove(device.get_mut(), flag);
        }
        device.get_mut().remove_flags(DmFlags::ACTIVATED);
        free_device_blocks(device);
    }

    fn unbind_one(&mut self, mut device: DeviceHandle<N>) {
        if !device.is_bound() {
            return;
        }
        if let Some(unbind) = device.driver().ops.unbind {
            let _ = unbind(device.get_mut());
        }
        let id = device.driver().uclass_id;
        self.uclasses.drop_member(id, device.ptr);
        if let Some(mut parent) = device.parent() {
            parent.get_mut().remove_child(device.ptr);
        }
        device.get_mut().remove_flags(DmFlags::BOUND);
    }

    /// Tears down the entire tree: `remove` hooks run post-order, non-vital
    /// devices first, then every remaining device; `unbind` hooks then run
    /// post-order. A no-op (returns `Ok`) if no root exists, so a repeated
    /// `uninit` is harmless.
    pub fn uninit(&mut self) -> Result<(), ErrorKind> {
        let Some(root) = self.root else {
            return Ok(());
        };
        let order = self.post_order(root);

        for &handle in &order {
            if !handle.flags().contains(DmFlags::VITAL) {
                self.remove_one(handle, DmRemove::NonVital);
            }
        }
        for &handle in &order {
            self.remove_one(handle, DmRemove::Normal);
        }
        for &handle in &order {
            self.unbind_one(handle);
        }

        self.uclasses.clear();
        self.arena.clear();
        self.root = None;
        Ok(())
    }
}
