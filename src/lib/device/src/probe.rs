use crate::device::{DeviceHandle, DmFlags};
use crate::error::ErrorKind;
use crate::platdata::{alloc_block, free_block};

/// Activates `device`, probing its ancestors first if they are not already
/// active. Idempotent: a device that is already `ACTIVATED` returns
/// immediately.
pub(crate) fn probe<N: Copy>(mut device: DeviceHandle<N>) -> Result<(), ErrorKind> {
    if device.is_activated() {
        return Ok(());
    }
    if let Some(parent) = device.parent() {
        probe(parent)?;
        if let Some(child_pre_probe) = parent.driver().ops.child_pre_probe {
            child_pre_probe(device.get_mut())?;
        }
    }

    let driver = device.driver();
    let class_ptr = device.get_mut().class_ptr();

    let priv_block = if driver.priv_size > 0 {
        alloc_block(driver.priv_size)?
    } else {
        None
    };
    let plat_block = if device.plat().is_none() && driver.plat_size > 0 {
        alloc_block(driver.plat_size)?
    } else {
        None
    };
    let parent_priv_block = match device.parent() {
        Some(parent) if parent.driver().per_child_size > 0 => {
            alloc_block(parent.driver().per_child_size)?
        }
        _ => None,
    };
    let class_priv_block = match class_ptr {
        Some(ptr) => {
            let per_device_size = unsafe { ptr.as_ref() }.driver().per_device_size;
            if per_device_size > 0 {
                alloc_block(per_device_size)?
            } else {
                None
            }
        }
        None => None,
    };

    // On failure every block allocated for this attempt is freed and the
    // device's pointers are reset to `None` (rather than left dangling), so
    // a retried `probe` re-allocates from scratch instead of reusing freed
    // memory or double-freeing it during `uninit`.
    let rollback = |device: &mut DeviceHandle<N>| {
        if priv_block.is_some() {
            free_block(priv_block, driver.priv_size);
            device.get_mut().set_priv(None);
        }
        if plat_block.is_some() {
            free_block(plat_block, driver.plat_size);
            device.get_mut().set_plat(None);
            device.get_mut().set_plat_owned(false);
        }
        if parent_priv_block.is_some() {
            if let Some(parent) = device.parent() {
                free_block(parent_priv_block, parent.driver().per_child_size);
            }
            device.get_mut().set_parent_priv(None);
        }
        if let Some(ptr) = class_ptr {
            if class_priv_block.is_some() {
                let per_device_size = unsafe { ptr.as_ref() }.driver().per_device_size;
                free_block(class_priv_block, per_device_size);
                device.get_mut().set_class_priv(None);
            }
        }
    };

    if priv_block.is_some() {
        device.get_mut().set_priv(priv_block);
    }
    if plat_block.is_some() {
        device.get_mut().set_plat(plat_block);
        device.get_mut().set_plat_owned(true);
    }
    if parent_priv_block.is_some() {
        device.get_mut().set_parent_priv(parent_priv_block);
    }
    if class_priv_block.is_some() {
        device.get_mut().set_class_priv(class_priv_block);
    }

    if let Some(ptr) = class_ptr {
        if let Some(pre_probe) = unsafe { ptr.as_ref() }.driver().ops.pre_probe {
            if let Err(kind) = pre_probe(device.get_mut()) {
                rollback(&mut device);
                return Err(kind);
            }
        }
    }

    if let Some(probe_hook) = driver.ops.probe {
        if let Err(kind) = probe_hook(device.get_mut()) {
            rollback(&mut device);
            return Err(kind);
        }
    }

    if let Some(ptr) = class_ptr {
        if let Some(post_probe) = unsafe { ptr.as_ref() }.driver().ops.post_probe {
            if let Err(kind) = post_probe(device.get_mut()) {
                rollback(&mut device);
                return Err(kind);
            }
        }
    }

    device.get_mut().insert_flags(DmFlags::ACTIVATED);
    Ok(())
}

/// Frees every data block `probe` allocated for `device` (the driver's
/// `priv`, `parent_priv`, `class_priv`, and `plat` only if it was
/// core-allocated rather than supplied by a static descriptor). Called
/// during teardown, after the driver's `remove` hook has run.
pub(crate) fn free_device_blocks<N: Copy>(mut device: DeviceHandle<N>) {
    let driver = device.driver();
    free_block(device.priv_data(), driver.priv_size);
    device.get_mut().set_priv(None);

    if device.is_plat_owned() {
        free_block(device.plat(), driver.plat_size);
        device.get_mut().set_plat(None);
        device.get_mut().set_plat_owned(false);
    }

    if let Some(parent) = device.parent() {
        free_block(device.parent_priv(), parent.driver().per_child_size);
    }
    device.get_mut().set_parent_priv(None);

    if let Some(class_ptr) = device.get_mut().class_ptr() {
        let per_device_size = unsafe { class_ptr.as_ref() }.driver().per_device_size;
        free_block(device.class_priv(), per_device_size);
    }
    device.get_mut().set_class_priv(None);
}

/// Depth-first walk that probes every device reachable from `root`,
/// descending into children regardless of whether the current device's
/// probe succeeded: a failed leaf must not block its siblings' activation.
pub(crate) fn probe_tree<N: Copy>(
    root: DeviceHandle<N>,
    pre_reloc_only: bool,
) -> Result<(), ErrorKind> {
    let mut first_error = None;
    probe_tree_inner(root, pre_reloc_only, &mut first_error);
    match first_error {
        Some(kind) => Err(kind),
        None => Ok(()),
    }
}

fn probe_tree_inner<N: Copy>(
    device: DeviceHandle<N>,
    pre_reloc_only: bool,
    first_error: &mut Option<ErrorKind>,
) {
    let gated = pre_reloc_only && !device.flags().contains(DmFlags::PRE_RELOC);
    if !gated && device.flags().contains(DmFlags::PROBE_AFTER_BIND) {
        if let Err(kind) = probe(device) {
            if first_error.is_none() {
                *first_error = Some(kind);
            }
        }
    }
    for child in device.children() {
        probe_tree_inner(child, pre_reloc_only, first_error);
    }
}
