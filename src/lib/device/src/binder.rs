use alloc::string::ToString;
use core::ptr::NonNull;

use crate::arena::DeviceArena;
use crate::class_id::ClassId;
use crate::device::{Device, DeviceHandle, DmFlags, Driver};
use crate::error::{is_benign, ErrorKind};
use crate::registry::{DrvInfo, Registry};
use crate::uclass::UclassRegistry;

/// Distinguished outcome of a bind attempt: the driver declined rather than
/// failing. Callers downstream (the scanner) treat this as "no device, no
/// error" rather than propagating it.
pub(crate) struct Refused;

/// Bundles the three pieces of binder state that do not belong to a single
/// device: the arena that owns storage, the uclass registry, and the
/// read-only driver/descriptor tables. Borrowed for the duration of one
/// bind call.
pub(crate) struct BindCtx<'a, N: Copy> {
    pub(crate) arena: &'a mut DeviceArena<N>,
    pub(crate) uclasses: &'a mut UclassRegistry<N>,
    pub(crate) registry: &'a Registry<N>,
}

impl<'a, N: Copy> BindCtx<'a, N> {
    /// Core binder primitive. Allocates a device record, links it into the
    /// parent's child list and its uclass's member list, then runs the
    /// driver's `bind` hook. On `REFUSED` the device is torn back out and
    /// `Ok(Err(Refused))` is returned so callers can distinguish "driver
    /// declined" from "no device attempted". Any other hook failure also
    /// tears the device down and propagates.
    pub(crate) fn bind_with_driver(
        &mut self,
        parent: Option<DeviceHandle<N>>,
        driver: &'static Driver<N>,
        name: &str,
        node: Option<N>,
        driver_data: u32,
        plat: Option<NonNull<u8>>,
        slot: Option<usize>,
    ) -> Result<Result<DeviceHandle<N>, Refused>, ErrorKind> {
        let parent_ptr = parent.map(|p| p.ptr);
        let mut device = Device::new(
            name.to_string(),
            driver,
            parent_ptr,
            node,
            driver_data,
            slot,
        );
        if let Some(p) = plat {
            device.set_plat(Some(p));
        }

        let mut handle = self.arena.insert(device);

        if let Some(mut parent_handle) = parent {
            parent_handle.get_mut().push_child(handle.ptr);
        }

        let mut class_ptr = self
            .uclasses
            .get_or_create(driver.uclass_id, self.registry)?;
        handle.get_mut().set_class(class_ptr);
        // Safety: get_or_create returns a pointer into storage owned by
        // `self.uclasses`, which outlives this call and is not aliased
        // elsewhere during it.
        unsafe { class_ptr.as_mut() }.push_member(handle.ptr);

        if let Some(bind) = driver.ops.bind {
            if let Err(kind) = bind(handle.get_mut()) {
                self.unwind(handle, parent_ptr, driver.uclass_id);
                if kind == ErrorKind::Refused {
                    return Ok(Err(Refused));
                }
                return Err(kind);
            }
        }

        handle.get_mut().insert_flags(DmFlags::BOUND);
        if driver.flags.contains(DmFlags::PROBE_AFTER_BIND) {
            handle.get_mut().insert_flags(DmFlags::PROBE_AFTER_BIND);
        }
        if driver.flags.contains(DmFlags::PRE_RELOC) {
            handle.get_mut().insert_flags(DmFlags::PRE_RELOC);
        }

        if let Some(parent_handle) = parent {
            if let Some(child_post_bind) = parent_handle.driver().ops.child_post_bind {
                if let Err(kind) = child_post_bind(handle.get_mut()) {
                    self.unwind(handle, parent_ptr, driver.uclass_id);
                    return Err(kind);
                }
            }
        }

        Ok(Ok(handle))
    }

    /// Tears a partially-bound device back out: removes it from its
    /// parent's child list and its uclass's member list. The storage slot in
    /// the arena is intentionally leaked until `uninit`, matching the rest
    /// of the core's "arena only shrinks all at once" discipline.
    fn unwind(&mut self, handle: DeviceHandle<N>, parent: Option<NonNull<Device<N>>>, id: ClassId) {
        self.uclasses.drop_member(id, handle.ptr);
        if let Some(mut parent_ptr) = parent {
            unsafe { parent_ptr.as_mut() }.remove_child(handle.ptr);
        }
    }

    pub(crate) fn bind_by_descriptor(
        &mut self,
        parent: Option<DeviceHandle<N>>,
        descriptor: &DrvInfo,
        slot: usize,
    ) -> Result<Result<DeviceHandle<N>, Refused>, ErrorKind> {
        let driver = self
            .registry
            .lookup_driver_by_name(descriptor.driver_name)
            .map_err(|_| ErrorKind::NoDriver)?;
        let plat = descriptor.plat.map(NonNull::from);
        self.bind_with_driver(
            parent,
            driver,
            descriptor.driver_name,
            None,
            0,
            plat,
            Some(slot),
        )
    }

    pub(crate) fn bind_by_name(
        &mut self,
        parent: Option<DeviceHandle<N>>,
        drv_name: &str,
        dev_name: &str,
        node: Option<N>,
    ) -> Result<Result<DeviceHandle<N>, Refused>, ErrorKind> {
        let driver = self.registry.lookup_driver_by_name(drv_name)?;
        self.bind_with_driver(parent, driver, dev_name, node, 0, None, None)
    }
}

pub(crate) fn log_non_benign(context: &str, kind: ErrorKind) {
    if is_benign(kind) {
        log::warn!("{context}: {kind}");
    } else {
        log::error!("{context}: {kind}");
    }
}
