use alloc::vec::Vec;
use core::ptr::NonNull;

use crate::class_id::ClassId;
use crate::device::{Device, DeviceHandle};
use crate::error::ErrorKind;

/// Hook table for a [`ClassDriver`]. Each hook is optional; absence is a
/// no-op success.
pub struct ClassHooks<N: Copy> {
    /// Called once, when the uclass is created for its first member.
    pub init: Option<fn() -> Result<(), ErrorKind>>,
    /// Called when the uclass is torn down (its last member unbound).
    pub destroy: Option<fn() -> Result<(), ErrorKind>>,
    pub post_bind: Option<fn(&mut Device<N>) -> Result<(), ErrorKind>>,
    pub pre_unbind: Option<fn(&mut Device<N>) -> Result<(), ErrorKind>>,
    pub pre_probe: Option<fn(&mut Device<N>) -> Result<(), ErrorKind>>,
    pub post_probe: Option<fn(&mut Device<N>) -> Result<(), ErrorKind>>,
    pub pre_remove: Option<fn(&mut Device<N>) -> Result<(), ErrorKind>>,
}

impl<N: Copy> ClassHooks<N> {
    pub const fn none() -> Self {
        Self {
            init: None,
            destroy: None,
            post_bind: None,
            pre_unbind: None,
            pre_probe: None,
            post_probe: None,
            pre_remove: None,
        }
    }
}

/// Driver for a uclass: provides a consistent interface to a set of related
/// drivers (GPIO, I2C bus, serial UART, ...).
pub struct ClassDriver<N: Copy> {
    pub name: &'static str,
    pub id: ClassId,
    /// Size of the per-device "class-priv" data block the probe engine
    /// allocates for each member device of this uclass, or 0. This is
    /// distinct from a device's own driver-private block: it is owned by
    /// the uclass's behavior, not the individual driver's.
    pub per_device_size: usize,
    pub ops: ClassHooks<N>,
}

/// An oreboot driver class, collecting together similar drivers.
///
/// A `Class` provides an interface to a particular function, implemented by
/// one or more drivers. Every driver belongs to a uclass even if it is the
/// only driver in that uclass. Created on demand when the first device of a
/// given [`ClassId`] is bound; destroyed once its member list is empty again.
///
/// `priv_data` here is a uclass-wide block, not sized by anything in the
/// data model (`ClassDriver` only declares a per-device size) — it exists
/// for a uclass driver that wants to stash shared state via its own `init`
/// hook, and is never allocated automatically by the core.
pub struct Class<N: Copy> {
    driver: &'static ClassDriver<N>,
    members: Vec<NonNull<Device<N>>>,
    priv_data: Option<NonNull<u8>>,
}

impl<N: Copy> Class<N> {
    pub(crate) fn new(driver: &'static ClassDriver<N>) -> Self {
        Self {
            driver,
            members: Vec::new(),
            priv_data: None,
        }
    }

    pub fn driver(&self) -> &'static ClassDriver<N> {
        self.driver
    }

    pub fn id(&self) -> ClassId {
        self.driver.id
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn priv_data(&self) -> Option<NonNull<u8>> {
        self.priv_data
    }

    pub(crate) fn push_member(&mut self, dev: NonNull<Device<N>>) {
        self.members.push(dev);
    }

    pub(crate) fn remove_member(&mut self, dev: NonNull<Device<N>>) {
        self.members.retain(|p| *p != dev);
    }

    pub fn members(&self) -> impl Iterator<Item = DeviceHandle<N>> + '_ {
        self.members.iter().map(|p| DeviceHandle::new(*p))
    }
}
