use alloc::string::String;
use alloc::vec::Vec;
use core::ptr::NonNull;

use crate::class::Class;
use crate::class_id::ClassId;
use crate::error::ErrorKind;

bitflags::bitflags! {
    /// Device manager flags (do not access outside driver model).
    ///
    /// Transitions are monotonic within a lifecycle phase: bind adds
    /// [`DmFlags::BOUND`], probe adds [`DmFlags::ACTIVATED`], remove clears
    /// `ACTIVATED`, unbind clears `BOUND`.
    pub struct DmFlags: u32 {
        /// Driver is active (probed). Cleared when it is removed.
        const ACTIVATED = 1 << 0;
        /// Device is bound.
        const BOUND = 1 << 1;
        /// DM should init this device prior to relocation.
        const PRE_RELOC = 1 << 2;
        /// Driver plat has been read. Cleared when the device is removed.
        const PLATDATA_VALID = 1 << 3;
        /// Device must be probed right after it is bound.
        const PROBE_AFTER_BIND = 1 << 4;
        /// Device is vital to the operation of other devices; it may be
        /// removed only after all non-vital devices have been removed
        /// (e.g. a clock that other devices' remove hooks still need).
        const VITAL = 1 << 5;
    }
}

/// One or more of these flags are passed to a driver's `remove` hook so a
/// selective device removal, as specified by the remove stage and the
/// driver's own flags, can be done.
#[repr(u32)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DmRemove {
    /// Normal remove: tear down every device.
    Normal = 1 << 0,
    /// First pass of teardown: only devices not flagged [`DmFlags::VITAL`].
    NonVital = 1 << 1,
}

/// Lists one compatible string a driver matches, and the opaque data that
/// comes along with that match (recorded on the device as `driver_data`).
#[derive(Clone, Copy)]
pub struct DeviceId {
    pub compatible: &'static str,
    pub data: u32,
}

/// The hook table for a [`Driver`]. Each hook is optional; an absent hook is
/// a no-op success, matching the driver hook contract.
pub struct DriverHooks<N: Copy> {
    pub bind: Option<fn(&mut Device<N>) -> Result<(), ErrorKind>>,
    pub probe: Option<fn(&mut Device<N>) -> Result<(), ErrorKind>>,
    pub remove: Option<fn(&mut Device<N>, DmRemove) -> Result<(), ErrorKind>>,
    pub unbind: Option<fn(&mut Device<N>) -> Result<(), ErrorKind>>,
    pub child_pre_probe: Option<fn(&mut Device<N>) -> Result<(), ErrorKind>>,
    pub child_post_bind: Option<fn(&mut Device<N>) -> Result<(), ErrorKind>>,
}

impl<N: Copy> DriverHooks<N> {
    pub const fn none() -> Self {
        Self {
            bind: None,
            probe: None,
            remove: None,
            unbind: None,
            child_pre_probe: None,
            child_post_bind: None,
        }
    }
}

/// A driver for a feature or peripheral.
///
/// This holds methods for setting up a new device, and for removing it. The
/// device needs information to set itself up - this is provided either by
/// `plat` (a static descriptor) or an HDT node, whose `compatible` strings
/// are matched against `of_match`.
///
/// Drivers all belong to a uclass, representing a class of devices of the
/// same type. Common elements of the drivers can be implemented in the
/// uclass, or the uclass can provide a consistent interface to the drivers
/// within it.
pub struct Driver<N: Copy> {
    /// Device name, also used to resolve a static descriptor's driver.
    pub name: &'static str,
    /// Identifies the uclass this driver belongs to.
    pub uclass_id: ClassId,
    /// List of compatible strings this driver matches in HDT binding.
    pub of_match: &'static [DeviceId],
    /// Driver flags, notably [`DmFlags::PRE_RELOC`].
    pub flags: DmFlags,
    /// Size of the private data block the core allocates in `priv` before
    /// `probe`, or 0 if the driver manages its own.
    pub priv_size: usize,
    /// Size of the platform data block allocated in `plat`, or 0.
    pub plat_size: usize,
    /// Size of the per-child data block stored in a child's `parent_priv`.
    pub per_child_size: usize,
    /// Hook table.
    pub ops: DriverHooks<N>,
}

/// An instance of a driver: a driver bound to a particular port or
/// peripheral.
///
/// A device comes into existence through a `bind` call, either from a static
/// descriptor (`plat` is populated up front) or from an HDT node (`node` is
/// set, and `driver_data` carries the matched `of_match` entry's data).
pub struct Device<N: Copy> {
    name: String,
    driver: &'static Driver<N>,
    class: Option<NonNull<Class<N>>>,
    parent: Option<NonNull<Device<N>>>,
    children: Vec<NonNull<Device<N>>>,
    node: Option<N>,
    plat: Option<NonNull<u8>>,
    priv_data: Option<NonNull<u8>>,
    parent_priv: Option<NonNull<u8>>,
    class_priv: Option<NonNull<u8>>,
    driver_data: u32,
    flags: DmFlags,
    /// Index of the static descriptor this device was bound from, used by
    /// the static-descriptor scan to avoid binding the same slot twice.
    slot: Option<usize>,
    /// True if `plat` was allocated by the probe engine rather than supplied
    /// by a static descriptor. Only core-owned blocks are freed on removal.
    plat_owned: bool,
}

impl<N: Copy> Device<N> {
    pub(crate) fn new(
        name: String,
        driver: &'static Driver<N>,
        parent: Option<NonNull<Device<N>>>,
        node: Option<N>,
        driver_data: u32,
        slot: Option<usize>,
    ) -> Self {
        Self {
            name,
            driver,
            class: None,
            parent,
            children: Vec::new(),
            node,
            plat: None,
            priv_data: None,
            parent_priv: None,
            class_priv: None,
            driver_data,
            flags: DmFlags::empty(),
            slot,
            plat_owned: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn driver(&self) -> &'static Driver<N> {
        self.driver
    }

    pub fn driver_data(&self) -> u32 {
        self.driver_data
    }

    pub fn node(&self) -> Option<N> {
        self.node
    }

    pub fn flags(&self) -> DmFlags {
        self.flags
    }

    pub fn slot(&self) -> Option<usize> {
        self.slot
    }

    pub fn is_activated(&self) -> bool {
        self.flags.contains(DmFlags::ACTIVATED)
    }

    pub fn is_bound(&self) -> bool {
        self.flags.contains(DmFlags::BOUND)
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn plat(&self) -> Option<NonNull<u8>> {
        self.plat
    }

    pub fn priv_data(&self) -> Option<NonNull<u8>> {
        self.priv_data
    }

    pub fn parent_priv(&self) -> Option<NonNull<u8>> {
        self.parent_priv
    }

    pub fn class_priv(&self) -> Option<NonNull<u8>> {
        self.class_priv
    }

    pub(crate) fn set_plat(&mut self, p: Option<NonNull<u8>>) {
        self.plat = p;
    }

    pub(crate) fn is_plat_owned(&self) -> bool {
        self.plat_owned
    }

    pub(crate) fn set_plat_owned(&mut self, owned: bool) {
        self.plat_owned = owned;
    }

    pub(crate) fn set_priv(&mut self, p: Option<NonNull<u8>>) {
        self.priv_data = p;
    }

    pub(crate) fn set_parent_priv(&mut self, p: Option<NonNull<u8>>) {
        self.parent_priv = p;
    }

    pub(crate) fn set_class_priv(&mut self, p: Option<NonNull<u8>>) {
        self.class_priv = p;
    }

    pub(crate) fn class_ptr(&self) -> Option<NonNull<Class<N>>> {
        self.class
    }

    pub(crate) fn set_class(&mut self, class: NonNull<Class<N>>) {
        self.class = Some(class);
    }

    pub(crate) fn parent_ptr(&self) -> Option<NonNull<Device<N>>> {
        self.parent
    }

    pub(crate) fn push_child(&mut self, child: NonNull<Device<N>>) {
        self.children.push(child);
    }

    pub(crate) fn remove_child(&mut self, child: NonNull<Device<N>>) {
        self.children.retain(|p| *p != child);
    }

    pub(crate) fn children_ptrs(&self) -> &[NonNull<Device<N>>] {
        &self.children
    }

    pub(crate) fn insert_flags(&mut self, flags: DmFlags) {
        self.flags.insert(flags);
    }

    pub(crate) fn remove_flags(&mut self, flags: DmFlags) {
        self.flags.remove(flags);
    }
}

/// Non-owning, `Copy` reference to a bound [`Device`], valid for as long as
/// the owning [`crate::root::Dm`] is alive and the device has not been torn
/// down by `uninit`.
///
/// Mirrors the "back-references are non-owning handles" design note:
/// parents always outlive children (teardown is post-order), so a handle
/// obtained from a live tree stays valid for the device's lifetime.
pub struct DeviceHandle<N: Copy> {
    pub(crate) ptr: NonNull<Device<N>>,
}

impl<N: Copy> Clone for DeviceHandle<N> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<N: Copy> Copy for DeviceHandle<N> {}

impl<N: Copy> PartialEq for DeviceHandle<N> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr == other.ptr
    }
}
impl<N: Copy> Eq for DeviceHandle<N> {}

impl<N: Copy> DeviceHandle<N> {
    pub(crate) fn new(ptr: NonNull<Device<N>>) -> Self {
        Self { ptr }
    }

    pub(crate) fn get(&self) -> &Device<N> {
        unsafe { self.ptr.as_ref() }
    }

    pub(crate) fn get_mut(&mut self) -> &mut Device<N> {
        unsafe { self.ptr.as_mut() }
    }

    pub fn name(&self) -> &str {
        self.get().name()
    }

    pub fn driver(&self) -> &'static Driver<N> {
        self.get().driver()
    }

    pub fn flags(&self) -> DmFlags {
        self.get().flags()
    }

    pub fn is_activated(&self) -> bool {
        self.get().is_activated()
    }

    pub fn is_bound(&self) -> bool {
        self.get().is_bound()
    }

    pub fn node(&self) -> Option<N> {
        self.get().node()
    }

    pub fn parent(&self) -> Option<DeviceHandle<N>> {
        self.get().parent_ptr().map(DeviceHandle::new)
    }

    pub fn children(&self) -> impl Iterator<Item = DeviceHandle<N>> + '_ {
        self.get()
            .children_ptrs()
            .iter()
            .map(|p| DeviceHandle::new(*p))
    }

    pub fn plat(&self) -> Option<NonNull<u8>> {
        self.get().plat()
    }

    pub fn priv_data(&self) -> Option<NonNull<u8>> {
        self.get().priv_data()
    }

    pub fn parent_priv(&self) -> Option<NonNull<u8>> {
        self.get().parent_priv()
    }

    pub fn class_priv(&self) -> Option<NonNull<u8>> {
        self.get().class_priv()
    }

    pub(crate) fn is_plat_owned(&self) -> bool {
        self.get().is_plat_owned()
    }
}
