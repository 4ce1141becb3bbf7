use alloc::boxed::Box;
use alloc::vec::Vec;
use core::ptr::NonNull;

use crate::device::{Device, DeviceHandle};

/// Owns storage for every device in the tree.
///
/// Child lists and uclass member lists hold non-owning [`NonNull`] pointers
/// into this arena; the arena itself is the single owner. Devices are never
/// individually freed — the whole arena is dropped at once during
/// [`crate::root::Dm::uninit`], after every `remove`/`unbind` hook has run.
/// This avoids the double-ownership an intrusive linked list of owned nodes
/// would create if the same device were simultaneously reachable by value
/// from a parent's child list and from its uclass's member list.
pub(crate) struct DeviceArena<N: Copy> {
    devices: Vec<Box<Device<N>>>,
}

impl<N: Copy> DeviceArena<N> {
    pub(crate) fn new() -> Self {
        Self {
            devices: Vec::new(),
        }
    }

    /// Inserts `device` into the arena and returns a stable handle to it.
    /// The returned pointer stays valid for the arena's lifetime: pushing
    /// onto `devices` may move the `Box` pointer within the `Vec`, but never
    /// moves the heap allocation the `Box` points at.
    pub(crate) fn insert(&mut self, device: Device<N>) -> DeviceHandle<N> {
        let mut boxed = Box::new(device);
        let ptr = NonNull::from(boxed.as_mut());
        self.devices.push(boxed);
        DeviceHandle::new(ptr)
    }

    pub(crate) fn len(&self) -> usize {
        self.devices.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Every device currently in the arena, in bind order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = DeviceHandle<N>> + '_ {
        self.devices
            .iter()
            .map(|b| DeviceHandle::new(NonNull::from(b.as_ref())))
    }

    /// Drops every device. Callers must have already run `remove`/`unbind`
    /// hooks via a post-order walk; this only reclaims the backing storage.
    pub(crate) fn clear(&mut self) {
        self.devices.clear();
    }
}
