use alloc::boxed::Box;
use alloc::vec::Vec;
use core::ptr::NonNull;

use crate::class::Class;
use crate::class_id::ClassId;
use crate::device::Device;
use crate::error::ErrorKind;
use crate::registry::Registry;

/// Owning store of live [`Class`] instances, created lazily as devices bind.
///
/// A uclass exists only while it has members: the last device to unbind from
/// a uclass tears it down via its driver's `destroy` hook and frees the
/// entry, so an unused [`ClassId`] never accumulates state across a
/// scan/probe/remove cycle.
pub(crate) struct UclassRegistry<N: Copy> {
    classes: Vec<Box<Class<N>>>,
}

impl<N: Copy> UclassRegistry<N> {
    pub(crate) fn new() -> Self {
        Self {
            classes: Vec::new(),
        }
    }

    fn find(&self, id: ClassId) -> Option<usize> {
        self.classes.iter().position(|c| c.id() == id)
    }

    /// Returns the live uclass for `id`, creating and initializing it from
    /// `registry` if this is the first device to need it.
    pub(crate) fn get_or_create(
        &mut self,
        id: ClassId,
        registry: &Registry<N>,
    ) -> Result<NonNull<Class<N>>, ErrorKind> {
        if let Some(idx) = self.find(id) {
            return Ok(NonNull::from(self.classes[idx].as_mut()));
        }

        let driver = registry.lookup_uclass_driver(id)?;
        let class = Class::new(driver);
        if let Some(init) = driver.ops.init {
            init().map_err(|_| ErrorKind::DriverError)?;
        }

        let mut boxed = Box::new(class);
        let ptr = NonNull::from(boxed.as_mut());
        self.classes.push(boxed);
        Ok(ptr)
    }

    /// Removes `device` from the member list of the uclass it belongs to,
    /// tearing the uclass down if that was its last member.
    pub(crate) fn drop_member(&mut self, id: ClassId, device: NonNull<Device<N>>) {
        let Some(idx) = self.find(id) else {
            return;
        };
        self.classes[idx].remove_member(device);
        if self.classes[idx].member_count() == 0 {
            let class = self.classes.remove(idx);
            if let Some(destroy) = class.driver().ops.destroy {
                let _ = destroy();
            }
        }
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Class<N>> {
        self.classes.iter().map(|c| c.as_ref())
    }

    pub(crate) fn count(&self) -> usize {
        self.classes.len()
    }

    pub(crate) fn clear(&mut self) {
        for class in self.classes.drain(..) {
            if let Some(destroy) = class.driver().ops.destroy {
                let _ = destroy();
            }
        }
    }
}
