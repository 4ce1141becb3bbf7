extern crate alloc;

mod arena;
mod binder;
mod class;
mod class_id;
mod device;
mod error;
mod event;
#[cfg(feature = "hdt")]
mod hdt;
mod platdata;
mod probe;
mod registry;
mod root;
mod scanner;
mod uclass;

pub use self::{
    class::{Class, ClassDriver, ClassHooks},
    class_id::ClassId,
    device::{Device, DeviceHandle, DeviceId, DmFlags, DmRemove, Driver, DriverHooks},
    error::{is_benign, Error, ErrorKind},
    event::{EventSink, EventTag, NullSink},
    registry::{DrvInfo, Registry},
    root::{Dm, MemoryStats, Stats},
};

#[cfg(feature = "hdt")]
pub use self::hdt::{compatible_strings, HdtCursor};
