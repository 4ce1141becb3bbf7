use core::fmt::Debug;

pub trait Error: Debug {
    fn kind(&self) -> ErrorKind;
}

/// Device-model error kind that can be used across board implementations.
///
/// `NotFound` and `NoDriver` are routinely recoverable; the scanner downgrades
/// both to a log warning at the top level. `OutOfMemory` and
/// `AlreadyInitialized` are the only two kinds that abort a bring-up step
/// outright.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Lookup miss in a registry or HDT.
    NotFound,
    /// A descriptor or HDT node names a driver absent from the registry.
    NoDriver,
    /// A driver's bind hook declined to bind.
    Refused,
    /// Allocation failed.
    OutOfMemory,
    /// The HDT `compatible` property (or another property the core reads)
    /// is malformed.
    BadHdt,
    /// A static descriptor's parent index is out of range.
    BadDescriptor,
    /// Ten passes of the static-descriptor scan still report pending
    /// parents: the descriptor graph has a parent-dependency cycle.
    Cycle,
    /// `init` called while a root device already exists.
    AlreadyInitialized,
    /// A driver hook returned a non-benign error.
    DriverError,
}

impl Error for core::convert::Infallible {
    fn kind(&self) -> ErrorKind {
        match *self {}
    }
}

impl Error for ErrorKind {
    fn kind(&self) -> ErrorKind {
        *self
    }
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "not found"),
            Self::NoDriver => write!(f, "no driver registered for that name"),
            Self::Refused => write!(f, "driver refused to bind"),
            Self::OutOfMemory => write!(f, "out of memory"),
            Self::BadHdt => write!(f, "malformed HDT property"),
            Self::BadDescriptor => write!(f, "descriptor parent index out of range"),
            Self::Cycle => write!(f, "parent-dependency cycle in static descriptors"),
            Self::AlreadyInitialized => write!(f, "driver model already initialized"),
            Self::DriverError => write!(f, "driver hook returned an error"),
        }
    }
}

/// True for the kinds the scanner treats as "benign, keep going and log a
/// warning" rather than aborting the current bring-up step.
pub fn is_benign(kind: ErrorKind) -> bool {
    matches!(kind, ErrorKind::NotFound | ErrorKind::NoDriver | ErrorKind::Refused)
}
