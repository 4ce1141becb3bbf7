use crate::error::ErrorKind;

/// Tag attached to the single fire-and-forget notification the core emits
/// after [`crate::root::Dm::init_and_scan`] completes.
///
/// Delivery, subscriber fan-out, and transport belong to whatever
/// [`EventSink`] the board wires up; the core only decides which tag to send
/// and propagates a notifier error.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EventTag {
    /// Bring-up ran before the image relocated itself in memory.
    PreRelocation,
    /// Bring-up ran after relocation.
    PostRelocation,
}

/// What the core requires from the event-notification subsystem.
///
/// Implemented by board/platform glue; the core never routes, retries, or
/// fans out a notification itself.
pub trait EventSink {
    fn notify(&self, tag: EventTag) -> Result<(), ErrorKind>;
}

/// An [`EventSink`] that drops every notification. Useful for boards and
/// tests that have no subscriber wired up yet.
pub struct NullSink;

impl EventSink for NullSink {
    fn notify(&self, _tag: EventTag) -> Result<(), ErrorKind> {
        Ok(())
    }
}
