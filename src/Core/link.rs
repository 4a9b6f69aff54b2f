// Seams to the radio stack, the bulk transport and the event dispatcher.
// The crate only calls into these; it never implements them outside tests.

use crate::Command::Operation;
use crate::Core::error::{SubmitError, WriteError};

/// Handle of an established connection to the peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnHandle(pub u16);

/// Attribute handle on the peer (characteristic value or descriptor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttHandle(pub u16);

/// Request submission path to the peer.
///
/// `submit` must return without waiting for the peer. The outcome arrives
/// through [`CommandQueue::advance_on_confirmation`](crate::CommandQueue::advance_on_confirmation).
/// A stack that confirms synchronously may call it from inside `submit`;
/// the queue defers the follow-up submission until `submit` returns, so a
/// peer that keeps rejecting is retried in a loop, not by recursion.
pub trait PeerLink {
    fn submit(&self, target: ConnHandle, op: &Operation) -> Result<(), SubmitError>;
}

/// Bulk transport the drained transfers are handed to.
pub trait BulkWriter {
    /// Offer one complete transfer. `Unavailable` means it was not taken.
    fn write(&mut self, transfer: &[u8]) -> Result<(), WriteError>;
}

/// Lets the environment dispatch queued asynchronous events.
pub trait EventPump {
    /// Process pending events; returns `true` while more remain.
    fn process_pending_events(&mut self) -> bool;
}

impl<W: BulkWriter + ?Sized> BulkWriter for &mut W {
    fn write(&mut self, transfer: &[u8]) -> Result<(), WriteError> {
        (**self).write(transfer)
    }
}

impl<F: FnMut() -> bool> EventPump for F {
    fn process_pending_events(&mut self) -> bool {
        self()
    }
}
