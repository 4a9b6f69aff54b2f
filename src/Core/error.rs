use thiserror::Error;

use crate::Command::RejectReason;

/// Result alias used throughout the crate.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Errors surfaced to callers of the queue, the channel rings and the bridge.
///
/// Recoverable peer rejections never show up here: the command queue retries
/// them internally.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Enqueue attempted while every slot holds a pending request.
    #[error("command queue full ({capacity} requests pending)")]
    QueueFull { capacity: usize },

    /// Write payload does not fit the inline slot storage.
    #[error("write payload too large ({len} > {max})")]
    PayloadTooLarge { len: usize, max: usize },

    /// A delivered batch could not be stored completely.
    #[error("channel {channel} data lost: {lost} of {expected} bytes dropped")]
    RingBufferOverflow {
        channel: u8,
        lost: usize,
        expected: usize,
    },

    /// `get` called on a ring holding no unread bytes.
    #[error("ring buffer empty")]
    RingBufferEmptyRead,

    /// Capacity is zero or not a power of two.
    #[error("capacity must be a power of two and greater than zero, got {0}")]
    InvalidCapacity(usize),

    /// The transfer unit cannot carry the tag plus payload, or the ring can
    /// never hold one unit's worth of payload.
    #[error("transfer unit {unit} invalid for a {tag}-byte tag and ring capacity {capacity}")]
    InvalidTransferUnit {
        unit: usize,
        tag: usize,
        capacity: usize,
    },

    /// Operation needs an established connection to the peer.
    #[error("not connected to a peer")]
    NotConnected,

    #[error("invalid config: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure returned by [`PeerLink::submit`](crate::PeerLink::submit).
///
/// None of these remove the request from the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// The stack has no resources for another request right now.
    #[error("peer link busy")]
    Busy,
    /// The peer requires security the link does not have yet.
    #[error("peer rejected request: {0}")]
    Rejected(RejectReason),
    /// Any other stack error code.
    #[error("peer link error 0x{0:x}")]
    Fatal(u32),
}

/// Failure returned by [`BulkWriter::write`](crate::BulkWriter::write).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WriteError {
    #[error("bulk writer unavailable")]
    Unavailable,
}
