use std::fmt;

use super::request::{Operation, RequestId};
use crate::Core::link::ConnHandle;

/// Why the peer refused a request it may accept later.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RejectReason {
    InsufficientAuthentication,
    InsufficientEncryption,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::InsufficientAuthentication => write!(f, "insufficient authentication"),
            RejectReason::InsufficientEncryption => write!(f, "insufficient encryption"),
        }
    }
}

/// Outcome the stack reports for the request in flight.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Confirmation {
    Success,
    /// Peer-side precondition not met yet; the request is reissued as-is.
    Rejected(RejectReason),
    /// Any other GATT status. The request is discarded.
    Failed(u16),
}

impl Confirmation {
    // ATT error codes for the two retryable statuses
    const ATTERR_INSUF_AUTHENTICATION: u16 = 0x0105;
    const ATTERR_INSUF_ENCRYPTION: u16 = 0x010F;

    /// Classify a raw GATT status word (0 is success).
    pub fn from_gatt_status(status: u16) -> Self {
        match status {
            0 => Confirmation::Success,
            Self::ATTERR_INSUF_AUTHENTICATION => {
                Confirmation::Rejected(RejectReason::InsufficientAuthentication)
            }
            Self::ATTERR_INSUF_ENCRYPTION => Confirmation::Rejected(RejectReason::InsufficientEncryption),
            other => Confirmation::Failed(other),
        }
    }

    pub fn is_recoverable(&self) -> bool {
        matches!(self, Confirmation::Rejected(_))
    }
}

/// A request that left the queue, with the outcome that retired it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Completed {
    pub id: RequestId,
    pub target: ConnHandle,
    pub op: Operation,
    pub outcome: Confirmation,
}
