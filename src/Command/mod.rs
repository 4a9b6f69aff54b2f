mod confirmation;
mod queue;
mod request;

pub use confirmation::{Completed, Confirmation, RejectReason};
pub use queue::CommandQueue;
pub use request::{Operation, Request, RequestId, WritePayload, CCCD_DISABLE, CCCD_NOTIFY, WRITE_INLINE};
