mod bridge;
mod drain;
mod router;

pub use bridge::Bridge;
pub use drain::{BackpressurePolicy, Drain, DrainReport};
pub use router::{EventRouter, PeerEvent, Retired};
