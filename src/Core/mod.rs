pub mod config;
pub mod error;
pub mod link;

pub use error::{BridgeError, BridgeResult};
pub use link::{AttHandle, BulkWriter, ConnHandle, EventPump, PeerLink};
