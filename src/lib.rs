// Module naming follows project convention (SPSC = Single-Producer Single-Consumer)
#[allow(non_snake_case)]
pub mod SPSC;
#[allow(non_snake_case)]
pub mod Command;
#[allow(non_snake_case)]
pub mod Core;
#[allow(non_snake_case)]
pub mod Bridge;
#[allow(non_snake_case)]
mod Debug;

pub use Bridge::{BackpressurePolicy, Bridge as ChannelBridge, Drain, DrainReport, EventRouter, PeerEvent, Retired};
pub use Command::{CommandQueue, Completed, Confirmation, Operation, RejectReason, Request, RequestId};
pub use Core::config::{BridgeConfig, ChannelConfig};
pub use Core::error::{BridgeError, BridgeResult, SubmitError, WriteError};
pub use Core::link::{AttHandle, BulkWriter, ConnHandle, EventPump, PeerLink};
pub use SPSC::{ChannelBuilder, ChannelConsumer, ChannelProducer};
