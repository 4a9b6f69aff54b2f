mod builder;
mod consumer;
mod producer;

pub use builder::ChannelBuilder;
pub use consumer::ChannelConsumer;
pub use producer::{ChannelProducer, ProducerStats};

pub mod Buffer {
    pub mod Buffer;
    pub mod Buffer_impl;
    pub mod layout;
    pub use Buffer::ByteRing; // re-export for stable path
    pub use layout::RingCursors;
}

pub mod Structs {
    pub mod Channel_Structs;
    pub use Channel_Structs::ChannelMeta; // re-export for stable path
}

use crate::Core::error::{BridgeError, BridgeResult};

/// Length of the per-channel tag that prefixes every transfer.
pub const TAG_LEN: usize = 4;

/// Validate a ring capacity / transfer unit pair.
///
/// The ring keeps one slot free, so it can hold at most `capacity - 1`
/// bytes; a transfer payload of `transfer_unit - TAG_LEN` bytes must fit in
/// that or the channel would never drain.
pub fn check_layout(capacity: usize, transfer_unit: usize) -> BridgeResult<()> {
    if capacity < 2 || !capacity.is_power_of_two() {
        return Err(BridgeError::InvalidCapacity(capacity));
    }
    if transfer_unit <= TAG_LEN || transfer_unit - TAG_LEN > capacity - 1 {
        return Err(BridgeError::InvalidTransferUnit {
            unit: transfer_unit,
            tag: TAG_LEN,
            capacity,
        });
    }
    Ok(())
}
