use std::sync::Arc;

use super::Buffer::ByteRing;
use super::Structs::ChannelMeta;
use super::{check_layout, ChannelConsumer, ChannelProducer, TAG_LEN};
use crate::Core::config::{DEFAULT_RING_CAPACITY, DEFAULT_TRANSFER_UNIT};
use crate::Core::error::BridgeResult;

pub struct ChannelBuilder {
    channel_id: u8,
    tag: [u8; TAG_LEN],
    capacity: usize,
    transfer_unit: usize,
    storage: Option<Box<[u8]>>,
}

impl Default for ChannelBuilder {
    fn default() -> Self {
        Self {
            channel_id: 0,
            tag: *b"CH0_",
            capacity: DEFAULT_RING_CAPACITY, // 16KB default
            transfer_unit: DEFAULT_TRANSFER_UNIT,
            storage: None,
        }
    }
}

impl ChannelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_channel_id(mut self, channel_id: u8) -> Self {
        self.channel_id = channel_id;
        self
    }

    pub fn with_tag(mut self, tag: [u8; TAG_LEN]) -> Self {
        self.tag = tag;
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self.storage = None;
        self
    }

    pub fn with_transfer_unit(mut self, transfer_unit: usize) -> Self {
        self.transfer_unit = transfer_unit;
        self
    }

    /// Use caller-provided storage; its length becomes the capacity.
    pub fn with_storage(mut self, storage: Box<[u8]>) -> Self {
        self.capacity = storage.len();
        self.storage = Some(storage);
        self
    }

    /// Build the producer/consumer pair for one channel.
    pub fn build(self) -> BridgeResult<(ChannelProducer, ChannelConsumer)> {
        check_layout(self.capacity, self.transfer_unit)?;

        let ring = match self.storage {
            Some(storage) => ByteRing::with_storage(storage)?,
            None => ByteRing::new(self.capacity)?,
        };
        let ring = Arc::new(ring);

        let meta = ChannelMeta {
            channel_id: self.channel_id,
            tag: self.tag,
            transfer_unit: self.transfer_unit,
        };

        log::debug!(
            "radio-bridge: channel {} ({}) ring {} bytes, transfer {} bytes",
            meta.channel_id,
            meta.label(),
            self.capacity,
            meta.transfer_unit
        );

        Ok((
            ChannelProducer::new(ring.clone(), meta),
            ChannelConsumer::new(ring, meta),
        ))
    }
}
