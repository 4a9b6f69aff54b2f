// src/SPSC/consumer.rs

use std::sync::Arc;

use super::Buffer::ByteRing;
use super::Structs::ChannelMeta;
use crate::Core::error::{BridgeError, BridgeResult};

/// Reading end of a channel ring, owned by the polling loop.
pub struct ChannelConsumer {
    ring: Arc<ByteRing>,
    meta: ChannelMeta,
}

impl ChannelConsumer {
    pub(crate) fn new(ring: Arc<ByteRing>, meta: ChannelMeta) -> Self {
        Self { ring, meta }
    }

    /// Removes and returns the oldest unread byte.
    ///
    /// # Returns
    /// * `Ok(byte)` if one was available
    /// * `Err(RingBufferEmptyRead)` if the ring is empty; nothing changes
    pub fn get(&mut self) -> BridgeResult<u8> {
        // Safety: `&mut self` on a non-Clone handle makes us the only consumer
        unsafe { self.ring.pop() }.ok_or(BridgeError::RingBufferEmptyRead)
    }

    /// Fill `out` with the oldest `out.len()` bytes.
    ///
    /// All or nothing: if fewer bytes are unread, nothing is consumed and
    /// `RingBufferEmptyRead` is returned.
    pub fn read_into(&mut self, out: &mut [u8]) -> BridgeResult<()> {
        // Safety: see `get`
        if unsafe { self.ring.pop_exact(out) } {
            Ok(())
        } else {
            Err(BridgeError::RingBufferEmptyRead)
        }
    }

    /// Unread bytes currently held.
    pub fn count(&self) -> usize {
        self.ring.count()
    }

    /// Whether a full transfer's payload is waiting.
    pub fn has_transfer(&self) -> bool {
        self.count() >= self.meta.payload_len()
    }

    pub fn meta(&self) -> &ChannelMeta {
        &self.meta
    }

    pub fn channel_id(&self) -> u8 {
        self.meta.channel_id
    }

    /// Shared ring, for inspection.
    pub fn ring(&self) -> &ByteRing {
        &self.ring
    }
}
