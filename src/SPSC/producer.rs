// In src/SPSC/producer.rs
use std::sync::Arc;

use super::Buffer::ByteRing;
use super::Structs::ChannelMeta;
use crate::Core::error::{BridgeError, BridgeResult};

/// Running totals for one producer.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ProducerStats {
    pub accepted: u64,
    pub dropped: u64,
}

/// Writing end of a channel ring.
///
/// Lives in the event-delivery context. Never blocks and never grows the
/// ring: bytes that do not fit are dropped and counted.
pub struct ChannelProducer {
    ring: Arc<ByteRing>,
    meta: ChannelMeta,
    stats: ProducerStats,
}

impl ChannelProducer {
    pub(crate) fn new(ring: Arc<ByteRing>, meta: ChannelMeta) -> Self {
        Self {
            ring,
            meta,
            stats: ProducerStats::default(),
        }
    }

    /// Append one byte. Returns 1 if it was stored, 0 if the ring was full.
    pub fn put(&mut self, byte: u8) -> usize {
        // Safety: `&mut self` on a non-Clone handle makes us the only producer
        if unsafe { self.ring.push(byte) } {
            self.stats.accepted += 1;
            1
        } else {
            self.stats.dropped += 1;
            0
        }
    }

    /// Append a batch, stopping at the first byte that does not fit.
    /// Returns the number of bytes accepted.
    pub fn put_slice(&mut self, bytes: &[u8]) -> usize {
        // Safety: see `put`
        let accepted = unsafe { self.ring.push_slice(bytes) };
        self.stats.accepted += accepted as u64;
        self.stats.dropped += (bytes.len() - accepted) as u64;
        accepted
    }

    /// Deliver one notification's worth of data.
    ///
    /// Sums the accepted counts and compares them to the batch length; any
    /// shortfall is logged and reported as `RingBufferOverflow` for this
    /// channel. The accepted prefix stays in the ring either way.
    pub fn deliver(&mut self, data: &[u8]) -> BridgeResult<()> {
        let accepted = self.put_slice(data);
        if accepted == data.len() {
            return Ok(());
        }

        let lost = data.len() - accepted;
        log::error!(
            "radio-bridge: {} data lost ({} of {} bytes dropped)",
            self.meta.label(),
            lost,
            data.len()
        );
        Err(BridgeError::RingBufferOverflow {
            channel: self.meta.channel_id,
            lost,
            expected: data.len(),
        })
    }

    /// Unread bytes currently held.
    pub fn count(&self) -> usize {
        self.ring.count()
    }

    /// Bytes that can still be accepted.
    pub fn free(&self) -> usize {
        self.ring.usable() - self.ring.count()
    }

    pub fn stats(&self) -> ProducerStats {
        self.stats
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
