use std::sync::atomic::{AtomicBool, Ordering};

use super::drain::{BackpressurePolicy, Drain, DrainReport};
use crate::Core::config::{BridgeConfig, ChannelConfig};
use crate::Core::error::BridgeResult;
use crate::Core::link::{BulkWriter, EventPump};
use crate::SPSC::{ChannelBuilder, ChannelConsumer, ChannelProducer};

/// Polling half of the bridge: drains every channel into one bulk writer.
///
/// Runs on a single logical thread. The producers it pairs with live in the
/// event context (usually inside an [`EventRouter`](crate::EventRouter)).
pub struct Bridge<W: BulkWriter> {
    drains: Vec<Drain>,
    writer: W,
}

impl<W: BulkWriter> Bridge<W> {
    pub fn new(writer: W) -> Self {
        Self {
            drains: Vec::new(),
            writer,
        }
    }

    /// Build every configured channel.
    ///
    /// Returns the bridge plus the producer of each channel, paired with its
    /// configuration so the caller can route notifications to it.
    pub fn from_config(
        config: &BridgeConfig,
        writer: W,
    ) -> BridgeResult<(Self, Vec<(ChannelConfig, ChannelProducer)>)> {
        config.validate()?;

        let mut bridge = Self::new(writer);
        let mut producers = Vec::with_capacity(config.channels.len());

        for ch in &config.channels {
            let (producer, consumer) = ChannelBuilder::new()
                .with_channel_id(ch.id)
                .with_tag(ch.tag_bytes()?)
                .with_capacity(config.ring_capacity)
                .with_transfer_unit(config.transfer_unit)
                .build()?;
            bridge.add_channel(consumer, config.backpressure);
            producers.push((ch.clone(), producer));
        }

        log::info!(
            "radio-bridge: {} channel(s), {}-byte transfers, backpressure {:?}",
            bridge.drains.len(),
            config.transfer_unit,
            config.backpressure
        );
        Ok((bridge, producers))
    }

    pub fn add_channel(&mut self, consumer: ChannelConsumer, policy: BackpressurePolicy) {
        self.drains.push(Drain::new(consumer, policy));
    }

    /// One pass over every channel, in the order they were added.
    pub fn drain_all(&mut self) -> DrainReport {
        let mut report = DrainReport::default();
        for drain in &mut self.drains {
            report.merge(drain.drain(&mut self.writer));
        }
        report
    }

    /// Let the environment dispatch every pending event, then drain.
    pub fn poll_once<P: EventPump + ?Sized>(&mut self, pump: &mut P) -> DrainReport {
        while pump.process_pending_events() {}
        self.drain_all()
    }

    /// Poll until `keep_running` clears. Returns the totals of this run.
    pub fn run<P: EventPump + ?Sized>(&mut self, pump: &mut P, keep_running: &AtomicBool) -> DrainReport {
        let mut report = DrainReport::default();
        while keep_running.load(Ordering::Acquire) {
            report.merge(self.poll_once(pump));
        }
        report
    }

    pub fn drains(&self) -> &[Drain] {
        &self.drains
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn into_writer(self) -> W {
        self.writer
    }
}
