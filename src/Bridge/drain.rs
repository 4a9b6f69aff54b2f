use serde::{Deserialize, Serialize};

use crate::Core::error::WriteError;
use crate::Core::link::BulkWriter;
use crate::SPSC::{ChannelConsumer, TAG_LEN};

/// What to do with a staged transfer the writer refused.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackpressurePolicy {
    /// Forget it and keep draining. The payload bytes are lost.
    #[default]
    Drop,
    /// Keep it staged and offer it again on the next pass before draining
    /// anything else from this channel.
    Retain,
}

/// Result of one drain pass over a channel.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Transfers the writer accepted.
    pub written: u64,
    /// Transfers the writer refused and that were dropped.
    pub lost: u64,
    /// Whether a refused transfer is still staged (Retain only).
    pub retained: bool,
}

impl DrainReport {
    pub fn merge(&mut self, other: DrainReport) {
        self.written += other.written;
        self.lost += other.lost;
        self.retained |= other.retained;
    }
}

/// Consumer side of one channel: assembles tagged, fixed-size transfers.
pub struct Drain {
    pub(crate) consumer: ChannelConsumer,
    /// Transfer-sized; the first `TAG_LEN` bytes hold the tag for good.
    pub(crate) staging: Box<[u8]>,
    pub(crate) policy: BackpressurePolicy,
    /// A refused transfer is sitting in `staging`.
    pub(crate) pending: bool,
    pub(crate) totals: DrainReport,
}

impl Drain {
    pub fn new(consumer: ChannelConsumer, policy: BackpressurePolicy) -> Self {
        let meta = *consumer.meta();
        let mut staging = vec![0u8; meta.transfer_unit].into_boxed_slice();
        staging[..TAG_LEN].copy_from_slice(&meta.tag);

        Self {
            consumer,
            staging,
            policy,
            pending: false,
            totals: DrainReport::default(),
        }
    }

    /// Emit every complete transfer currently held by the ring.
    ///
    /// While at least one payload's worth of bytes is unread, exactly that
    /// many are moved behind the tag and the whole buffer is handed to
    /// `writer`. No backoff between transfers.
    pub fn drain<W: BulkWriter + ?Sized>(&mut self, writer: &mut W) -> DrainReport {
        let mut report = DrainReport::default();

        if self.pending {
            match writer.write(&self.staging) {
                Ok(()) => {
                    self.pending = false;
                    report.written += 1;
                }
                Err(e) => {
                    self.refused(e);
                    report.retained = true;
                    self.totals.merge(report);
                    return report;
                }
            }
        }

        while self.consumer.has_transfer() {
            if self.consumer.read_into(&mut self.staging[TAG_LEN..]).is_err() {
                // has_transfer() said otherwise; only this consumer reads
                break;
            }

            match writer.write(&self.staging) {
                Ok(()) => report.written += 1,
                Err(e) => {
                    self.refused(e);
                    match self.policy {
                        BackpressurePolicy::Drop => report.lost += 1,
                        BackpressurePolicy::Retain => {
                            self.pending = true;
                            report.retained = true;
                            break;
                        }
                    }
                }
            }
        }

        self.totals.merge(report);
        report
    }

    fn refused(&self, e: WriteError) {
        log::info!(
            "radio-bridge: {} transfer refused: {e}",
            self.consumer.meta().label()
        );
    }

    /// Cumulative counts since construction. `retained` reflects the
    /// current state.
    pub fn totals(&self) -> DrainReport {
        DrainReport {
            retained: self.pending,
            ..self.totals
        }
    }

    pub fn consumer(&self) -> &ChannelConsumer {
        &self.consumer
    }

    pub fn policy(&self) -> BackpressurePolicy {
        self.policy
    }
}
