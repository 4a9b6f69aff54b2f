// Identity of one logical data stream, shared by its producer and consumer

use std::borrow::Cow;

use crate::SPSC::TAG_LEN;

/// Static description of a channel. Plain integral types only.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ChannelMeta {
    pub channel_id: u8,
    /// Fixed header copied in front of every transfer.
    pub tag: [u8; TAG_LEN],
    /// Length of one complete transfer, tag included.
    pub transfer_unit: usize,
}

impl ChannelMeta {
    /// Payload bytes carried by one transfer.
    #[inline]
    pub fn payload_len(&self) -> usize {
        self.transfer_unit - TAG_LEN
    }

    /// Printable tag for log lines.
    pub fn label(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.tag)
    }
}
