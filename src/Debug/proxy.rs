use std::fmt;

use super::StructDebug;
use crate::Bridge::Drain;
use crate::Command::CommandQueue;
use crate::Core::link::PeerLink;
use crate::SPSC::Buffer::ByteRing;
use crate::SPSC::{ChannelConsumer, ChannelProducer};

// Debug proxy implementations that call the standalone debug functions
impl fmt::Debug for ByteRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        StructDebug::debug_byte_ring(self, f)
    }
}

impl fmt::Debug for ChannelProducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        StructDebug::debug_channel_producer(self, f)
    }
}

impl fmt::Debug for ChannelConsumer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        StructDebug::debug_channel_consumer(self, f)
    }
}

impl<L: PeerLink> fmt::Debug for CommandQueue<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        StructDebug::debug_command_queue(self, f)
    }
}

impl fmt::Debug for Drain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        StructDebug::debug_drain(self, f)
    }
}
