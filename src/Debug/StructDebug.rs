use std::fmt;

use crate::Bridge::Drain;
use crate::Command::CommandQueue;
use crate::Core::link::PeerLink;
use crate::SPSC::Buffer::ByteRing;
use crate::SPSC::{ChannelConsumer, ChannelProducer};

/// Debug function for ByteRing
///
/// Shows the cursors as loaded at the time of the call, never the storage.
pub fn debug_byte_ring(ring: &ByteRing, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let (write, read) = ring.cursors();
    f.debug_struct("ByteRing")
        .field("capacity", &ring.capacity())
        .field("write", &write)
        .field("read", &read)
        .field("count", &ring.count())
        .finish()
}

pub fn debug_channel_producer(p: &ChannelProducer, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ChannelProducer")
        .field("channel", &p.meta().label())
        .field("count", &p.count())
        .field("stats", &p.stats())
        .finish()
}

pub fn debug_channel_consumer(c: &ChannelConsumer, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ChannelConsumer")
        .field("channel", &c.meta().label())
        .field("count", &c.count())
        .finish()
}

/// Debug function for CommandQueue
///
/// Takes the queue lock for the duration of the call. The link is opaque.
pub fn debug_command_queue<L: PeerLink>(
    queue: &CommandQueue<L>,
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    let state = queue.state.lock();
    f.debug_struct("CommandQueue")
        .field("link", &"<opaque>")
        .field("capacity", &queue.capacity())
        .field("len", &state.len())
        .field("insert_index", &state.insert_index)
        .field("dispatch_index", &state.dispatch_index)
        .field("in_flight", &state.in_flight)
        .field("submitting", &state.submitting)
        .finish()
}

pub fn debug_drain(drain: &Drain, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Drain")
        .field("channel", &drain.consumer.meta().label())
        .field("policy", &drain.policy)
        .field("pending", &drain.pending)
        .field("totals", &drain.totals)
        .finish_non_exhaustive()
}
