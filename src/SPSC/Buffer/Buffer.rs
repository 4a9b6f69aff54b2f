// This is the per-channel byte ring shared by one producer and one consumer

use super::layout::RingCursors;

use std::cell::UnsafeCell;

/// A bounded, lock-free, single-producer single-consumer byte ring.
///
/// ### Full/empty policy:
/// One slot is always kept free. The ring is empty when both cursors are
/// equal and full when `capacity - 1` bytes are unread, so a ring of
/// capacity 16384 holds at most 16383 bytes.
///
/// ### Concurrency Design:
/// - **Producer (put)**: loads `read` with `Acquire` to learn the free
///   space, writes the payload byte, then publishes `write` with `Release`.
///   The consumer can therefore never observe a cursor covering a byte that
///   has not been written yet.
/// - **Consumer (get)**: loads `write` with `Acquire`, copies the payload
///   byte out, then publishes `read` with `Release`, handing the slot back.
/// - **count**: may be called from either side or a third party; it only
///   loads the cursors.
///
/// The ring itself does not stop two producers from racing. That discipline
/// is enforced by [`ChannelProducer`](crate::ChannelProducer) and
/// [`ChannelConsumer`](crate::ChannelConsumer), which are the only handles
/// allowed to mutate it and are not `Clone`.
pub struct ByteRing {
    /// Producer and consumer cursors.
    pub(crate) cursors: RingCursors,

    /// Backing storage, bound once at construction.
    pub(crate) storage: Box<[UnsafeCell<u8>]>,

    /// The capacity of the ring in bytes (power of two).
    pub(crate) capacity: usize,

    /// A bitmask used to wrap cursors around the ring.
    /// Calculated as `capacity - 1`.
    pub(crate) mask: usize,
}

// Each storage cell is written only by the producer while it lies outside
// [read, write), and read only by the consumer while it lies inside.
unsafe impl Send for ByteRing {}
unsafe impl Sync for ByteRing {}
