use crossbeam_utils::CachePadded;
use std::sync::atomic::AtomicUsize;

/// Cursor pair of one byte ring.
///
/// Both cursors count bytes since creation and wrap at `usize::MAX`; the
/// storage index is `cursor & mask`. Each sits on its own cache line so the
/// producer's stores never invalidate the line the consumer spins on.
#[repr(C)]
pub struct RingCursors {
    /// Producer cursor. Stored only by the producer, after the byte it
    /// covers has been written.
    pub write: CachePadded<AtomicUsize>,

    /// Consumer cursor. Stored only by the consumer, after the byte it
    /// covers has been read.
    pub read: CachePadded<AtomicUsize>,
}

impl RingCursors {
    pub const fn new() -> Self {
        Self {
            write: CachePadded::new(AtomicUsize::new(0)),
            read: CachePadded::new(AtomicUsize::new(0)),
        }
    }
}

impl Default for RingCursors {
    fn default() -> Self {
        Self::new()
    }
}
