use std::cell::UnsafeCell;
use std::sync::atomic::Ordering::{Acquire, Relaxed, Release};

use super::layout::RingCursors;
use super::Buffer::ByteRing;
use crate::Core::error::{BridgeError, BridgeResult};

impl ByteRing {
    /// Allocate a zeroed ring of `capacity` bytes.
    pub fn new(capacity: usize) -> BridgeResult<Self> {
        if capacity < 2 || !capacity.is_power_of_two() {
            return Err(BridgeError::InvalidCapacity(capacity));
        }
        Self::with_storage(vec![0u8; capacity].into_boxed_slice())
    }

    /// Bind a ring to caller-provided storage. The storage length is the
    /// capacity and must be a power of two (at least 2).
    pub fn with_storage(storage: Box<[u8]>) -> BridgeResult<Self> {
        let capacity = storage.len();
        // Validate capacity is a power of two; one slot stays reserved
        if capacity < 2 || !capacity.is_power_of_two() {
            return Err(BridgeError::InvalidCapacity(capacity));
        }

        let storage: Box<[UnsafeCell<u8>]> = storage.into_vec().into_iter().map(UnsafeCell::new).collect();

        Ok(Self {
            cursors: RingCursors::new(),
            storage,
            capacity,
            mask: capacity - 1,
        })
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most bytes the ring can hold at once (`capacity - 1`).
    #[inline]
    pub fn usable(&self) -> usize {
        self.mask
    }

    /// Number of unread bytes.
    ///
    /// Safe from any context. When observed by a third party mid-update the
    /// value is clamped to the usable capacity.
    #[inline]
    pub fn count(&self) -> usize {
        let read = self.cursors.read.load(Acquire);
        let write = self.cursors.write.load(Acquire);
        write.wrapping_sub(read).min(self.mask)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.count() == self.mask
    }

    /// Raw cursor values (write, read), for diagnostics.
    pub fn cursors(&self) -> (usize, usize) {
        (
            self.cursors.write.load(Relaxed),
            self.cursors.read.load(Relaxed),
        )
    }

    #[inline]
    unsafe fn cell(&self, cursor: usize) -> *mut u8 {
        self.storage[cursor & self.mask].get()
    }

    /// Append one byte. Returns `false` and leaves the ring untouched when full.
    ///
    /// # Safety
    /// Caller must be the ring's only producer.
    pub(crate) unsafe fn push(&self, byte: u8) -> bool {
        let write = self.cursors.write.load(Relaxed);
        let read = self.cursors.read.load(Acquire);

        if write.wrapping_sub(read) >= self.mask {
            // full
            return false;
        }

        *self.cell(write) = byte;
        // Publish
        self.cursors.write.store(write.wrapping_add(1), Release);
        true
    }

    /// Append as many leading bytes of `bytes` as fit, publishing them with a
    /// single cursor store. Returns how many were taken.
    ///
    /// # Safety
    /// Caller must be the ring's only producer.
    pub(crate) unsafe fn push_slice(&self, bytes: &[u8]) -> usize {
        let write = self.cursors.write.load(Relaxed);
        let read = self.cursors.read.load(Acquire);

        let free = self.mask - write.wrapping_sub(read);
        let n = bytes.len().min(free);
        if n == 0 {
            return 0;
        }

        for (i, &b) in bytes[..n].iter().enumerate() {
            *self.cell(write.wrapping_add(i)) = b;
        }

        self.cursors.write.store(write.wrapping_add(n), Release);
        n
    }

    /// Remove the oldest byte, or `None` if the ring is empty.
    ///
    /// # Safety
    /// Caller must be the ring's only consumer.
    pub(crate) unsafe fn pop(&self) -> Option<u8> {
        let read = self.cursors.read.load(Relaxed);
        let write = self.cursors.write.load(Acquire);

        if read == write {
            // empty
            return None;
        }

        let byte = *self.cell(read);
        // free slot for the producer
        self.cursors.read.store(read.wrapping_add(1), Release);
        Some(byte)
    }

    /// Fill `out` completely from the ring, or take nothing if fewer than
    /// `out.len()` bytes are unread.
    ///
    /// # Safety
    /// Caller must be the ring's only consumer.
    pub(crate) unsafe fn pop_exact(&self, out: &mut [u8]) -> bool {
        let read = self.cursors.read.load(Relaxed);
        let write = self.cursors.write.load(Acquire);

        if write.wrapping_sub(read) < out.len() {
            return false;
        }

        for (i, slot) in out.iter_mut().enumerate() {
            *slot = *self.cell(read.wrapping_add(i));
        }

        self.cursors.read.store(read.wrapping_add(out.len()), Release);
        true
    }
}
