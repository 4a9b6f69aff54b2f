// Layout checks for the ring cursors. The producer and consumer cursors
// must sit on separate cache lines so the two contexts never false-share.
use crossbeam_utils::CachePadded;
use memoffset::offset_of;
use radio_bridge::SPSC::Buffer::RingCursors;
use std::mem::{align_of, size_of};
use std::sync::atomic::AtomicUsize;

#[test]
fn test_ring_cursors_layout() {
    let line = align_of::<CachePadded<AtomicUsize>>();
    let size = size_of::<RingCursors>();
    let align = align_of::<RingCursors>();
    let off_write = offset_of!(RingCursors, write);
    let off_read = offset_of!(RingCursors, read);

    println!("RingCursors => size: {size}, align: {align}, line: {line}, offsets: [write:{off_write}, read:{off_read}]");

    assert!(line >= 32);
    assert_eq!(align, line);
    assert_eq!(off_write, 0);
    assert_eq!(off_read, line);
    assert_eq!(size, 2 * line);
}

#[test]
fn test_cursors_start_at_zero() {
    let cursors = RingCursors::new();
    assert_eq!(cursors.write.load(std::sync::atomic::Ordering::Relaxed), 0);
    assert_eq!(cursors.read.load(std::sync::atomic::Ordering::Relaxed), 0);
}
