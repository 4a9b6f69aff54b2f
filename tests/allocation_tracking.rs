// Allocation tracking for the hot paths.
//
// Note: the dhat test is marked with #[serial_test::serial] because dhat
// only allows one profiler at a time, and the memory-stats test shares the
// process heap with it.
//
// # Run all allocation tracking tests
// cargo test --test allocation_tracking -- --nocapture

use radio_bridge::{
    AttHandle, BackpressurePolicy, BulkWriter, ChannelBuilder, CommandQueue, Confirmation, ConnHandle, Drain,
    Operation, PeerLink, SubmitError, WriteError,
};
use std::sync::atomic::{AtomicU64, Ordering::Relaxed};

#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

#[derive(Default)]
struct CountingLink {
    submitted: AtomicU64,
}

impl PeerLink for CountingLink {
    fn submit(&self, _target: ConnHandle, _op: &Operation) -> Result<(), SubmitError> {
        self.submitted.fetch_add(1, Relaxed);
        Ok(())
    }
}

#[derive(Default)]
struct CountingWriter {
    transfers: u64,
    bytes: u64,
}

impl BulkWriter for CountingWriter {
    fn write(&mut self, transfer: &[u8]) -> Result<(), WriteError> {
        self.transfers += 1;
        self.bytes += transfer.len() as u64;
        Ok(())
    }
}

#[test]
#[serial_test::serial]
fn test_hot_paths_with_dhat() {
    let _profiler = dhat::Profiler::builder().testing().build();

    let (mut tx, rx) = ChannelBuilder::new().with_capacity(1024).with_transfer_unit(132).build().unwrap();
    let mut drain = Drain::new(rx, BackpressurePolicy::Drop);
    let mut writer = CountingWriter::default();
    let queue = CommandQueue::new(CountingLink::default());
    let notification = [0x5Au8; 244];
    let op = Operation::write(AttHandle(0x11), &[1, 0]).unwrap();

    let before = dhat::HeapStats::get();

    for _ in 0..1000 {
        tx.deliver(&notification).unwrap();
        drain.drain(&mut writer);

        queue.enqueue(ConnHandle(1), op).unwrap();
        queue.advance_on_confirmation(Confirmation::Success).unwrap();
    }

    let after = dhat::HeapStats::get();
    dhat::assert_eq!(after.total_blocks, before.total_blocks);
    dhat::assert_eq!(writer.bytes, writer.transfers * 132);
    dhat::assert_eq!(queue.link().submitted.load(Relaxed), 1000);
}

#[test]
#[serial_test::serial]
fn test_ring_with_memory_stats() {
    println!("\n--- Running channel ring with memory-stats ---");
    use memory_stats::memory_stats;

    let before = memory_stats();
    println!("Memory before: {:?}", before);

    let (mut tx, mut rx) = ChannelBuilder::new().build().unwrap();
    let mut out = [0u8; 2044];
    for i in 0..10_000usize {
        tx.put_slice(&[(i % 256) as u8; 244]);
        while rx.count() >= out.len() {
            rx.read_into(&mut out).unwrap();
        }
    }

    let after = memory_stats();
    println!("Memory after: {:?}", after);
    if let (Some(b), Some(a)) = (before, after) {
        println!(
            "Physical delta: {} bytes",
            a.physical_mem as i64 - b.physical_mem as i64
        );
    }
    assert!(rx.count() < out.len());
}
