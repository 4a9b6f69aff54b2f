use parking_lot::Mutex;
use radio_bridge::{
    AttHandle, BridgeError, CommandQueue, Confirmation, ConnHandle, Operation, PeerLink, RejectReason,
    RequestId, SubmitError,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::thread;

/// Records every submission; refuses the next `refuse` calls with `Busy`.
#[derive(Default)]
struct RecordingLink {
    submitted: Mutex<Vec<(ConnHandle, Operation)>>,
    refuse: AtomicUsize,
}

impl RecordingLink {
    fn submitted(&self) -> Vec<(ConnHandle, Operation)> {
        self.submitted.lock().clone()
    }
}

impl PeerLink for RecordingLink {
    fn submit(&self, target: ConnHandle, op: &Operation) -> Result<(), SubmitError> {
        if self.refuse.load(Ordering::Relaxed) > 0 {
            self.refuse.fetch_sub(1, Ordering::Relaxed);
            return Err(SubmitError::Busy);
        }
        self.submitted.lock().push((target, *op));
        Ok(())
    }
}

const C1: ConnHandle = ConnHandle(1);
const C2: ConnHandle = ConnHandle(2);

#[test]
fn write_on_empty_queue_is_submitted_immediately() {
    let queue = CommandQueue::new(RecordingLink::default());
    let op = Operation::write(AttHandle(0x10), &[0xAA, 0xBB]).unwrap();

    let id = queue.enqueue(C1, op).unwrap();
    assert_eq!(queue.link().submitted(), vec![(C1, op)]);
    assert_eq!(queue.in_flight().map(|r| r.id), Some(id));

    let done = queue.advance_on_confirmation(Confirmation::Success).unwrap();
    assert_eq!(done.id, id);
    assert_eq!(done.target, C1);
    assert_eq!(done.op, op);
    assert_eq!(done.outcome, Confirmation::Success);

    assert!(queue.is_empty());
    assert!(queue.in_flight().is_none());
    assert_eq!(queue.link().submitted().len(), 1);
}

#[test]
fn submissions_follow_enqueue_order() {
    let queue = CommandQueue::new(RecordingLink::default());
    let ops = [
        Operation::read(AttHandle(0x20)),
        Operation::write(AttHandle(0x21), &[1]).unwrap(),
        Operation::enable_notifications(AttHandle(0x22)),
    ];

    for op in ops {
        queue.enqueue(C1, op).unwrap();
    }
    // only the head goes out until it is confirmed
    assert_eq!(queue.link().submitted().len(), 1);

    let mut completed = Vec::new();
    while let Some(done) = queue.advance_on_confirmation(Confirmation::Success) {
        completed.push(done.id);
    }

    assert_eq!(completed, vec![RequestId(0), RequestId(1), RequestId(2)]);
    let sent: Vec<Operation> = queue.link().submitted().into_iter().map(|(_, op)| op).collect();
    assert_eq!(sent, ops);
}

#[test]
fn recoverable_rejection_reissues_same_request() {
    let queue = CommandQueue::new(RecordingLink::default());
    let op = Operation::read(AttHandle(0x30));
    queue.enqueue(C1, op).unwrap();

    let rejections = 3;
    for i in 0..rejections {
        let reason = if i % 2 == 0 {
            RejectReason::InsufficientAuthentication
        } else {
            RejectReason::InsufficientEncryption
        };
        assert!(queue.advance_on_confirmation(Confirmation::Rejected(reason)).is_none());
        assert_eq!(queue.len(), 1);
    }

    let done = queue.advance_on_confirmation(Confirmation::Success).unwrap();
    assert_eq!(done.op, op);

    let sent = queue.link().submitted();
    assert_eq!(sent.len(), rejections + 1);
    assert!(sent.iter().all(|s| *s == (C1, op)));
}

#[test]
fn failed_status_discards_and_moves_on() {
    let queue = CommandQueue::new(RecordingLink::default());
    queue.enqueue(C1, Operation::read(AttHandle(1))).unwrap();
    queue.enqueue(C1, Operation::read(AttHandle(2))).unwrap();

    let done = queue.advance_on_confirmation(Confirmation::from_gatt_status(0x0101)).unwrap();
    assert_eq!(done.outcome, Confirmation::Failed(0x0101));
    assert_eq!(queue.in_flight().map(|r| r.op.handle()), Some(AttHandle(2)));
}

#[test]
fn gatt_status_classification() {
    assert_eq!(Confirmation::from_gatt_status(0), Confirmation::Success);
    assert_eq!(
        Confirmation::from_gatt_status(0x0105),
        Confirmation::Rejected(RejectReason::InsufficientAuthentication)
    );
    assert_eq!(
        Confirmation::from_gatt_status(0x010F),
        Confirmation::Rejected(RejectReason::InsufficientEncryption)
    );
    assert!(Confirmation::from_gatt_status(0x010F).is_recoverable());
    assert!(!Confirmation::from_gatt_status(0x0181).is_recoverable());
}

#[test]
fn full_queue_rejects_without_overwriting() {
    let queue = CommandQueue::new(RecordingLink::default());
    assert_eq!(queue.capacity(), 8);

    for i in 0..8u16 {
        queue.enqueue(C1, Operation::read(AttHandle(i))).unwrap();
    }
    let err = queue.enqueue(C1, Operation::read(AttHandle(99))).unwrap_err();
    assert!(matches!(err, BridgeError::QueueFull { capacity: 8 }));

    let handles: Vec<u16> = queue.pending().iter().map(|r| r.op.handle().0).collect();
    assert_eq!(handles, (0..8).collect::<Vec<_>>());

    // one slot frees up after a confirmation
    queue.advance_on_confirmation(Confirmation::Success).unwrap();
    queue.enqueue(C1, Operation::read(AttHandle(99))).unwrap();
    assert_eq!(queue.len(), 8);
}

#[test]
fn submit_error_keeps_request_for_retry() {
    let link = RecordingLink::default();
    link.refuse.store(2, Ordering::Relaxed);
    let queue = CommandQueue::new(link);

    let id = queue.enqueue(C1, Operation::read(AttHandle(5))).unwrap();
    assert!(queue.link().submitted().is_empty());
    assert!(queue.in_flight().is_none());
    assert_eq!(queue.len(), 1);

    queue.kick();
    assert!(queue.link().submitted().is_empty());

    queue.kick();
    assert_eq!(queue.link().submitted().len(), 1);
    assert_eq!(queue.in_flight().map(|r| r.id), Some(id));

    // already in flight: kicking again must not resubmit
    queue.kick();
    assert_eq!(queue.link().submitted().len(), 1);
}

#[test]
fn enqueue_retries_a_refused_head() {
    let link = RecordingLink::default();
    link.refuse.store(1, Ordering::Relaxed);
    let queue = CommandQueue::new(link);

    queue.enqueue(C1, Operation::read(AttHandle(1))).unwrap();
    queue.enqueue(C1, Operation::read(AttHandle(2))).unwrap();

    // the second enqueue re-drives the head, not the new request
    assert_eq!(queue.link().submitted(), vec![(C1, Operation::read(AttHandle(1)))]);
}

#[test]
fn spurious_confirmation_is_ignored() {
    let queue = CommandQueue::new(RecordingLink::default());
    assert!(queue.advance_on_confirmation(Confirmation::Success).is_none());
    assert!(queue.is_empty());
    assert!(queue.link().submitted().is_empty());
}

#[test]
fn discard_target_drops_only_that_connection() {
    let queue = CommandQueue::new(RecordingLink::default());
    queue.enqueue(C1, Operation::read(AttHandle(1))).unwrap();
    queue.enqueue(C2, Operation::read(AttHandle(2))).unwrap();
    queue.enqueue(C1, Operation::read(AttHandle(3))).unwrap();
    queue.enqueue(C2, Operation::read(AttHandle(4))).unwrap();

    assert_eq!(queue.discard_target(C1), 2);

    let left: Vec<u16> = queue.pending().iter().map(|r| r.op.handle().0).collect();
    assert_eq!(left, vec![2, 4]);
    // the removed head was in flight, so the next one went out
    assert_eq!(queue.in_flight().map(|r| r.target), Some(C2));
    assert_eq!(
        queue.link().submitted(),
        vec![(C1, Operation::read(AttHandle(1))), (C2, Operation::read(AttHandle(2)))]
    );
}

#[test]
fn write_payload_limits() {
    assert!(Operation::write(AttHandle(1), &[0u8; 20]).is_ok());
    let err = Operation::write(AttHandle(1), &[0u8; 21]).unwrap_err();
    assert!(matches!(err, BridgeError::PayloadTooLarge { len: 21, max: 20 }));

    match Operation::enable_notifications(AttHandle(0x12)) {
        Operation::Write { handle, payload } => {
            assert_eq!(handle, AttHandle(0x12));
            assert_eq!(payload.as_bytes(), &[0x01, 0x00]);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn rejects_non_power_of_two_capacity() {
    assert!(matches!(
        CommandQueue::with_capacity(RecordingLink::default(), 6),
        Err(BridgeError::InvalidCapacity(6))
    ));
    let queue = CommandQueue::with_capacity(RecordingLink::default(), 2).unwrap();
    queue.enqueue(C1, Operation::read(AttHandle(1))).unwrap();
    queue.enqueue(C1, Operation::read(AttHandle(2))).unwrap();
    assert!(queue.enqueue(C1, Operation::read(AttHandle(3))).is_err());
}

#[test]
fn enqueue_and_confirm_from_different_threads() {
    const TOTAL: u64 = 500;
    let queue = Arc::new(CommandQueue::new(RecordingLink::default()));

    let app = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || {
            let mut sent = 0u64;
            while sent < TOTAL {
                match queue.enqueue(C1, Operation::read(AttHandle(sent as u16))) {
                    Ok(_) => sent += 1,
                    Err(BridgeError::QueueFull { .. }) => thread::yield_now(),
                    Err(e) => panic!("unexpected error: {e}"),
                }
            }
        })
    };

    let mut next = 0u64;
    while next < TOTAL {
        if queue.in_flight().is_some() {
            let done = queue.advance_on_confirmation(Confirmation::Success).unwrap();
            assert_eq!(done.id, RequestId(next));
            next += 1;
        } else {
            thread::yield_now();
        }
    }

    app.join().unwrap();
    assert!(queue.is_empty());
    assert_eq!(queue.link().submitted().len() as u64, TOTAL);
}

/// Confirms synchronously from inside `submit`, rejecting the first
/// `rejections` attempts.
struct SynchronousLink {
    queue: Weak<CommandQueue<SynchronousLink>>,
    rejections: AtomicUsize,
    submitted: AtomicUsize,
}

impl PeerLink for SynchronousLink {
    fn submit(&self, _target: ConnHandle, _op: &Operation) -> Result<(), SubmitError> {
        self.submitted.fetch_add(1, Ordering::Relaxed);
        let Some(queue) = self.queue.upgrade() else {
            return Ok(());
        };
        let outcome = if self.rejections.load(Ordering::Relaxed) > 0 {
            self.rejections.fetch_sub(1, Ordering::Relaxed);
            Confirmation::Rejected(RejectReason::InsufficientEncryption)
        } else {
            Confirmation::Success
        };
        queue.advance_on_confirmation(outcome);
        Ok(())
    }
}

#[test]
fn confirmation_from_inside_submit_does_not_recurse() {
    const REJECTIONS: usize = 100_000;
    let queue = Arc::new_cyclic(|weak| {
        CommandQueue::new(SynchronousLink {
            queue: weak.clone(),
            rejections: AtomicUsize::new(REJECTIONS),
            submitted: AtomicUsize::new(0),
        })
    });

    queue.enqueue(C1, Operation::read(AttHandle(1))).unwrap();
    queue.enqueue(C1, Operation::read(AttHandle(2))).unwrap();

    // every rejection and both completions were handled before enqueue returned
    assert!(queue.is_empty());
    assert!(queue.in_flight().is_none());
    assert_eq!(queue.link().submitted.load(Ordering::Relaxed), REJECTIONS + 2);
}
