// Request pacing for a peer that allows one outstanding request at a time.

use parking_lot::Mutex;

use super::confirmation::{Completed, Confirmation};
use super::request::{Operation, Request, RequestId};
use crate::Core::config::DEFAULT_COMMAND_CAPACITY;
use crate::Core::error::{BridgeError, BridgeResult};
use crate::Core::link::{ConnHandle, PeerLink};

/// Slot storage and cursors. Only touched with the queue lock held.
pub(crate) struct QueueState {
    pub(crate) slots: Box<[Option<Request>]>,
    /// Next slot to insert into. Monotonic, masked on access.
    pub(crate) insert_index: u64,
    /// Slot in flight or next to dispatch. Never passes `insert_index`.
    pub(crate) dispatch_index: u64,
    /// Set between a successful hand-off to the link and its confirmation.
    pub(crate) in_flight: bool,
    /// A call into `PeerLink::submit` is on the stack.
    pub(crate) submitting: bool,
    next_id: u64,
}

impl QueueState {
    #[inline]
    pub(crate) fn len(&self) -> usize {
        (self.insert_index - self.dispatch_index) as usize
    }

    #[inline]
    fn index(&self, cursor: u64) -> usize {
        (cursor as usize) & (self.slots.len() - 1)
    }

    fn head(&self) -> Option<Request> {
        if self.len() == 0 {
            return None;
        }
        self.slots[self.index(self.dispatch_index)]
    }

    fn push(&mut self, request: Request) {
        let idx = self.index(self.insert_index);
        self.slots[idx] = Some(request);
        self.insert_index += 1;
    }

    fn pop(&mut self) -> Option<Request> {
        if self.len() == 0 {
            return None;
        }
        let idx = self.index(self.dispatch_index);
        self.dispatch_index += 1;
        self.slots[idx].take()
    }
}

/// Fixed-capacity FIFO of requests to one peer.
///
/// ### State machine:
/// - **Idle**: empty, nothing submitted.
/// - **InFlight**: the head request was accepted by the link and awaits its
///   confirmation. A recoverable rejection loops back to InFlight with the
///   same request; any other outcome retires it and submits the next one.
///
/// A submission the link refuses leaves the head in place but not in
/// flight; the next `enqueue`, confirmation or [`kick`](Self::kick) tries it
/// again. Requests are never dropped because of a submission error.
///
/// Occupancy is tracked explicitly, so all `capacity` slots are usable.
/// `enqueue` and `advance_on_confirmation` may run on different contexts;
/// the cursor updates happen under one lock, which is released before the
/// link is called.
pub struct CommandQueue<L: PeerLink> {
    link: L,
    pub(crate) state: Mutex<QueueState>,
    capacity: usize,
}

impl<L: PeerLink> CommandQueue<L> {
    /// Queue with the default capacity of 8 requests.
    pub fn new(link: L) -> Self {
        Self::build(link, DEFAULT_COMMAND_CAPACITY)
    }

    /// Queue with `capacity` slots. Must be a non-zero power of two.
    pub fn with_capacity(link: L, capacity: usize) -> BridgeResult<Self> {
        if !capacity.is_power_of_two() {
            return Err(BridgeError::InvalidCapacity(capacity));
        }
        Ok(Self::build(link, capacity))
    }

    fn build(link: L, capacity: usize) -> Self {
        Self {
            link,
            state: Mutex::new(QueueState {
                slots: vec![None; capacity].into_boxed_slice(),
                insert_index: 0,
                dispatch_index: 0,
                in_flight: false,
                submitting: false,
                next_id: 0,
            }),
            capacity,
        }
    }

    /// Append a request and submit it right away if nothing is in flight.
    ///
    /// # Returns
    /// * `Ok(id)` identifying the request in the eventual [`Completed`]
    /// * `Err(QueueFull)` if every slot is taken; nothing is overwritten
    pub fn enqueue(&self, target: ConnHandle, op: Operation) -> BridgeResult<RequestId> {
        let id = {
            let mut st = self.state.lock();
            if st.len() == self.capacity {
                log::warn!(
                    "radio-bridge: command queue full, rejecting {:?} on {:?}",
                    op,
                    target
                );
                return Err(BridgeError::QueueFull {
                    capacity: self.capacity,
                });
            }

            let id = RequestId(st.next_id);
            st.next_id += 1;
            st.push(Request { id, target, op });
            id
        };

        self.submit_current();
        Ok(id)
    }

    /// Handle the stack's confirmation for the request in flight.
    ///
    /// A recoverable rejection keeps the request at the head and reissues it
    /// verbatim; anything else retires it. Either way the head is then
    /// (re)submitted if there is one.
    ///
    /// # Returns
    /// * `Some(completed)` when a request left the queue
    /// * `None` on a recoverable rejection, or if nothing was in flight
    pub fn advance_on_confirmation(&self, outcome: Confirmation) -> Option<Completed> {
        let completed = {
            let mut st = self.state.lock();
            if !st.in_flight {
                log::warn!(
                    "radio-bridge: confirmation {:?} with no request in flight, ignored",
                    outcome
                );
                None
            } else {
                st.in_flight = false;
                match outcome {
                    Confirmation::Rejected(reason) => {
                        log::debug!("radio-bridge: peer rejected head request ({reason}), reissuing");
                        None
                    }
                    Confirmation::Success | Confirmation::Failed(_) => {
                        let request = st.pop();
                        if let (Confirmation::Failed(status), Some(r)) = (outcome, request.as_ref()) {
                            log::warn!(
                                "radio-bridge: request {:?} {:?} failed with status 0x{:04x}, discarded",
                                r.id,
                                r.op,
                                status
                            );
                        }
                        request.map(|r| Completed {
                            id: r.id,
                            target: r.target,
                            op: r.op,
                            outcome,
                        })
                    }
                }
            }
        };

        self.submit_current();
        completed
    }

    /// Retry the head request if an earlier submission attempt was refused.
    pub fn kick(&self) {
        self.submit_current();
    }

    /// Drop every pending request addressed to `target`, e.g. after the
    /// connection went away. Returns how many were removed.
    pub fn discard_target(&self, target: ConnHandle) -> usize {
        let removed = {
            let mut st = self.state.lock();
            let head_id = st.head().map(|r| r.id);

            let mut kept = Vec::with_capacity(st.len());
            let mut removed = 0;
            while let Some(r) = st.pop() {
                if r.target == target {
                    if Some(r.id) == head_id {
                        st.in_flight = false;
                    }
                    removed += 1;
                } else {
                    kept.push(r);
                }
            }
            for r in kept {
                st.push(r);
            }
            removed
        };

        if removed > 0 {
            log::info!("radio-bridge: discarded {removed} pending request(s) for {:?}", target);
            self.submit_current();
        }
        removed
    }

    /// Hand the head to the link unless something is already in flight.
    ///
    /// A confirmation delivered while `submit` is still running (from inside
    /// it, or from another thread) only retires or keeps the head; the
    /// resubmission happens here once `submit` returns, so nested
    /// confirmations never grow the stack.
    fn submit_current(&self) {
        loop {
            let request = {
                let mut st = self.state.lock();
                if st.in_flight || st.submitting {
                    return;
                }
                let Some(request) = st.head() else {
                    return;
                };
                st.in_flight = true;
                st.submitting = true;
                request
            };

            let result = self.link.submit(request.target, &request.op);

            let mut st = self.state.lock();
            st.submitting = false;
            match result {
                Ok(()) => {
                    log::trace!("radio-bridge: submitted {:?} {:?}", request.id, request.op);
                    if st.in_flight {
                        return;
                    }
                    // confirmed before submit returned; go again with the new head
                }
                Err(e) => {
                    log::debug!(
                        "radio-bridge: link refused {:?} ({e}). This request will be attempted again..",
                        request.id
                    );
                    if st.head().map(|r| r.id) == Some(request.id) {
                        st.in_flight = false;
                    }
                    return;
                }
            }
        }
    }

    /// Request awaiting confirmation, if any.
    pub fn in_flight(&self) -> Option<Request> {
        let st = self.state.lock();
        if st.in_flight {
            st.head()
        } else {
            None
        }
    }

    /// Requests not yet retired, head first.
    pub fn pending(&self) -> Vec<Request> {
        let st = self.state.lock();
        (st.dispatch_index..st.insert_index)
            .filter_map(|c| st.slots[st.index(c)])
            .collect()
    }

    pub fn len(&self) -> usize {
        self.state.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn link(&self) -> &L {
        &self.link
    }
}
