//! `PriorityQueue` — capacity-bounded, priority-ordered grant queue.
//!
//! This is the scheduler-side primitive a [`ResourceTracker`] decorates.  It
//! knows nothing about time or entities: it only decides who holds a grant
//! and who is waiting.
//!
//! # Ordering
//!
//! Waiting requests are keyed by `(priority, request_id)` in a `BTreeMap`.
//! Request ids are issued in ascending order, so among equal priorities the
//! earlier request is served first (FIFO), and priority 0 overtakes the
//! default priority 1.  Grants are never preempted.
//!
//! [`ResourceTracker`]: crate::ResourceTracker

use std::collections::BTreeMap;

use qs_core::RequestId;

/// A capacity-bounded server that hands out grants in priority order.
///
/// Implement this to plug a different queueing discipline underneath a
/// `ResourceTracker`; [`PriorityQueue`] is the default.
pub trait PriorityResource {
    /// Maximum number of simultaneously held grants.
    fn capacity(&self) -> usize;

    /// Issue a request.  Returns its id and whether it was granted
    /// immediately.
    fn request(&mut self, priority: i64) -> (RequestId, bool);

    /// Give back a grant, or withdraw a request still waiting.
    ///
    /// Returns the waiting requests promoted to a grant as a result, in the
    /// order they were granted.  Unknown ids are ignored.
    fn release(&mut self, request: RequestId) -> Vec<RequestId>;

    /// `true` if `request` currently holds a grant.
    fn is_granted(&self, request: RequestId) -> bool;

    /// Number of grants currently held.
    fn count(&self) -> usize;

    /// Number of requests waiting for a grant.
    fn queue_len(&self) -> usize;
}

/// Default [`PriorityResource`]: ascending priority, then FIFO.
#[derive(Debug)]
pub struct PriorityQueue {
    capacity: usize,
    /// Granted requests, in grant order.
    users:    Vec<RequestId>,
    waiting:  BTreeMap<(i64, u64), RequestId>,
    next_id:  u64,
}

impl PriorityQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            users:   Vec::with_capacity(capacity),
            waiting: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// Granted requests, oldest grant first.
    pub fn users(&self) -> &[RequestId] {
        &self.users
    }

    /// Waiting requests in the order they will be served.
    pub fn waiting(&self) -> impl Iterator<Item = RequestId> + '_ {
        self.waiting.values().copied()
    }

    fn promote(&mut self) -> Vec<RequestId> {
        let mut promoted = Vec::new();
        while self.users.len() < self.capacity {
            let Some((_, next)) = self.waiting.pop_first() else {
                break;
            };
            self.users.push(next);
            promoted.push(next);
        }
        promoted
    }
}

impl PriorityResource for PriorityQueue {
    fn capacity(&self) -> usize {
        self.capacity
    }

    fn request(&mut self, priority: i64) -> (RequestId, bool) {
        let id = RequestId(self.next_id);
        self.next_id += 1;

        // Work-conserving: waiting is always empty while a slot is free.
        if self.users.len() < self.capacity {
            self.users.push(id);
            (id, true)
        } else {
            self.waiting.insert((priority, id.0), id);
            (id, false)
        }
    }

    fn release(&mut self, request: RequestId) -> Vec<RequestId> {
        if let Some(pos) = self.users.iter().position(|&r| r == request) {
            self.users.remove(pos);
            return self.promote();
        }
        self.waiting.retain(|_, r| *r != request);
        Vec::new()
    }

    fn is_granted(&self, request: RequestId) -> bool {
        self.users.contains(&request)
    }

    fn count(&self) -> usize {
        self.users.len()
    }

    fn queue_len(&self) -> usize {
        self.waiting.len()
    }
}
