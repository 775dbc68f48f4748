//! `Calendar` — pending activity resumptions ordered by simulated time.
//!
//! Keys are `(time, seq)` where `seq` increases with every push, so tasks
//! scheduled for the same instant resume in the order they were scheduled.

use std::collections::BTreeMap;

use qs_core::{SimTime, TaskId};

#[derive(Debug, Default)]
pub struct Calendar {
    inner: BTreeMap<(SimTime, u64), TaskId>,
    seq:   u64,
}

impl Calendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `task` to resume at `at`.
    pub fn push(&mut self, at: SimTime, task: TaskId) {
        self.inner.insert((at, self.seq), task);
        self.seq += 1;
    }

    /// Remove and return the earliest entry.
    pub fn pop(&mut self) -> Option<(SimTime, TaskId)> {
        self.inner.pop_first().map(|((at, _), task)| (at, task))
    }

    /// Time of the earliest entry, or `None` if nothing is scheduled.
    pub fn next_time(&self) -> Option<SimTime> {
        self.inner.keys().next().map(|(at, _)| *at)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
