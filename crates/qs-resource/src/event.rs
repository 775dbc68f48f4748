//! Timestamped contention snapshots logged by a `ResourceTracker`.

use std::fmt;

use qs_core::SimTime;

/// What triggered a snapshot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventKind {
    /// An entity asked for a grant.
    Request,
    /// An entity began service (logged via `add_resource_check`).
    Start,
    /// An entity gave its grant back.
    Release,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventKind::Request => "request",
            EventKind::Start => "start",
            EventKind::Release => "release",
        };
        f.write_str(s)
    }
}

/// One immutable entry of a resource's chronological event log.
///
/// `queue_len` counts requests still waiting for a grant; `occupancy` counts
/// grants currently held.  An entity in service is never part of the queue.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceEvent {
    pub time:      SimTime,
    pub queue_len: usize,
    pub occupancy: usize,
    pub kind:      EventKind,
}
