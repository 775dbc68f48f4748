//! `qs-resource` — resource-contention tracking for the `rust_qs` framework.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                     |
//! |--------------|--------------------------------------------------------------|
//! | [`queue`]    | `PriorityResource` trait, `PriorityQueue` (default impl)     |
//! | [`event`]    | `ResourceEvent`, `EventKind`                                 |
//! | [`series`]   | `resample`, `SeriesKind` — fixed-frequency time series       |
//! | [`tracker`]  | `ResourceTracker<E>`, `ResourceTrackerBuilder<E>`, `ServiceTime<E>` |
//! | [`pool`]     | `ResourcePool<E>` (arena keyed by `ResourceId`)              |
//!
//! # Event log model
//!
//! ```text
//! request(priority)   → forward to PriorityResource, log (now, queue, count, Request)
//! add_resource_check  → log (now, queue, count, Start)          at service start
//! release(request)    → forward, promote waiters, log (now, queue, count, Release)
//! ```
//!
//! Series queries resample that log onto a 0.01 / 0.1 / 1 grid over
//! `[0, now)` with last-write-wins per grid cell and carry-forward between
//! cells.

pub mod event;
pub mod pool;
pub mod queue;
pub mod series;
pub mod tracker;


pub use event::{EventKind, ResourceEvent};
pub use pool::ResourcePool;
pub use queue::{PriorityQueue, PriorityResource};
pub use series::{resample, SeriesKind};
pub use tracker::{ResourceTracker, ResourceTrackerBuilder, ServiceTime};
