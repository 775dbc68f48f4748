//! `qs-core` — foundational types for the `rust_qs` queueing instrumentation
//! framework.
//!
//! This crate is a dependency of every other `qs-*` crate.  It intentionally
//! has no `qs-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module      | Contents                                                     |
//! |-------------|--------------------------------------------------------------|
//! | [`ids`]     | `EntityId`, `ResourceId`, `RequestId`, `TaskId`              |
//! | [`time`]    | `SimTime`, `SimClock`, `SimConfig`, `SampleFrequency`        |
//! | [`attr`]    | `AttrValue`, `Attributes`, priority constants                |
//! | [`rng`]     | `SimRng`                                                     |
//! | [`error`]   | `QsError`, `QsResult`, `ModelError`                          |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                                  |
//! |---------|-------------------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to config, time, attributes and id types |

pub mod attr;
pub mod error;
pub mod ids;
pub mod rng;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use attr::{AttrValue, Attributes, DEFAULT_PRIORITY, PRIORITY_KEY, QUEUE_JUMP_PRIORITY, TYPE_KEY};
pub use error::{ModelError, QsError, QsResult};
pub use ids::{EntityId, RequestId, ResourceId, TaskId};
pub use rng::SimRng;
pub use time::{SampleFrequency, SimClock, SimConfig, SimTime};
