//! `qs-stats` — the run-scoped statistics registry.
//!
//! A [`RunStats`] is created fresh for every simulation run and owned by the
//! caller that drives the run.  Entities are registered when created,
//! resources when first visited; queries are answered after (or during) the
//! run and only ever consider disposed entities.
//!
//! | Module       | Contents                                 |
//! |--------------|------------------------------------------|
//! | [`registry`] | `RunStats` and its queries               |
//! | [`summary`]  | `RunSummary`, `mean`                     |

pub mod registry;
pub mod summary;


pub use registry::RunStats;
pub use summary::{mean, RunSummary};
