//! Simulation observer trait for progress reporting and data collection.

use qs_core::{EntityId, SimTime, TaskId};
use qs_entity::Entity;
use qs_stats::RunStats;

/// Callbacks invoked by [`Sim`][crate::Sim] at key points of a run.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example — arrival printer
///
/// ```rust,ignore
/// struct Arrivals;
///
/// impl SimObserver for Arrivals {
///     fn on_entity_created(&mut self, _id: EntityId, entity: &Entity) {
///         println!("{entity}");
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called once by `start`, before anything is scheduled.
    fn on_run_start(&mut self, _now: SimTime) {}

    /// Called when an entity arrives and its activity is launched.
    fn on_entity_created(&mut self, _id: EntityId, _entity: &Entity) {}

    /// Called after an entity's completion hook has run.
    fn on_entity_disposed(&mut self, _id: EntityId, _entity: &Entity) {}

    /// Called before every task resumption.
    fn on_step(&mut self, _now: SimTime, _task: TaskId) {}

    /// Called once the run stops, with the final clock and statistics.
    fn on_run_end(&mut self, _now: SimTime, _stats: &RunStats) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
