//! The `Sim` struct and its event-calendar loop.

use std::collections::HashMap;

use qs_core::{
    EntityId, QsError, QsResult, RequestId, ResourceId, SimClock, SimConfig, SimRng, SimTime,
    TaskId,
};
use qs_entity::{Entity, Resources};
use qs_stats::RunStats;
use tracing::{debug, info, trace};

use crate::source::Arrival;
use crate::{Activity, Calendar, EntityCtx, SimError, SimObserver, SimResult, Source, Step};

/// Runs when an entity's activity returns [`Step::Done`].
pub type CompletionHook = Box<dyn FnOnce(&mut RunStats, EntityId, SimTime) -> QsResult<()>>;

/// The default completion hook: dispose the entity at the completion instant.
pub fn dispose_on_completion() -> CompletionHook {
    Box::new(|stats: &mut RunStats, id: EntityId, now: SimTime| {
        stats
            .entity_mut(id)
            .ok_or_else(|| QsError::invalid_state(format!("{id} is not registered")))?
            .dispose(now)
    })
}

// ── Tasks ─────────────────────────────────────────────────────────────────────

pub(crate) struct EntityTask {
    entity:      EntityId,
    activity:    Box<dyn Activity>,
    on_complete: Option<CompletionHook>,
}

pub(crate) struct SourceTask {
    source:  Source,
    /// Generated entity whose arrival the source is waiting for.
    pending: Option<Arrival>,
}

pub(crate) enum Task {
    Source(SourceTask),
    Entity(EntityTask),
}

// ── Sim ───────────────────────────────────────────────────────────────────────

/// A single-threaded cooperative scheduler driving entity activities.
///
/// Every task (a source or an entity activity) is resumed strictly in
/// calendar order:
///
/// 1. Pop the earliest `(time, task)` from the [`Calendar`] and advance the
///    clock.
/// 2. Resume the task with an [`EntityCtx`] borrowing the run state.
/// 3. Interpret the returned [`Step`]:
///    - `Delay(d)`       → reschedule at `now + d`.
///    - `Acquire{..}`    → reschedule now if granted, else park until a
///                         release promotes the request.
///    - `Done`           → run the completion hook (dispose by default).
/// 4. Reschedule, at `now`, every parked task whose request was promoted.
///
/// Create via [`SimBuilder`][crate::SimBuilder].  One `Sim` is one run: its
/// [`RunStats`] start empty and are returned by [`into_parts`](Self::into_parts).
pub struct Sim {
    pub(crate) config:    SimConfig,
    pub(crate) clock:     SimClock,
    pub(crate) resources: Resources,
    pub(crate) stats:     RunStats,
    pub(crate) rng:       SimRng,
    pub(crate) calendar:  Calendar,
    /// Indexed by `TaskId`; `None` once the task has finished.
    pub(crate) tasks:     Vec<Option<Task>>,
    /// Tasks waiting for a grant, keyed by the request they wait on.
    pub(crate) parked:    HashMap<(ResourceId, RequestId), TaskId>,
    /// Sources not yet started.
    pub(crate) sources:   Vec<Source>,
    pub(crate) started:   bool,
}

impl Sim {
    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    #[inline]
    pub fn now(&self) -> SimTime {
        self.clock.now()
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    pub fn rng(&mut self) -> &mut SimRng {
        &mut self.rng
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Number of scheduled resumptions.  Parked tasks are not counted.
    pub fn pending(&self) -> usize {
        self.calendar.len()
    }

    /// Hand the run's statistics and resources back to the caller.
    pub fn into_parts(self) -> (RunStats, Resources) {
        (self.stats, self.resources)
    }

    // ── Run control ───────────────────────────────────────────────────────

    /// Begin the run: schedule every source at the current instant.
    ///
    /// A `Sim` can only be started once; build a new one for the next run.
    pub fn start<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        if self.started {
            return Err(SimError::AlreadyStarted);
        }
        self.started = true;
        let now = self.now();
        observer.on_run_start(now);
        info!(seed = self.config.seed, sources = self.sources.len(), time = now.0, "run started");

        for source in std::mem::take(&mut self.sources) {
            let task = self.add_task(Task::Source(SourceTask { source, pending: None }))?;
            self.calendar.push(now, task);
        }
        Ok(())
    }

    /// Launch `activity` for `entity` now; the entity is disposed when the
    /// activity finishes.
    pub fn spawn(&mut self, entity: Entity, activity: impl Activity + 'static) -> SimResult<EntityId> {
        self.spawn_with_hook(entity, activity, dispose_on_completion())
    }

    /// Launch `activity` for `entity` now with a custom completion hook.
    ///
    /// The entity's creation time is set to the current instant.
    pub fn spawn_with_hook(
        &mut self,
        mut entity:  Entity,
        activity:    impl Activity + 'static,
        on_complete: CompletionHook,
    ) -> SimResult<EntityId> {
        entity.set_creation_time(self.now());
        let id = self.stats.register_entity(entity)?;
        self.launch(id, Box::new(activity), Some(on_complete))?;
        Ok(id)
    }

    /// Resume the next scheduled task.  Returns `false` if nothing is
    /// scheduled.
    pub fn step<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<bool> {
        let Some((at, task)) = self.calendar.pop() else {
            return Ok(false);
        };
        self.clock.advance_to(at)?;
        observer.on_step(at, task);
        trace!(time = at.0, task = task.0, "resume");

        match self.tasks.get_mut(task.index()).and_then(Option::take) {
            Some(Task::Entity(t)) => self.resume_entity(task, t, observer)?,
            Some(Task::Source(s)) => self.resume_source(task, s, observer)?,
            None => {}
        }
        Ok(true)
    }

    /// Run until the calendar drains, or until `config.until` if set.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        let until = self.config.until;
        self.run_to(until, observer)
    }

    /// Run every resumption scheduled at or before `t`, then move the clock
    /// to `t`.
    pub fn run_until<O: SimObserver>(&mut self, t: f64, observer: &mut O) -> SimResult<()> {
        self.run_to(Some(SimTime(t)), observer)
    }

    fn run_to<O: SimObserver>(&mut self, until: Option<SimTime>, observer: &mut O) -> SimResult<()> {
        if !self.started {
            self.start(observer)?;
        }
        while let Some(next) = self.calendar.next_time() {
            if until.is_some_and(|t| next > t) {
                break;
            }
            self.step(observer)?;
        }
        if let Some(t) = until {
            if t > self.now() {
                self.clock.advance_to(t)?;
            }
        }
        let now = self.now();
        info!(
            time = now.0,
            entities = self.stats.entity_count(),
            disposed = self.stats.get_entities().len(),
            "run finished"
        );
        observer.on_run_end(now, &self.stats);
        Ok(())
    }

    // ── Series over the current run ───────────────────────────────────────

    pub fn queue_size_over_time(&self, resource: &str, sample_frequency: f64) -> SimResult<Vec<usize>> {
        Ok(self
            .stats
            .queue_size_over_time(&self.resources, resource, sample_frequency, self.now())?)
    }

    pub fn number_being_processed_over_time(
        &self,
        resource:         &str,
        sample_frequency: f64,
    ) -> SimResult<Vec<usize>> {
        Ok(self.stats.number_being_processed_over_time(
            &self.resources,
            resource,
            sample_frequency,
            self.now(),
        )?)
    }

    pub fn utilization_over_time(&self, resource: &str, sample_frequency: f64) -> SimResult<Vec<f64>> {
        Ok(self
            .stats
            .utilization_over_time(&self.resources, resource, sample_frequency, self.now())?)
    }

    // ── Task handling ─────────────────────────────────────────────────────

    fn add_task(&mut self, task: Task) -> SimResult<TaskId> {
        let id = TaskId::try_from(self.tasks.len())
            .map_err(|_| QsError::config("too many concurrent tasks"))?;
        self.tasks.push(Some(task));
        Ok(id)
    }

    fn launch(
        &mut self,
        entity:      EntityId,
        activity:    Box<dyn Activity>,
        on_complete: Option<CompletionHook>,
    ) -> SimResult<TaskId> {
        let now = self.now();
        let task = self.add_task(Task::Entity(EntityTask { entity, activity, on_complete }))?;
        self.calendar.push(now, task);
        debug!(entity = entity.0, task = task.0, time = now.0, "activity launched");
        Ok(task)
    }

    fn resume_source<O: SimObserver>(
        &mut self,
        id:       TaskId,
        mut task: SourceTask,
        observer: &mut O,
    ) -> SimResult<()> {
        let now = self.now();
        if let Some(arrival) = task.pending.take() {
            self.launch(arrival.entity, arrival.activity, Some(dispose_on_completion()))?;
            if let Some(entity) = self.stats.entity(arrival.entity) {
                observer.on_entity_created(arrival.entity, entity);
            }
        }
        match task.source.next_entity(now, &mut self.stats)? {
            Some(next) => {
                self.calendar.push(now + next.delay, id);
                task.pending = Some(next);
                self.tasks[id.index()] = Some(Task::Source(task));
            }
            None => {
                debug!(source = task.source.kind(), generated = task.source.count(), "source exhausted");
            }
        }
        Ok(())
    }

    fn resume_entity<O: SimObserver>(
        &mut self,
        id:       TaskId,
        mut task: EntityTask,
        observer: &mut O,
    ) -> SimResult<()> {
        let now = self.now();
        let mut promoted = Vec::new();
        let step = {
            let mut ctx = EntityCtx::new(
                now,
                task.entity,
                &mut self.stats,
                &mut self.resources,
                &mut self.rng,
                &mut promoted,
            );
            task.activity.resume(&mut ctx)?
        };

        match step {
            Step::Delay(d) => {
                if !d.is_finite() || d < 0.0 {
                    return Err(SimError::InvalidDelay(d));
                }
                self.calendar.push(now + d, id);
                self.tasks[id.index()] = Some(Task::Entity(task));
            }
            Step::Acquire { resource, request } => {
                let tracker = self
                    .resources
                    .get(resource)
                    .ok_or(SimError::UnknownResource(resource))?;
                if tracker.is_granted(request) {
                    self.calendar.push(now, id);
                } else {
                    self.parked.insert((resource, request), id);
                }
                self.tasks[id.index()] = Some(Task::Entity(task));
            }
            Step::Done => {
                if let Some(hook) = task.on_complete.take() {
                    hook(&mut self.stats, task.entity, now)?;
                }
                if let Some(entity) = self.stats.entity(task.entity) {
                    if entity.is_disposed() {
                        observer.on_entity_disposed(task.entity, entity);
                    }
                }
            }
        }

        for key in promoted {
            if let Some(waiter) = self.parked.remove(&key) {
                self.calendar.push(now, waiter);
            }
        }
        Ok(())
    }
}
