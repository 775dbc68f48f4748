//! `ResourceTracker<E>` — a priority resource that logs its own contention.
//!
//! The tracker decorates a [`PriorityResource`] rather than extending it: every
//! request and release is forwarded to the wrapped resource and followed by a
//! snapshot `(time, queue_len, occupancy, kind)` appended to the event log.
//! Service start snapshots are logged explicitly by the entity through
//! [`add_resource_check`](ResourceTracker::add_resource_check).
//!
//! `E` is the entity type handed to entity-aware service-time callbacks.  It
//! is generic so this crate does not depend on `qs-entity`.

use std::fmt;

use qs_core::{ModelError, QsError, QsResult, RequestId, SampleFrequency, SimTime};
use tracing::trace;

use crate::series::{resample, round2, SeriesKind};
use crate::{EventKind, PriorityQueue, PriorityResource, ResourceEvent};

// ── ServiceTime ───────────────────────────────────────────────────────────────

type EntityHook<E> = Box<dyn FnMut(&E) -> Result<f64, ModelError>>;
type FixedHook = Box<dyn FnMut() -> Result<f64, ModelError>>;

/// The model author's service-time hook.
///
/// The variant states up front whether the hook wants to see the entity being
/// served, so the tracker never has to guess.
pub enum ServiceTime<E> {
    /// Called with the entity that just started service.
    PerEntity(EntityHook<E>),
    /// Called with no argument.
    Fixed(FixedHook),
}

impl<E> ServiceTime<E> {
    /// Every service takes exactly `duration`.
    pub fn constant(duration: f64) -> Self {
        ServiceTime::Fixed(Box::new(move || Ok(duration)))
    }

    pub fn fixed(mut f: impl FnMut() -> f64 + 'static) -> Self {
        ServiceTime::Fixed(Box::new(move || Ok(f())))
    }

    pub fn per_entity(mut f: impl FnMut(&E) -> f64 + 'static) -> Self {
        ServiceTime::PerEntity(Box::new(move |e| Ok(f(e))))
    }

    pub fn try_fixed(f: impl FnMut() -> Result<f64, ModelError> + 'static) -> Self {
        ServiceTime::Fixed(Box::new(f))
    }

    pub fn try_per_entity(f: impl FnMut(&E) -> Result<f64, ModelError> + 'static) -> Self {
        ServiceTime::PerEntity(Box::new(f))
    }

    pub fn is_entity_aware(&self) -> bool {
        matches!(self, ServiceTime::PerEntity(_))
    }

    fn call(&mut self, entity: &E) -> Result<f64, ModelError> {
        match self {
            ServiceTime::PerEntity(f) => f(entity),
            ServiceTime::Fixed(f) => f(),
        }
    }
}

impl<E> fmt::Debug for ServiceTime<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceTime::PerEntity(_) => f.write_str("ServiceTime::PerEntity(..)"),
            ServiceTime::Fixed(_) => f.write_str("ServiceTime::Fixed(..)"),
        }
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

/// Fluent builder for [`ResourceTracker`].
///
/// | Method              | Default                          |
/// |---------------------|----------------------------------|
/// | `.service_time(st)` | *required*                       |
/// | `.resource(r)`      | `PriorityQueue::new(capacity)`   |
pub struct ResourceTrackerBuilder<E> {
    name:         String,
    capacity:     usize,
    service_time: Option<ServiceTime<E>>,
    resource:     Option<Box<dyn PriorityResource>>,
}

impl<E> ResourceTrackerBuilder<E> {
    pub fn service_time(mut self, service_time: ServiceTime<E>) -> Self {
        self.service_time = Some(service_time);
        self
    }

    /// Replace the default grant queue.  Its own capacity wins over the
    /// capacity given to [`ResourceTracker::builder`].
    pub fn resource(mut self, resource: impl PriorityResource + 'static) -> Self {
        self.resource = Some(Box::new(resource));
        self
    }

    pub fn build(self) -> QsResult<ResourceTracker<E>> {
        if self.name.is_empty() {
            return Err(QsError::config("resource name must not be empty"));
        }
        let Some(service_time) = self.service_time else {
            return Err(QsError::config(format!(
                "resource {} has no service_time hook",
                self.name
            )));
        };
        let resource = self
            .resource
            .unwrap_or_else(|| Box::new(PriorityQueue::new(self.capacity)));
        if resource.capacity() == 0 {
            return Err(QsError::config(format!(
                "resource {} must have a capacity of at least 1",
                self.name
            )));
        }
        Ok(ResourceTracker {
            name: self.name,
            resource,
            service_time,
            events: Vec::new(),
        })
    }
}

// ── ResourceTracker ───────────────────────────────────────────────────────────

/// A capacity-bounded priority resource plus its raw chronological event log.
///
/// Owned by the model author (through a `ResourcePool`); entities refer to it
/// by `ResourceId`.
pub struct ResourceTracker<E> {
    name:         String,
    resource:     Box<dyn PriorityResource>,
    service_time: ServiceTime<E>,
    events:       Vec<ResourceEvent>,
}

impl<E> ResourceTracker<E> {
    pub fn builder(name: impl Into<String>, capacity: usize) -> ResourceTrackerBuilder<E> {
        ResourceTrackerBuilder {
            name: name.into(),
            capacity,
            service_time: None,
            resource: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> usize {
        self.resource.capacity()
    }

    /// Grants currently held.
    pub fn count(&self) -> usize {
        self.resource.count()
    }

    /// Requests waiting for a grant.
    pub fn queue_len(&self) -> usize {
        self.resource.queue_len()
    }

    pub fn is_granted(&self, request: RequestId) -> bool {
        self.resource.is_granted(request)
    }

    /// The raw event log, oldest first.
    pub fn events(&self) -> &[ResourceEvent] {
        &self.events
    }

    pub fn service_time_hook(&self) -> &ServiceTime<E> {
        &self.service_time
    }

    // ── Forwarded operations ──────────────────────────────────────────────

    /// Ask for a grant at `priority` and log a `Request` snapshot.
    pub fn request(&mut self, now: SimTime, priority: i64) -> RequestId {
        let (id, granted) = self.resource.request(priority);
        trace!(resource = %self.name, request = id.0, priority, granted, time = now.0, "request");
        self.add_resource_check(now, EventKind::Request);
        id
    }

    /// Give a grant back (or withdraw a waiting request) and log a `Release`
    /// snapshot.
    ///
    /// Waiters promoted by the release are returned so the scheduler can
    /// resume them; the snapshot is taken after promotion.
    pub fn release(&mut self, now: SimTime, request: RequestId) -> Vec<RequestId> {
        let promoted = self.resource.release(request);
        trace!(resource = %self.name, request = request.0, promoted = promoted.len(), time = now.0, "release");
        self.add_resource_check(now, EventKind::Release);
        promoted
    }

    /// Log a snapshot of the current queue length and occupancy.
    pub fn add_resource_check(&mut self, now: SimTime, kind: EventKind) {
        self.events.push(ResourceEvent {
            time:      now,
            queue_len: self.resource.queue_len(),
            occupancy: self.resource.count(),
            kind,
        });
    }

    /// Evaluate the service-time hook for `entity`.
    ///
    /// Any hook failure, and any negative or non-finite duration, is reported
    /// as `QsError::ModelCallback`.
    pub fn service_time_for(&mut self, entity: &E) -> QsResult<f64> {
        let hook = || format!("{} service_time", self.name);
        let duration = self
            .service_time
            .call(entity)
            .map_err(|e| QsError::model_callback(hook(), e))?;
        if !duration.is_finite() || duration < 0.0 {
            return Err(QsError::model_callback(
                hook(),
                format!("service time must be a finite non-negative number, got {duration}"),
            ));
        }
        Ok(duration)
    }

    // ── Resampled series ──────────────────────────────────────────────────

    /// Resample one signal of the event log onto the grid of
    /// `sample_frequency` over `[0, now)`.
    ///
    /// `sample_frequency` must be one of `0.01`, `0.1`, `1`.
    pub fn series_over_time(
        &self,
        kind:             SeriesKind,
        sample_frequency: f64,
        now:              SimTime,
    ) -> QsResult<Vec<f64>> {
        let freq = SampleFrequency::try_from(sample_frequency)?;
        let capacity = self.capacity() as f64;
        let points = self.events.iter().map(|e| {
            let v = match kind {
                SeriesKind::QueueSize => e.queue_len as f64,
                SeriesKind::Occupancy => e.occupancy as f64,
                SeriesKind::Utilization => round2(e.occupancy as f64 / capacity),
            };
            (e.time, v)
        });
        Ok(resample(points, freq, now))
    }

    pub fn queue_size_over_time(&self, sample_frequency: f64, now: SimTime) -> QsResult<Vec<usize>> {
        let freq = SampleFrequency::try_from(sample_frequency)?;
        Ok(resample(self.events.iter().map(|e| (e.time, e.queue_len)), freq, now))
    }

    pub fn number_being_processed_over_time(
        &self,
        sample_frequency: f64,
        now:              SimTime,
    ) -> QsResult<Vec<usize>> {
        let freq = SampleFrequency::try_from(sample_frequency)?;
        Ok(resample(self.events.iter().map(|e| (e.time, e.occupancy)), freq, now))
    }

    pub fn utilization_over_time(&self, sample_frequency: f64, now: SimTime) -> QsResult<Vec<f64>> {
        self.series_over_time(SeriesKind::Utilization, sample_frequency, now)
    }
}

impl<E> fmt::Debug for ResourceTracker<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceTracker")
            .field("name", &self.name)
            .field("capacity", &self.capacity())
            .field("count", &self.count())
            .field("queue_len", &self.queue_len())
            .field("events", &self.events.len())
            .field("service_time", &self.service_time)
            .finish()
    }
}
