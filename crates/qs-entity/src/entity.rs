//! `Entity` — a unit of work flowing through resources.

use std::cell::OnceCell;
use std::collections::BTreeMap;
use std::fmt;

use qs_core::{
    AttrValue, Attributes, QsError, QsResult, RequestId, SimTime, DEFAULT_PRIORITY, PRIORITY_KEY,
};
use qs_resource::EventKind;
use tracing::debug;

use crate::{Resource, VisitRecord};

/// Lifecycle of an [`Entity`].  `Disposed` is terminal.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EntityState {
    Active,
    Disposed,
}

/// Aggregated durations of a disposed entity, computed once.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Timing {
    pub total:      f64,
    pub waiting:    f64,
    pub processing: f64,
    /// `(waiting, processing)` per visited resource.
    pub per_resource: BTreeMap<String, (f64, f64)>,
}

/// A simulated unit of work.
///
/// Created by a `Source` (or directly by a model), mutated only from its own
/// activity, and registered with the run's statistics.  Resources refer to
/// entities only through the service-time hook, which borrows the entity for
/// the duration of the call.
#[derive(Clone, Debug)]
pub struct Entity {
    kind:          String,
    name:          String,
    creation_time: SimTime,
    disposal_time: Option<SimTime>,
    attributes:    Attributes,
    /// Visit records in first-visit order.
    visits:        Vec<VisitRecord>,
    timing:        OnceCell<Timing>,
}

impl Entity {
    /// A fresh, active entity of variant `kind` with only the default
    /// priority attribute.
    pub fn new(kind: impl Into<String>) -> Self {
        Self::with_attributes(kind, Attributes::new())
    }

    /// A fresh entity carrying `attributes`.  A `priority` attribute is added
    /// with the default value unless one is supplied.
    pub fn with_attributes(kind: impl Into<String>, mut attributes: Attributes) -> Self {
        if !attributes.contains_key(PRIORITY_KEY) {
            attributes.insert(PRIORITY_KEY, DEFAULT_PRIORITY);
        }
        let kind = kind.into();
        Self {
            name: kind.clone(),
            kind,
            creation_time: SimTime::ZERO,
            disposal_time: None,
            attributes,
            visits: Vec::new(),
            timing: OnceCell::new(),
        }
    }

    // ── Identity and attributes ───────────────────────────────────────────

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn creation_time(&self) -> SimTime {
        self.creation_time
    }

    pub fn set_creation_time(&mut self, t: SimTime) {
        self.creation_time = t;
    }

    pub fn disposal_time(&self) -> Option<SimTime> {
        self.disposal_time
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) {
        self.attributes.insert(key, value);
    }

    /// Stored priority, or the default when absent or not an integer.
    pub fn priority(&self) -> i64 {
        self.attributes.priority().unwrap_or(DEFAULT_PRIORITY)
    }

    pub fn matches_attributes(&self, filter: &Attributes) -> bool {
        self.attributes.matches(filter)
    }

    pub fn state(&self) -> EntityState {
        if self.disposal_time.is_some() { EntityState::Disposed } else { EntityState::Active }
    }

    pub fn is_disposed(&self) -> bool {
        self.disposal_time.is_some()
    }

    // ── Visits ────────────────────────────────────────────────────────────

    pub fn did_visit_resource(&self, resource: &str) -> bool {
        self.visit(resource).is_some()
    }

    pub fn visit(&self, resource: &str) -> Option<&VisitRecord> {
        self.visits.iter().find(|v| v.resource == resource)
    }

    /// Names of visited resources, in first-visit order.
    pub fn visited_resources(&self) -> impl Iterator<Item = &str> {
        self.visits.iter().map(|v| v.resource.as_str())
    }

    fn visit_mut(&mut self, resource: &str) -> Option<&mut VisitRecord> {
        self.visits.iter_mut().find(|v| v.resource == resource)
    }

    fn ensure_active(&self, op: &str) -> QsResult<()> {
        if self.is_disposed() {
            return Err(QsError::invalid_state(format!(
                "{} cannot {op}: entity has been disposed",
                self.name
            )));
        }
        Ok(())
    }

    /// Join the queue of `tracker`.
    ///
    /// Appends `now` to the arrival times (creating the visit record on the
    /// first visit) and issues a request at `priority_override`, else the
    /// stored priority.  The returned handle is also kept on the visit record
    /// until [`release_resource`](Self::release_resource).
    pub fn wait_for_resource(
        &mut self,
        now:               SimTime,
        tracker:           &mut Resource,
        priority_override: Option<i64>,
    ) -> QsResult<RequestId> {
        self.ensure_active("wait for a resource")?;
        let priority = priority_override.unwrap_or_else(|| self.priority());
        let name = tracker.name().to_owned();

        if self.visit(&name).is_none() {
            self.visits.push(VisitRecord::new(name.clone()));
        }
        let Some(visit) = self.visit_mut(&name) else {
            return Err(QsError::invalid_state(format!("visit to {name} was not recorded")));
        };
        if let Some(held) = visit.request {
            return Err(QsError::invalid_state(format!(
                "already holds request {held} at {name}"
            )));
        }
        visit.arrival_time.push(now);
        let request = tracker.request(now, priority);
        visit.request = Some(request);

        debug!(entity = %self.name, resource = %name, priority, time = now.0, "waiting for resource");
        Ok(request)
    }

    /// Begin service at `tracker` once the held request is granted.
    ///
    /// Logs a `Start` snapshot and returns the service duration produced by
    /// the tracker's service-time hook.
    pub fn process_at_resource(&mut self, now: SimTime, tracker: &mut Resource) -> QsResult<f64> {
        self.ensure_active("be processed")?;
        let name = tracker.name().to_owned();
        let Some(visit) = self.visit_mut(&name) else {
            return Err(QsError::invalid_state(format!("never requested resource {name}")));
        };
        let Some(request) = visit.request else {
            return Err(QsError::invalid_state(format!("holds no request at {name}")));
        };
        if !tracker.is_granted(request) {
            return Err(QsError::invalid_state(format!(
                "request {request} at {name} has not been granted"
            )));
        }
        visit.start_service_time.push(now);
        tracker.add_resource_check(now, EventKind::Start);

        let duration = tracker.service_time_for(self)?;
        debug!(entity = %self.name, resource = %name, duration, time = now.0, "service started");
        Ok(duration)
    }

    /// Give back the grant held at `tracker`.
    ///
    /// Returns the waiters promoted by the release.  Releasing when no
    /// request is held does nothing.
    ///
    /// Releasing before service started withdraws the visit: its arrival
    /// time is dropped and no finish time is recorded, so the timestamp
    /// sequences stay aligned.
    pub fn release_resource(
        &mut self,
        now:     SimTime,
        tracker: &mut Resource,
    ) -> QsResult<Vec<RequestId>> {
        self.ensure_active("release a resource")?;
        let name = tracker.name().to_owned();
        let Some(visit) = self.visit_mut(&name) else {
            return Err(QsError::invalid_state(format!("never requested resource {name}")));
        };
        let Some(request) = visit.request.take() else {
            debug!(entity = %self.name, resource = %name, time = now.0, "already released");
            return Ok(Vec::new());
        };
        let started = visit.start_service_time.len() == visit.arrival_time.len();
        if started {
            visit.finish_service_time.push(now);
        } else {
            visit.arrival_time.pop();
        }
        let promoted = tracker.release(now, request);

        if started {
            debug!(entity = %self.name, resource = %name, time = now.0, "finished service");
        } else {
            debug!(entity = %self.name, resource = %name, time = now.0, "withdrew request");
        }
        Ok(promoted)
    }

    /// Mark the entity as finished.  Disposing twice is an error.
    pub fn dispose(&mut self, now: SimTime) -> QsResult<()> {
        if let Some(t) = self.disposal_time {
            return Err(QsError::invalid_state(format!(
                "{} was already disposed at {t}",
                self.name
            )));
        }
        self.disposal_time = Some(now);
        debug!(entity = %self.name, time = now.0, "disposed");
        Ok(())
    }

    // ── Timing ────────────────────────────────────────────────────────────

    /// Cached durations.  Fails with `InvalidState` while the entity is
    /// still active.
    pub fn timing(&self) -> QsResult<&Timing> {
        let Some(disposed) = self.disposal_time else {
            return Err(QsError::invalid_state(format!(
                "{} has not been disposed; timing is unavailable",
                self.name
            )));
        };
        Ok(self.timing.get_or_init(|| {
            let per_resource: BTreeMap<_, _> = self
                .visits
                .iter()
                .map(|v| (v.resource.clone(), (v.waiting_time(), v.processing_time())))
                .collect();
            Timing {
                total:      disposed.since(self.creation_time),
                waiting:    per_resource.values().map(|(w, _)| w).sum(),
                processing: per_resource.values().map(|(_, p)| p).sum(),
                per_resource,
            }
        }))
    }

    /// `disposal_time - creation_time`.
    pub fn total_time(&self) -> QsResult<f64> {
        Ok(self.timing()?.total)
    }

    pub fn total_waiting_time(&self) -> QsResult<f64> {
        Ok(self.timing()?.waiting)
    }

    pub fn total_processing_time(&self) -> QsResult<f64> {
        Ok(self.timing()?.processing)
    }

    /// Waiting time at one resource; `None` if it was never visited.
    pub fn waiting_time_for(&self, resource: &str) -> QsResult<Option<f64>> {
        Ok(self.timing()?.per_resource.get(resource).map(|(w, _)| *w))
    }

    pub fn processing_time_for(&self, resource: &str) -> QsResult<Option<f64>> {
        Ok(self.timing()?.per_resource.get(resource).map(|(_, p)| *p))
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} created_at: {} attributes: {}",
            self.name, self.creation_time, self.attributes
        )
    }
}
