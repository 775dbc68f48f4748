//! `RunStats` — every entity and resource touched during one run.

use std::collections::BTreeMap;

use qs_core::{Attributes, EntityId, QsError, QsResult, ResourceId, SimTime};
use qs_entity::{Entity, Resource, Resources};
use tracing::debug;

use crate::summary::{mean, RunSummary};

/// Which per-entity figure a query reports.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Figure {
    Total,
    Waiting,
    Processing,
}

/// Run-scoped registry of entities and visited resources.
///
/// Owns the entities it registers: activities reach their entity through
/// [`entity_mut`](Self::entity_mut) by `EntityId`.  Resources stay in the
/// model's `ResourcePool`; only their names and ids are recorded here.
#[derive(Debug, Default)]
pub struct RunStats {
    entities:  Vec<Entity>,
    resources: BTreeMap<String, ResourceId>,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Registration ──────────────────────────────────────────────────────

    pub fn register_entity(&mut self, entity: Entity) -> QsResult<EntityId> {
        let id = EntityId::try_from(self.entities.len())
            .map_err(|_| QsError::config("too many entities"))?;
        self.entities.push(entity);
        Ok(id)
    }

    /// Record that `name` was visited.  Registering a name twice keeps the
    /// first id.
    pub fn register_resource(&mut self, name: &str, id: ResourceId) {
        if !self.resources.contains_key(name) {
            debug!(resource = name, "resource registered");
            self.resources.insert(name.to_owned(), id);
        }
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.index())
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id.index())
    }

    /// Every registered entity, active or disposed, in registration order.
    pub fn all_entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Names of the resources visited so far.
    pub fn resource_names(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    pub fn is_registered(&self, resource: &str) -> bool {
        self.resources.contains_key(resource)
    }

    /// Id of a visited resource; `UnknownResource` if it was never visited
    /// during this run.
    pub fn resource_id(&self, name: &str) -> QsResult<ResourceId> {
        self.resources
            .get(name)
            .copied()
            .ok_or_else(|| QsError::UnknownResource(name.to_owned()))
    }

    // ── Entity queries ────────────────────────────────────────────────────

    /// All disposed entities.
    pub fn get_entities(&self) -> Vec<&Entity> {
        self.entities.iter().filter(|e| e.is_disposed()).collect()
    }

    /// Disposed entities matching `filter`, narrowed to those that visited
    /// `resource` when one is given.
    pub fn filtered(
        &self,
        resource: Option<&str>,
        filter:   Option<&Attributes>,
    ) -> QsResult<Vec<&Entity>> {
        if let Some(name) = resource {
            self.resource_id(name)?;
        }
        Ok(self
            .entities
            .iter()
            .filter(|e| e.is_disposed())
            .filter(|e| filter.is_none_or(|f| e.matches_attributes(f)))
            .filter(|e| resource.is_none_or(|r| e.did_visit_resource(r)))
            .collect())
    }

    fn figures(
        &self,
        figure:   Figure,
        resource: Option<&str>,
        filter:   Option<&Attributes>,
    ) -> QsResult<Vec<f64>> {
        self.filtered(resource, filter)?
            .into_iter()
            .map(|e| match (figure, resource) {
                (Figure::Total, _) => e.total_time(),
                (Figure::Waiting, None) => e.total_waiting_time(),
                (Figure::Processing, None) => e.total_processing_time(),
                (Figure::Waiting, Some(r)) => Ok(e.waiting_time_for(r)?.unwrap_or_default()),
                (Figure::Processing, Some(r)) => Ok(e.processing_time_for(r)?.unwrap_or_default()),
            })
            .collect()
    }

    /// `disposal - creation` for each selected entity.
    ///
    /// With `resource`, only entities that visited it are reported.
    pub fn get_total_times(
        &self,
        resource: Option<&str>,
        filter:   Option<&Attributes>,
    ) -> QsResult<Vec<f64>> {
        self.figures(Figure::Total, resource, filter)
    }

    /// Total waiting time, or waiting time at `resource`, per selected entity.
    pub fn get_waiting_times(
        &self,
        resource: Option<&str>,
        filter:   Option<&Attributes>,
    ) -> QsResult<Vec<f64>> {
        self.figures(Figure::Waiting, resource, filter)
    }

    /// Total processing time, or processing time at `resource`, per selected
    /// entity.
    pub fn get_processing_times(
        &self,
        resource: Option<&str>,
        filter:   Option<&Attributes>,
    ) -> QsResult<Vec<f64>> {
        self.figures(Figure::Processing, resource, filter)
    }

    /// Mean total, waiting and processing time over disposed entities
    /// matching `filter`.
    pub fn summary(&self, filter: Option<&Attributes>) -> QsResult<RunSummary> {
        let total = self.get_total_times(None, filter)?;
        let waiting = self.get_waiting_times(None, filter)?;
        let processing = self.get_processing_times(None, filter)?;
        Ok(RunSummary {
            entities:        total.len(),
            mean_total:      mean(&total),
            mean_waiting:    mean(&waiting),
            mean_processing: mean(&processing),
        })
    }

    // ── Resource series ───────────────────────────────────────────────────

    fn tracker<'a>(&self, resources: &'a Resources, name: &str) -> QsResult<&'a Resource> {
        let id = self.resource_id(name)?;
        resources
            .get(id)
            .ok_or_else(|| QsError::UnknownResource(name.to_owned()))
    }

    pub fn queue_size_over_time(
        &self,
        resources:        &Resources,
        resource:         &str,
        sample_frequency: f64,
        now:              SimTime,
    ) -> QsResult<Vec<usize>> {
        self.tracker(resources, resource)?
            .queue_size_over_time(sample_frequency, now)
    }

    pub fn number_being_processed_over_time(
        &self,
        resources:        &Resources,
        resource:         &str,
        sample_frequency: f64,
        now:              SimTime,
    ) -> QsResult<Vec<usize>> {
        self.tracker(resources, resource)?
            .number_being_processed_over_time(sample_frequency, now)
    }

    pub fn utilization_over_time(
        &self,
        resources:        &Resources,
        resource:         &str,
        sample_frequency: f64,
        now:              SimTime,
    ) -> QsResult<Vec<f64>> {
        self.tracker(resources, resource)?
            .utilization_over_time(sample_frequency, now)
    }
}
