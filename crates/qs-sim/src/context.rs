//! Mutable view of the simulation handed to an activity while it runs.

use qs_core::{AttrValue, EntityId, RequestId, ResourceId, SimRng, SimTime};
use qs_entity::{Entity, Resource, Resources};
use qs_stats::RunStats;

use crate::{SimError, SimResult, Step};

/// Everything one activity may touch during a single `resume`.
///
/// Built by the scheduler for each resumption and dropped before the next
/// one, so no two activities ever hold it at the same time.
pub struct EntityCtx<'a> {
    now:       SimTime,
    entity:    EntityId,
    stats:     &'a mut RunStats,
    resources: &'a mut Resources,
    rng:       &'a mut SimRng,
    /// Requests granted by releases made during this resumption.
    promoted:  &'a mut Vec<(ResourceId, RequestId)>,
}

impl<'a> EntityCtx<'a> {
    pub(crate) fn new(
        now:       SimTime,
        entity:    EntityId,
        stats:     &'a mut RunStats,
        resources: &'a mut Resources,
        rng:       &'a mut SimRng,
        promoted:  &'a mut Vec<(ResourceId, RequestId)>,
    ) -> Self {
        Self { now, entity, stats, resources, rng, promoted }
    }

    #[inline]
    pub fn now(&self) -> SimTime {
        self.now
    }

    pub fn entity_id(&self) -> EntityId {
        self.entity
    }

    pub fn entity(&self) -> SimResult<&Entity> {
        self.stats.entity(self.entity).ok_or(SimError::UnknownEntity(self.entity))
    }

    pub fn set_attribute(&mut self, key: &str, value: impl Into<AttrValue>) -> SimResult<()> {
        self.entity_mut()?.set_attribute(key, value);
        Ok(())
    }

    /// Look up a resource id by name.
    pub fn resource(&self, name: &str) -> Option<ResourceId> {
        self.resources.id_of(name)
    }

    pub fn rng(&mut self) -> &mut SimRng {
        &mut *self.rng
    }

    /// Elapse `d` units of simulated time.
    pub fn timeout(&self, d: f64) -> Step {
        Step::Delay(d)
    }

    /// Queue at `resource`.  Return the resulting step from `resume` so the
    /// scheduler can suspend the activity until the grant.
    pub fn wait_for_resource(
        &mut self,
        resource:          ResourceId,
        priority_override: Option<i64>,
    ) -> SimResult<Step> {
        let now = self.now;
        let (entity, tracker) = self.split(resource)?;
        let request = entity.wait_for_resource(now, tracker, priority_override)?;
        let name = tracker.name().to_owned();
        self.stats.register_resource(&name, resource);
        Ok(Step::Acquire { resource, request })
    }

    /// Start service at `resource`; the returned step elapses the service
    /// time.
    pub fn process_at_resource(&mut self, resource: ResourceId) -> SimResult<Step> {
        let now = self.now;
        let (entity, tracker) = self.split(resource)?;
        let duration = entity.process_at_resource(now, tracker)?;
        Ok(Step::Delay(duration))
    }

    /// Give the grant at `resource` back.  Waiters it promotes are resumed
    /// by the scheduler after this resumption returns.
    pub fn release_resource(&mut self, resource: ResourceId) -> SimResult<()> {
        let now = self.now;
        let (entity, tracker) = self.split(resource)?;
        let promoted = entity.release_resource(now, tracker)?;
        self.promoted.extend(promoted.into_iter().map(|r| (resource, r)));
        Ok(())
    }

    fn entity_mut(&mut self) -> SimResult<&mut Entity> {
        self.stats.entity_mut(self.entity).ok_or(SimError::UnknownEntity(self.entity))
    }

    fn split(&mut self, resource: ResourceId) -> SimResult<(&mut Entity, &mut Resource)> {
        let tracker = self
            .resources
            .get_mut(resource)
            .ok_or(SimError::UnknownResource(resource))?;
        let entity = self
            .stats
            .entity_mut(self.entity)
            .ok_or(SimError::UnknownEntity(self.entity))?;
        Ok((entity, tracker))
    }
}
