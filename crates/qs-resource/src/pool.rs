//! `ResourcePool<E>` — owns the model's trackers and hands out `ResourceId`s.

use std::collections::HashMap;

use qs_core::{QsError, QsResult, ResourceId};

use crate::ResourceTracker;

/// Arena of [`ResourceTracker`]s indexed by [`ResourceId`].
///
/// Resource names are unique within a pool: stats queries and the run
/// registry address resources by name.
pub struct ResourcePool<E> {
    trackers: Vec<ResourceTracker<E>>,
    by_name:  HashMap<String, ResourceId>,
}

impl<E> Default for ResourcePool<E> {
    fn default() -> Self {
        Self { trackers: Vec::new(), by_name: HashMap::new() }
    }
}

impl<E> ResourcePool<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `tracker` and return its id.
    ///
    /// Fails with `QsError::Config` if a tracker with the same name exists.
    pub fn add(&mut self, tracker: ResourceTracker<E>) -> QsResult<ResourceId> {
        if self.by_name.contains_key(tracker.name()) {
            return Err(QsError::config(format!(
                "duplicate resource name {}",
                tracker.name()
            )));
        }
        let id = ResourceId::try_from(self.trackers.len())
            .map_err(|_| QsError::config("too many resources"))?;
        self.by_name.insert(tracker.name().to_owned(), id);
        self.trackers.push(tracker);
        Ok(id)
    }

    pub fn get(&self, id: ResourceId) -> Option<&ResourceTracker<E>> {
        self.trackers.get(id.index())
    }

    pub fn get_mut(&mut self, id: ResourceId) -> Option<&mut ResourceTracker<E>> {
        self.trackers.get_mut(id.index())
    }

    /// Look up a tracker id by resource name.
    pub fn id_of(&self, name: &str) -> Option<ResourceId> {
        self.by_name.get(name).copied()
    }

    pub fn by_name(&self, name: &str) -> Option<&ResourceTracker<E>> {
        self.id_of(name).and_then(|id| self.get(id))
    }

    pub fn len(&self) -> usize {
        self.trackers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trackers.is_empty()
    }

    /// Iterator over `(id, tracker)` in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (ResourceId, &ResourceTracker<E>)> {
        self.trackers
            .iter()
            .enumerate()
            .map(|(i, t)| (ResourceId(i as u32), t))
    }
}
