//! `Source` — generates entities on an interarrival schedule.
//!
//! # Arrival chain
//!
//! ```text
//! delays   = first_delay?, d1, d2, …        (first_delay replaces d0)
//! arrival₀ = start + delays[0]
//! arrivalₖ = arrivalₖ₋₁ + delays[k]         (delays are relative gaps)
//! ```
//!
//! Each emitted entity is named `"<kind> <ordinal>"` (ordinals start at 1),
//! tagged with a `type` attribute equal to `kind`, given
//! `creation_time = now + delay`, and registered with the run's statistics
//! as soon as it is generated.

use std::fmt;

use qs_core::{EntityId, ModelError, QsError, SimRng, SimTime, TYPE_KEY};
use qs_entity::Entity;
use qs_stats::RunStats;
use tracing::debug;

use crate::{Activity, SimError, SimResult};

type Interarrival = Box<dyn Iterator<Item = Result<f64, ModelError>>>;
type EntityBuilder = Box<dyn FnMut() -> NewEntity>;

/// An entity together with the activity it will run once it arrives.
pub struct NewEntity {
    pub entity:   Entity,
    pub activity: Box<dyn Activity>,
}

impl NewEntity {
    pub fn new(entity: Entity, activity: impl Activity + 'static) -> Self {
        Self { entity, activity: Box::new(activity) }
    }
}

/// An entity generated by [`Source::next_entity`], waiting for its arrival.
pub struct Arrival {
    /// Gap from the previous arrival (or from the source's start).
    pub delay:    f64,
    pub entity:   EntityId,
    pub activity: Box<dyn Activity>,
}

// ── Builder ───────────────────────────────────────────────────────────────────

/// Fluent builder for [`Source`].
///
/// | Method                     | Default      |
/// |----------------------------|--------------|
/// | `.interarrival(iter)` / `.interarrival_fn(f)` / `.exponential(mean, rng)` | *required* |
/// | `.entities(f)`             | *required*   |
/// | `.first_delay(d)`          | none         |
/// | `.max_entities(n)`         | unbounded    |
pub struct SourceBuilder {
    kind:         String,
    interarrival: Option<Interarrival>,
    builder:      Option<EntityBuilder>,
    first_delay:  Option<f64>,
    max_entities: Option<u64>,
}

impl SourceBuilder {
    /// A pre-built sequence of gaps.  The source stops when it runs out.
    pub fn interarrival<I>(mut self, gaps: I) -> Self
    where
        I: IntoIterator<Item = f64>,
        I::IntoIter: 'static,
    {
        self.interarrival = Some(Box::new(gaps.into_iter().map(Ok)));
        self
    }

    /// Draw each gap from `f`.
    pub fn interarrival_fn(mut self, mut f: impl FnMut() -> f64 + 'static) -> Self {
        self.interarrival = Some(Box::new(std::iter::repeat_with(move || Ok(f()))));
        self
    }

    /// Draw each gap from a fallible `f`; an error stops the run as a
    /// `ModelCallback` error.
    pub fn try_interarrival_fn(
        mut self,
        f: impl FnMut() -> Result<f64, ModelError> + 'static,
    ) -> Self {
        self.interarrival = Some(Box::new(std::iter::repeat_with(f)));
        self
    }

    /// Exponentially distributed gaps (a Poisson arrival process).
    pub fn exponential(self, mean: f64, mut rng: SimRng) -> Self {
        self.interarrival_fn(move || rng.exponential(mean))
    }

    /// Entity factory, called once per arrival.
    pub fn entities(mut self, f: impl FnMut() -> NewEntity + 'static) -> Self {
        self.builder = Some(Box::new(f));
        self
    }

    /// Use `d` instead of the first generated gap.
    pub fn first_delay(mut self, d: f64) -> Self {
        self.first_delay = Some(d);
        self
    }

    pub fn max_entities(mut self, n: u64) -> Self {
        self.max_entities = Some(n);
        self
    }

    pub fn build(self) -> SimResult<Source> {
        let Some(interarrival) = self.interarrival else {
            return Err(QsError::config(format!("source {} has no interarrival times", self.kind)).into());
        };
        let Some(builder) = self.builder else {
            return Err(QsError::config(format!("source {} has no entity builder", self.kind)).into());
        };
        if let Some(d) = self.first_delay {
            if !d.is_finite() || d < 0.0 {
                return Err(SimError::InvalidDelay(d));
            }
        }
        Ok(Source {
            kind: self.kind,
            interarrival,
            builder,
            first_delay: self.first_delay,
            max_entities: self.max_entities,
            count: 0,
        })
    }
}

// ── Source ────────────────────────────────────────────────────────────────────

/// Generates entities of one kind until its interarrival times or its
/// entity budget run out.
pub struct Source {
    kind:         String,
    interarrival: Interarrival,
    builder:      EntityBuilder,
    first_delay:  Option<f64>,
    max_entities: Option<u64>,
    count:        u64,
}

impl Source {
    pub fn builder(kind: impl Into<String>) -> SourceBuilder {
        SourceBuilder {
            kind:         kind.into(),
            interarrival: None,
            builder:      None,
            first_delay:  None,
            max_entities: None,
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Entities generated so far.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Generate the next entity, registering it with `stats`.
    ///
    /// Returns `None` once the entity budget is spent or the interarrival
    /// sequence is exhausted; the source is not restartable.
    pub fn next_entity(&mut self, now: SimTime, stats: &mut RunStats) -> SimResult<Option<Arrival>> {
        if self.max_entities.is_some_and(|max| self.count >= max) {
            return Ok(None);
        }
        let Some(gap) = self.interarrival.next() else {
            return Ok(None);
        };
        self.count += 1;

        let hook = || format!("{} interarrival", self.kind);
        let gap = gap.map_err(|e| QsError::model_callback(hook(), e))?;
        let delay = match (self.count, self.first_delay) {
            (1, Some(first)) => first,
            _ => gap,
        };
        if !delay.is_finite() || delay < 0.0 {
            return Err(QsError::model_callback(
                hook(),
                format!("interarrival time must be a finite non-negative number, got {delay}"),
            )
            .into());
        }

        let NewEntity { mut entity, activity } = (self.builder)();
        entity.set_creation_time(now + delay);
        entity.set_name(format!("{} {}", self.kind, self.count));
        entity.set_attribute(TYPE_KEY, self.kind.as_str());
        debug!(entity = %entity.name(), delay, "entity generated");
        let entity = stats.register_entity(entity)?;

        Ok(Some(Arrival { delay, entity, activity }))
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Source")
            .field("kind", &self.kind)
            .field("first_delay", &self.first_delay)
            .field("max_entities", &self.max_entities)
            .field("count", &self.count)
            .finish()
    }
}
