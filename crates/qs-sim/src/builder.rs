//! Fluent builder for constructing a [`Sim`].

use qs_core::{QsError, SimClock, SimConfig, SimRng};
use qs_entity::Resources;
use qs_stats::RunStats;

use crate::{Calendar, Sim, SimResult, Source};

/// Fluent builder for [`Sim`].
///
/// # Required inputs
///
/// - [`SimConfig`] — seed and optional stop time
/// - [`Resources`] — every resource tracker the model uses
///
/// # Optional inputs
///
/// | Method        | Default      |
/// |---------------|--------------|
/// | `.source(s)`  | no sources   |
///
/// # Example
///
/// ```rust,ignore
/// let mut resources = Resources::new();
/// let teller = resources.add(Resource::builder("Teller", 1)
///     .service_time(ServiceTime::constant(3.0))
///     .build()?)?;
/// let mut sim = SimBuilder::new(SimConfig::new(42), resources)
///     .source(source)
///     .build()?;
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder {
    config:    SimConfig,
    resources: Resources,
    sources:   Vec<Source>,
}

impl SimBuilder {
    pub fn new(config: SimConfig, resources: Resources) -> Self {
        Self { config, resources, sources: Vec::new() }
    }

    /// Add an entity source.  Sources start generating when the run starts.
    pub fn source(mut self, source: Source) -> Self {
        self.sources.push(source);
        self
    }

    /// Validate inputs and return a ready-to-run [`Sim`] with fresh
    /// statistics.
    pub fn build(self) -> SimResult<Sim> {
        if let Some(until) = self.config.until {
            if !until.0.is_finite() || until.0 < 0.0 {
                return Err(QsError::config(format!("stop time {until} must be finite and non-negative")).into());
            }
        }
        Ok(Sim {
            rng:       SimRng::new(self.config.seed),
            config:    self.config,
            clock:     SimClock::new(),
            resources: self.resources,
            stats:     RunStats::new(),
            calendar:  Calendar::new(),
            tasks:     Vec::new(),
            parked:    Default::default(),
            sources:   self.sources,
            started:   false,
        })
    }
}
