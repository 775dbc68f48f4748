//! Entity activities and the suspension primitives they yield.

use qs_core::{RequestId, ResourceId};

use crate::{EntityCtx, SimResult};

/// What an activity waits for before it is resumed again.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Step {
    /// Resume after `d` units of simulated time.
    Delay(f64),
    /// Resume once `request` holds a grant at `resource`.
    ///
    /// Returned by [`EntityCtx::wait_for_resource`].  If the request was
    /// granted immediately the activity resumes at the same instant.
    Acquire { resource: ResourceId, request: RequestId },
    /// The activity is finished; its completion hook runs now.
    Done,
}

/// One entity's process, written as an explicit state machine.
///
/// The scheduler calls [`resume`](Self::resume) when the previous [`Step`]
/// has been satisfied.  All entity and resource mutation happens inside
/// `resume`, through the [`EntityCtx`].
///
/// Closures of the form `FnMut(&mut EntityCtx<'_>) -> SimResult<Step>`
/// implement this trait.
pub trait Activity {
    fn resume(&mut self, ctx: &mut EntityCtx<'_>) -> SimResult<Step>;
}

impl<F> Activity for F
where
    F: FnMut(&mut EntityCtx<'_>) -> SimResult<Step>,
{
    fn resume(&mut self, ctx: &mut EntityCtx<'_>) -> SimResult<Step> {
        self(ctx)
    }
}

// ── Route ─────────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Stage {
    Arrive,
    Serve,
    Leave,
}

/// The common activity: visit each resource in turn (queue, service,
/// release), then finish.
///
/// ```rust,ignore
/// let activity = Route::new([teller, cashier]).priority(0);
/// ```
#[derive(Clone, Debug)]
pub struct Route {
    stops:    Vec<ResourceId>,
    next:     usize,
    stage:    Stage,
    priority: Option<i64>,
}

impl Route {
    pub fn new(stops: impl IntoIterator<Item = ResourceId>) -> Self {
        Self {
            stops:    stops.into_iter().collect(),
            next:     0,
            stage:    Stage::Arrive,
            priority: None,
        }
    }

    /// Request every stop at `priority` instead of the entity's own.
    pub fn priority(mut self, priority: i64) -> Self {
        self.priority = Some(priority);
        self
    }
}

impl Activity for Route {
    fn resume(&mut self, ctx: &mut EntityCtx<'_>) -> SimResult<Step> {
        let Some(&resource) = self.stops.get(self.next) else {
            return Ok(Step::Done);
        };
        match self.stage {
            Stage::Arrive => {
                self.stage = Stage::Serve;
                ctx.wait_for_resource(resource, self.priority)
            }
            Stage::Serve => {
                self.stage = Stage::Leave;
                ctx.process_at_resource(resource)
            }
            Stage::Leave => {
                ctx.release_resource(resource)?;
                self.stage = Stage::Arrive;
                self.next += 1;
                self.resume(ctx)
            }
        }
    }
}
