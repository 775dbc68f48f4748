//! `qs-sim` — a cooperative event-calendar scheduler for the `rust_qs`
//! instrumentation.
//!
//! The instrumentation crates never advance time themselves.  This crate is
//! the collaborator that does: it owns the clock, resumes entity activities
//! in time order, grants resources, and disposes entities when their
//! activities finish.
//!
//! # Event loop
//!
//! ```text
//! start()   → schedule every Source at t = 0
//! loop:
//!   ① pop earliest (time, task) from the Calendar; clock = time
//!   ② Source task  → launch the pending entity's activity, generate the next
//!                    entity, reschedule at now + delay
//!      Entity task → activity.resume(ctx) returns a Step:
//!                      Delay(d)             → reschedule at now + d
//!                      Acquire{res, req}    → now if granted, else park
//!                      Done                 → completion hook (dispose)
//!   ③ wake parked tasks whose requests were promoted by releases
//! ```
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use qs_entity::{Entity, Resource, Resources};
//! use qs_resource::ServiceTime;
//! use qs_sim::{NewEntity, NoopObserver, Route, SimBuilder, Source};
//!
//! let mut resources = Resources::new();
//! let teller = resources.add(
//!     Resource::builder("Teller", 1).service_time(ServiceTime::constant(3.0)).build()?,
//! )?;
//! let source = Source::builder("Customer")
//!     .interarrival([5.0, 5.0, 5.0])
//!     .first_delay(0.0)
//!     .entities(move || NewEntity::new(Entity::new("Customer"), Route::new([teller])))
//!     .build()?;
//! let mut sim = SimBuilder::new(SimConfig::new(42), resources).source(source).build()?;
//! sim.run(&mut NoopObserver)?;
//! let waits = sim.stats().get_waiting_times(None, None)?;
//! ```

pub mod builder;
pub mod calendar;
pub mod context;
pub mod error;
pub mod observer;
pub mod process;
pub mod sim;
pub mod source;


pub use builder::SimBuilder;
pub use calendar::Calendar;
pub use context::EntityCtx;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use process::{Activity, Route, Step};
pub use sim::{dispose_on_completion, CompletionHook, Sim};
pub use source::{Arrival, NewEntity, Source, SourceBuilder};
