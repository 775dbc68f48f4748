//! `qs-entity` — entity lifecycle and visit accounting for the `rust_qs`
//! framework.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                  |
//! |------------|-----------------------------------------------------------|
//! | [`visit`]  | `VisitRecord` — arrival / start / finish sequences        |
//! | [`entity`] | `Entity`, `EntityState`, `Timing`                         |
//!
//! # Visit protocol
//!
//! ```text
//! wait_for_resource   → arrival_time += now, tracker.request(priority)
//!   … scheduler grants the request …
//! process_at_resource → start_service_time += now, log Start, service_time(entity)
//!   … scheduler elapses the service duration …
//! release_resource    → finish_service_time += now, tracker.release(request)
//! dispose             → disposal_time = now   (terminal)
//! ```
//!
//! Timing queries are only answered for disposed entities and are computed
//! once, on first access.

pub mod entity;
pub mod visit;

#[cfg(test)]
mod tests;

pub use entity::{Entity, EntityState, Timing};
pub use visit::VisitRecord;

/// A resource tracker whose service-time hooks see an [`Entity`].
pub type Resource = qs_resource::ResourceTracker<Entity>;

/// The model's resource arena.
pub type Resources = qs_resource::ResourcePool<Entity>;
