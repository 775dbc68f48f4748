//! Resampling of irregular event timestamps onto a fixed grid.
//!
//! # Algorithm
//!
//! ```text
//! key(t)   = round_half_even(t * 10^decimals)        // grid cell of an event
//! buckets  = key → value of the LAST event in that cell (arrival order)
//! sample i = buckets[i] if present, else sample i-1  (sample -1 = 0)
//! length   = floor(now / step)
//! ```
//!
//! The result approximates a right-continuous step function of the logged
//! signal.  Events rounding past the final sample are dropped; events rounding
//! to a negative cell cannot occur because simulated time starts at 0.

use std::collections::BTreeMap;

use qs_core::{SampleFrequency, SimTime};

/// Which signal of the event log to resample.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SeriesKind {
    /// Requests waiting for a grant.
    QueueSize,
    /// Grants currently held (units in service).
    Occupancy,
    /// Occupancy divided by capacity, rounded to two decimals.
    Utilization,
}

/// Resample chronologically ordered `(time, value)` pairs onto the grid of
/// `freq` covering `[0, now)`.
///
/// Values before the first event are `T::default()`.
pub fn resample<T, I>(samples: I, freq: SampleFrequency, now: SimTime) -> Vec<T>
where
    T: Copy + Default,
    I: IntoIterator<Item = (SimTime, T)>,
{
    let len = freq.sample_count(now);

    let mut buckets: BTreeMap<i64, T> = BTreeMap::new();
    for (time, value) in samples {
        // Later events overwrite earlier ones in the same cell.
        buckets.insert(freq.grid_index(time), value);
    }

    let mut out = Vec::with_capacity(len);
    let mut current = T::default();
    for i in 0..len as i64 {
        if let Some(v) = buckets.get(&i) {
            current = *v;
        }
        out.push(current);
    }
    out
}

/// Round a ratio to two decimals, half-to-even.
#[inline]
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round_ties_even() / 100.0
}
