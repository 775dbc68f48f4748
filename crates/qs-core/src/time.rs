//! Simulation time model.
//!
//! # Design
//!
//! Time is continuous.  `SimTime` wraps an `f64` and gives it a total order
//! (via [`f64::total_cmp`]) so it can key a `BTreeMap` calendar.  The external
//! scheduler owns the clock; instrumentation only ever reads `now`.
//!
//! Resampling onto a fixed grid happens at one of three
//! [`SampleFrequency`] steps.  Each step is `10^-decimals`, so a timestamp
//! rounded to `decimals` places and multiplied by [`SampleFrequency::scale`]
//! is exactly the integer index of its grid cell.

use std::cmp::Ordering;
use std::fmt;

use crate::{QsError, QsResult};

// ── SimTime ───────────────────────────────────────────────────────────────────

/// An absolute simulated instant.
#[derive(Copy, Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimTime(pub f64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0.0);

    /// Return the instant `d` after `self`.
    #[inline]
    pub fn offset(self, d: f64) -> SimTime {
        SimTime(self.0 + d)
    }

    /// Duration elapsed from `earlier` to `self`.
    #[inline]
    pub fn since(self, earlier: SimTime) -> f64 {
        self.0 - earlier.0
    }

    #[inline]
    pub fn as_f64(self) -> f64 {
        self.0
    }
}

impl PartialEq for SimTime {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SimTime {}

impl PartialOrd for SimTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SimTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl std::ops::Add<f64> for SimTime {
    type Output = SimTime;
    #[inline]
    fn add(self, rhs: f64) -> SimTime {
        SimTime(self.0 + rhs)
    }
}

impl std::ops::Sub for SimTime {
    type Output = f64;
    #[inline]
    fn sub(self, rhs: SimTime) -> f64 {
        self.0 - rhs.0
    }
}

impl From<f64> for SimTime {
    fn from(t: f64) -> Self {
        SimTime(t)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Monotonic simulated clock.  Advanced only by the scheduler loop.
#[derive(Clone, Debug, Default)]
pub struct SimClock {
    now: SimTime,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Move the clock forward to `t`.
    ///
    /// Returns `InvalidState` if `t` lies in the past; the clock never
    /// moves backwards.
    pub fn advance_to(&mut self, t: SimTime) -> QsResult<()> {
        if t < self.now {
            return Err(QsError::invalid_state(format!(
                "clock cannot move backwards from {} to {}",
                self.now, t
            )));
        }
        self.now = t;
        Ok(())
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={}", self.now)
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level simulation configuration.
///
/// Typically built in code by the model author, or deserialised from a
/// config file with the `serde` feature.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    /// Stop once the clock would pass this instant.  `None` runs until no
    /// activity is left to resume.
    pub until: Option<SimTime>,
}

impl SimConfig {
    pub fn new(seed: u64) -> Self {
        Self { seed, until: None }
    }

    pub fn until(mut self, t: f64) -> Self {
        self.until = Some(SimTime(t));
        self
    }
}

// ── SampleFrequency ───────────────────────────────────────────────────────────

/// Grid step used when resampling irregular resource events.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SampleFrequency {
    /// Step 0.01.
    Hundredth,
    /// Step 0.1.
    Tenth,
    /// Step 1.
    One,
}

impl SampleFrequency {
    /// Decimal places timestamps are rounded to.
    pub fn decimals(self) -> u32 {
        match self {
            SampleFrequency::Hundredth => 2,
            SampleFrequency::Tenth => 1,
            SampleFrequency::One => 0,
        }
    }

    /// `10^decimals` — multiplying a rounded timestamp by this yields its
    /// grid index.
    pub fn scale(self) -> f64 {
        10f64.powi(self.decimals() as i32)
    }

    pub fn step(self) -> f64 {
        match self {
            SampleFrequency::Hundredth => 0.01,
            SampleFrequency::Tenth => 0.1,
            SampleFrequency::One => 1.0,
        }
    }

    /// Index of the grid cell `t` falls in after rounding half-to-even.
    #[inline]
    pub fn grid_index(self, t: SimTime) -> i64 {
        (t.0 * self.scale()).round_ties_even() as i64
    }

    /// Number of grid samples strictly covered by `[0, now)`.
    pub fn sample_count(self, now: SimTime) -> usize {
        // Absorb representation error such as 0.3 * 10 = 2.9999999999999996.
        let n = (now.0 * self.scale() + 1e-9).floor();
        if n <= 0.0 { 0 } else { n as usize }
    }
}

impl TryFrom<f64> for SampleFrequency {
    type Error = QsError;

    fn try_from(f: f64) -> QsResult<Self> {
        if f == 0.01 {
            Ok(SampleFrequency::Hundredth)
        } else if f == 0.1 {
            Ok(SampleFrequency::Tenth)
        } else if f == 1.0 {
            Ok(SampleFrequency::One)
        } else {
            Err(QsError::UnsupportedSampleFrequency(f))
        }
    }
}

impl fmt::Display for SampleFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.step())
    }
}
