//! Simulated time: absolute instants, non-negative intervals and the
//! calendar units scripts are written in.

use ordered_float::NotNan;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::error::{Result, SimError};

/// A point on the timeline, in seconds since the timeline epoch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Instant(NotNan<f64>);

/// A non-negative, finite span of simulated seconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Interval(NotNan<f64>);

/// Calendar units accepted by `Interval::of`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeUnit {
    Sec,
    Min,
    Hour,
    Day,
    Week,
    Year,
}

impl TimeUnit {
    /// Length of one unit in seconds
    pub fn seconds(self) -> f64 {
        match self {
            TimeUnit::Sec => 1.0,
            TimeUnit::Min => 60.0,
            TimeUnit::Hour => TimeUnit::Min.seconds() * 60.0,
            TimeUnit::Day => TimeUnit::Hour.seconds() * 24.0,
            TimeUnit::Week => TimeUnit::Day.seconds() * 7.0,
            // Mean Gregorian year
            TimeUnit::Year => TimeUnit::Day.seconds() * 365.2425,
        }
    }
}

impl Instant {
    /// Start of the timeline
    pub fn epoch() -> Self {
        Instant::default()
    }

    /// Instant `secs` seconds after the epoch; `None` for NaN, infinite
    /// or negative input
    pub fn from_secs(secs: f64) -> Option<Self> {
        if !secs.is_finite() || secs < 0.0 {
            return None;
        }
        NotNan::new(secs).ok().map(Instant)
    }

    pub fn as_secs(self) -> f64 {
        self.0.into_inner()
    }

    /// `self + span`, or `None` if the sum is no longer a finite instant
    pub fn checked_add(self, span: Interval) -> Option<Instant> {
        Instant::from_secs(self.as_secs() + span.as_secs())
    }

    /// Span from `self` to `later`, zero if `later` is not actually later
    pub fn delta(self, later: Instant) -> Interval {
        if later <= self {
            return Interval::zero();
        }
        Interval(later.0 - self.0)
    }
}

impl Interval {
    pub fn zero() -> Self {
        Interval::default()
    }

    pub fn try_from_secs(secs: f64) -> Result<Self> {
        if !secs.is_finite() || secs < 0.0 {
            return Err(SimError::InvalidInterval(secs));
        }
        NotNan::new(secs)
            .map(Interval)
            .map_err(|_| SimError::InvalidInterval(secs))
    }

    /// `count` whole units, e.g. `Interval::of(1, TimeUnit::Hour)`
    pub fn of(count: u32, unit: TimeUnit) -> Self {
        let secs = f64::from(count) * unit.seconds();
        // Finite and non-negative for any u32 count.
        Interval(NotNan::new(secs).unwrap_or_default())
    }

    pub fn as_secs(self) -> f64 {
        self.0.into_inner()
    }

    pub fn is_zero(self) -> bool {
        self == Interval::zero()
    }
}

impl From<Interval> for f64 {
    fn from(Interval(value): Interval) -> Self {
        value.into_inner()
    }
}

impl From<Instant> for f64 {
    fn from(Instant(value): Instant) -> Self {
        value.into_inner()
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={}s", self.0)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}sec", self.0)
    }
}
