//! Time intervals over the 24-hour day.
//!
//! An [`Interval`] represents when something is "on": an occupant's presence
//! in the room, a window being open, an HVAC system running. Times are in
//! hours from midnight. Membership is left-open/right-closed — a mechanism
//! that switches state at time `t` is considered in its *previous* state at
//! exactly `t`, which keeps the concentration segments well defined.

use crate::error::ModelError;
use crate::numeric::sorted_unique_times;
use serde::{Deserialize, Serialize};

/// The full modeled day, in hours.
pub const DAY_HOURS: f64 = 24.0;

/// An explicit ordered set of disjoint `(start, stop)` pairs, in hours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecificInterval {
    present_times: Vec<(f64, f64)>,
}

impl SpecificInterval {
    /// Builds an interval from `(start, stop)` pairs.
    ///
    /// The pairs must be sorted, non-overlapping and each must satisfy
    /// `start < stop`; anything else is rejected.
    pub fn new(present_times: Vec<(f64, f64)>) -> Result<Self, ModelError> {
        let mut previous_stop = f64::NEG_INFINITY;
        for &(start, stop) in &present_times {
            if start >= stop {
                return Err(ModelError::Configuration(format!(
                    "interval ({start}, {stop}) is empty or reversed; start must be before stop"
                )));
            }
            if start < previous_stop {
                return Err(ModelError::Configuration(format!(
                    "interval ({start}, {stop}) overlaps or is out of order with the previous one"
                )));
            }
            previous_stop = stop;
        }
        Ok(SpecificInterval { present_times })
    }

    pub fn boundaries(&self) -> &[(f64, f64)] {
        &self.present_times
    }
}

/// A repeating on/off cycle over the day: on for `duration` minutes at the
/// start of every `period` minutes, beginning at `start` hours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodicInterval {
    /// In minutes, the period of the cycle.
    pub period: f64,
    /// In minutes, the on-time within each period.
    pub duration: f64,
    /// Time at which the first period starts (hours).
    pub start: f64,
}

impl PeriodicInterval {
    pub fn new(period: f64, duration: f64) -> Result<Self, ModelError> {
        Self::with_start(period, duration, 0.0)
    }

    pub fn with_start(period: f64, duration: f64, start: f64) -> Result<Self, ModelError> {
        if period < 0.0 || duration < 0.0 {
            return Err(ModelError::Configuration(format!(
                "periodic interval with period {period} min and duration {duration} min; \
                 both must be non-negative"
            )));
        }
        Ok(PeriodicInterval {
            period,
            duration,
            start,
        })
    }

    /// The generated `(start, stop)` pairs. A zero period or duration
    /// generates nothing.
    pub fn boundaries(&self) -> Vec<(f64, f64)> {
        if self.period == 0.0 || self.duration == 0.0 {
            return Vec::new();
        }
        let step = self.period / 60.0;
        let on_time = self.duration / 60.0;
        let mut result = Vec::new();
        let mut t = self.start;
        while t < DAY_HOURS {
            result.push((t, t + on_time));
            t += step;
        }
        result
    }
}

/// When something is "active", as a normalized, sorted, non-overlapping set
/// of `(start, stop)` pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Interval {
    Specific(SpecificInterval),
    Periodic(PeriodicInterval),
}

impl Interval {
    /// Convenience constructor for an explicit interval.
    pub fn specific(present_times: &[(f64, f64)]) -> Result<Self, ModelError> {
        Ok(Interval::Specific(SpecificInterval::new(
            present_times.to_vec(),
        )?))
    }

    /// Convenience constructor for a periodic interval (minutes).
    pub fn periodic(period: f64, duration: f64) -> Result<Self, ModelError> {
        Ok(Interval::Periodic(PeriodicInterval::new(period, duration)?))
    }

    /// Active for the whole modeled day.
    #[must_use]
    pub fn all_day() -> Self {
        Interval::Specific(SpecificInterval {
            present_times: vec![(0.0, DAY_HOURS)],
        })
    }

    #[must_use]
    pub fn boundaries(&self) -> Vec<(f64, f64)> {
        match self {
            Interval::Specific(s) => s.boundaries().to_vec(),
            Interval::Periodic(p) => p.boundaries(),
        }
    }

    /// Whether the given time falls inside this interval.
    #[must_use]
    pub fn triggered(&self, time: f64) -> bool {
        self.boundaries()
            .iter()
            .any(|&(start, stop)| start < time && time <= stop)
    }

    /// The sorted set of times at which the interval switches state.
    #[must_use]
    pub fn transition_times(&self) -> Vec<f64> {
        let mut times = Vec::new();
        for (start, stop) in self.boundaries() {
            times.push(start);
            times.push(stop);
        }
        sorted_unique_times(times)
    }
}
