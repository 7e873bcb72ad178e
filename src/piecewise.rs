//! Step functions of time, used for outside/inside temperatures and any
//! other physical parameter that changes during the day.

use crate::error::ModelError;
use crate::interval::{Interval, SpecificInterval};
use crate::vectorised::Vectorised;
use serde::{Deserialize, Serialize};

/// A piecewise-constant function of time: `n + 1` boundary times and `n`
/// values (each a scalar or one value per Monte-Carlo sample).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PiecewiseConstant {
    transition_times: Vec<f64>,
    values: Vec<Vectorised>,
}

impl PiecewiseConstant {
    pub fn new(transition_times: Vec<f64>, values: Vec<Vectorised>) -> Result<Self, ModelError> {
        if transition_times.len() != values.len() + 1 {
            return Err(ModelError::Configuration(format!(
                "a piecewise-constant function needs one more transition time than values \
                 (got {} times and {} values)",
                transition_times.len(),
                values.len()
            )));
        }
        if transition_times.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ModelError::Configuration(
                "piecewise-constant transition times must be strictly increasing".to_string(),
            ));
        }
        Ok(PiecewiseConstant {
            transition_times,
            values,
        })
    }

    /// A function that is constant over the whole day.
    pub fn constant(value: impl Into<Vectorised>) -> Self {
        PiecewiseConstant {
            transition_times: vec![0.0, crate::interval::DAY_HOURS],
            values: vec![value.into()],
        }
    }

    #[must_use]
    pub fn transition_times(&self) -> &[f64] {
        &self.transition_times
    }

    #[must_use]
    pub fn values(&self) -> &[Vectorised] {
        &self.values
    }

    /// The value of the segment containing `time`. Times at or before the
    /// first boundary take the first value, times after the last boundary
    /// take the last value; segments are left-open.
    #[must_use]
    pub fn value(&self, time: f64) -> Vectorised {
        if time <= self.transition_times[0] {
            return self.values[0].clone();
        }
        if time > *self.transition_times.last().unwrap() {
            return self.values.last().unwrap().clone();
        }
        for (window, value) in self.transition_times.windows(2).zip(&self.values) {
            if window[0] < time && time <= window[1] {
                return value.clone();
            }
        }
        // Strictly increasing boundaries make the scan above exhaustive.
        unreachable!("time {time} not located in any segment")
    }

    /// An equivalent function with each segment subdivided `refine_factor`
    /// times, preserving values. A finer mesh trades integration coarseness
    /// against more state-change segments in the concentration engine.
    pub fn refine(&self, refine_factor: usize) -> Result<PiecewiseConstant, ModelError> {
        if refine_factor == 0 {
            return Err(ModelError::Configuration(
                "the refine factor must be at least 1".to_string(),
            ));
        }
        let first = self.transition_times[0];
        let last = *self.transition_times.last().unwrap();
        let segments = (self.transition_times.len() - 1) * refine_factor;
        let step = (last - first) / segments as f64;
        let refined_times: Vec<f64> = (0..=segments).map(|i| first + step * i as f64).collect();
        // Previous-value interpolation at the midpoint of each refined
        // segment picks the original segment's value.
        let refined_values = refined_times
            .windows(2)
            .map(|w| self.value((w[0] + w[1]) / 2.0))
            .collect();
        PiecewiseConstant::new(refined_times, refined_values)
    }

    /// The interval over which the function is non-zero.
    #[must_use]
    pub fn interval(&self) -> Interval {
        let mut present_times = Vec::new();
        for (window, value) in self.transition_times.windows(2).zip(&self.values) {
            if value.to_vec().iter().any(|&v| v != 0.0) {
                present_times.push((window[0], window[1]));
            }
        }
        Interval::Specific(
            SpecificInterval::new(present_times).expect("segments are sorted and disjoint"),
        )
    }
}
