//! The concentration engine: time evolution of the airborne virion
//! concentration in a room.
//!
//! All inputs are piecewise constant in time, so between two consecutive
//! state-change times the concentration obeys
//! `dC/dt = E/V − R·C` with constant removal rate `R` and emission `E`,
//! giving the closed form
//! `C(t) = L + (C₀ − L)·exp(−R·(t − t₀))` on each segment, where `L` is the
//! steady-state limit the segment would approach if held indefinitely.
//! Segments are evaluated strictly in time order, each one taking the
//! previous segment's terminal value as its boundary condition, so the
//! concentration is continuous across segment boundaries.
//!
//! The engine works with the *normed* concentration — normalized by the
//! per-person emission rate and the infected occupant count — so a
//! concentration profile can be reused across emission scenarios; physical
//! values are recovered by multiplying the normalization back.

use crate::error::ModelError;
use crate::numeric::sorted_unique_times;
use crate::population::Infected;
use crate::room::Room;
use crate::vectorised::Vectorised;
use crate::ventilation::Ventilation;
use log::trace;
use serde::{Deserialize, Serialize};

/// Fraction by which droplets shrink once airborne, applied to the emission
/// diameter in every diameter-dependent quantity.
pub const DEFAULT_EVAPORATION_FACTOR: f64 = 0.3;

/// The virion concentration in a room over one day, driven by a room, a
/// ventilation strategy and an infected population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcentrationModel {
    pub room: Room,
    pub ventilation: Ventilation,
    pub infected: Infected,
    /// Droplet-diameter shrinkage due to evaporation.
    pub evaporation_factor: f64,
}

impl ConcentrationModel {
    /// Builds a concentration model, failing fast on configurations whose
    /// steady state is undefined (non-positive removal rate during
    /// emission).
    pub fn new(
        room: Room,
        ventilation: Ventilation,
        infected: Infected,
        evaporation_factor: f64,
    ) -> Result<Self, ModelError> {
        if evaporation_factor <= 0.0 {
            return Err(ModelError::Configuration(
                "the evaporation factor must be positive".to_string(),
            ));
        }
        let model = ConcentrationModel {
            room,
            ventilation,
            infected,
            evaporation_factor,
        };
        model.check_removal_rate()?;
        Ok(model)
    }

    // The concentration limit is 1/(R·V): a removal rate that is zero (or
    // negative, e.g. a miscofigured extraction term) while the infected
    // occupants emit leaves the steady state undefined. This is a
    // configuration error, not a numeric edge case.
    fn check_removal_rate(&self) -> Result<(), ModelError> {
        for window in self.state_change_times().windows(2) {
            let segment_end = window[1];
            if !self.infected.person_present(segment_end) {
                continue;
            }
            let removal = self.removal_rate(segment_end);
            if removal.min_value() <= 0.0 {
                return Err(ModelError::Configuration(format!(
                    "the removal rate (ventilation + viral decay + deposition) is not positive \
                     on the segment ending at t={segment_end} h while the infected occupants \
                     are emitting; the steady-state concentration is undefined. Check the \
                     ventilation rates."
                )));
            }
        }
        Ok(())
    }

    /// The merged, sorted, de-duplicated state-change times of the model:
    /// infected presence boundaries, ventilation activity and temperature
    /// boundaries, room-temperature boundaries (the decay rate follows
    /// them), and the start of the day.
    #[must_use]
    pub fn state_change_times(&self) -> Vec<f64> {
        let mut times = vec![0.0];
        times.extend(self.infected.presence().transition_times());
        times.extend(self.ventilation.transition_times(&self.room));
        times.extend_from_slice(self.room.inside_temp.transition_times());
        sorted_unique_times(times)
    }

    /// Removal rate `R(t)` in h⁻¹: air exchange + viral decay +
    /// gravitational settling. Constant within each state segment.
    #[must_use]
    pub fn removal_rate(&self, time: f64) -> Vectorised {
        let settling = self.infected.settling_velocity(self.evaporation_factor);
        let deposition = settling * 3600.0 / crate::expiration::EMISSION_HEIGHT;
        let decay = self
            .infected
            .virus()
            .decay_constant(&self.room.humidity, &self.room.inside_temp.value(time));
        deposition + decay + self.ventilation.air_exchange(&self.room, time)
    }

    // Steady-state normed concentration the segment ending at `time` would
    // approach if held indefinitely: 1/(R·V) while emitting, 0 otherwise.
    fn normed_concentration_limit(&self, time: f64) -> Vectorised {
        if self.infected.person_present(time) {
            1.0 / (self.removal_rate(time) * &self.room.volume)
        } else {
            0.0.into()
        }
    }

    // The normed concentration at every state-change time, computed once in
    // time order. This is the per-evaluation memo table: downstream queries
    // within a segment only need its boundary value and the segment
    // parameters.
    pub(crate) fn normed_boundary_concentrations(&self, times: &[f64]) -> Vec<Vectorised> {
        let mut boundary_values: Vec<Vectorised> = Vec::with_capacity(times.len());
        boundary_values.push(0.0.into());
        for window in times.windows(2) {
            let (start, stop) = (window[0], window[1]);
            let removal = self.removal_rate(stop);
            let limit = self.normed_concentration_limit(stop);
            let fade = (-removal * (stop - start)).exp();
            let previous = boundary_values.last().unwrap();
            let next = &limit + (previous - &limit) * fade;
            boundary_values.push(next);
        }
        trace!(
            "normed boundary concentrations computed over {} segments",
            times.len().saturating_sub(1)
        );
        boundary_values
    }

    /// The normed concentration at `time`.
    #[must_use]
    pub fn normed_concentration(&self, time: f64) -> Vectorised {
        if time <= 0.0 {
            return 0.0.into();
        }
        let times = self.state_change_times();
        let boundary_values = self.normed_boundary_concentrations(&times);
        // Locate the segment (t_i, t_{i+1}] containing `time`; past the last
        // boundary the model decays from the final state.
        let segment = times.iter().rposition(|&t| t < time).unwrap_or(0);
        let segment_end = if segment + 1 < times.len() {
            times[segment + 1]
        } else {
            times[segment]
        };
        let removal = self.removal_rate(segment_end);
        let limit = if segment + 1 < times.len() {
            self.normed_concentration_limit(segment_end)
        } else {
            0.0.into()
        };
        let start_value = &boundary_values[segment];
        let fade = (-removal * (time - times[segment])).exp();
        &limit + (start_value - &limit) * fade
    }

    /// The physical concentration at `time`, in virions/m³.
    #[must_use]
    pub fn concentration(&self, time: f64) -> Vectorised {
        self.normed_concentration(time) * self.normalization_factor()
    }

    /// Emission normalization: per-person emission rate times the number of
    /// infected occupants.
    #[must_use]
    pub fn normalization_factor(&self) -> Vectorised {
        self.infected.emission_rate_per_person() * f64::from(self.infected.number())
    }

    /// The integral of the normed concentration between `start` and `stop`,
    /// piecewise exact over the state segments.
    #[must_use]
    pub fn normed_integrated_concentration(&self, start: f64, stop: f64) -> Vectorised {
        let times = self.state_change_times();
        let boundary_values = self.normed_boundary_concentrations(&times);
        self.normed_integrated_with_table(&times, &boundary_values, start, stop)
    }

    // Integration against a precomputed boundary table, so one exposure
    // evaluation shares a single table across all its presence intervals.
    pub(crate) fn normed_integrated_with_table(
        &self,
        times: &[f64],
        boundary_values: &[Vectorised],
        start: f64,
        stop: f64,
    ) -> Vectorised {
        let mut total = Vectorised::from(0.0);
        for (i, window) in times.windows(2).enumerate() {
            let (segment_start, segment_stop) = (window[0], window[1]);
            if start >= segment_stop || stop <= segment_start {
                continue;
            }
            let clipped_start = start.max(segment_start);
            let clipped_stop = stop.min(segment_stop);
            let delta = clipped_stop - clipped_start;
            let removal = self.removal_rate(segment_stop);
            let limit = self.normed_concentration_limit(segment_stop);
            // Concentration at the clipped start, from the segment's own
            // closed form.
            let fade = (-&removal * (clipped_start - segment_start)).exp();
            let start_value = &limit + (&boundary_values[i] - &limit) * fade;
            // ∫ C dt = L·Δt + (L − C₀)·(exp(−R·Δt) − 1)/R, with the R → 0
            // limit C₀·Δt taken elementwise.
            let segment_integral =
                Vectorised::zip_with3(&limit, &start_value, &removal, |l, c0, r| {
                    if r == 0.0 {
                        c0 * delta
                    } else {
                        l * delta + (l - c0) * ((-r * delta).exp() - 1.0) / r
                    }
                });
            total = total + segment_integral;
        }
        total
    }

    /// The integral of the physical concentration between `start` and
    /// `stop`, in virions·h/m³.
    #[must_use]
    pub fn integrated_concentration(&self, start: f64, stop: f64) -> Vectorised {
        self.normed_integrated_concentration(start, stop) * self.normalization_factor()
    }
}
