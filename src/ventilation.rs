//! Air-exchange strategies: mechanical systems, filtration units and
//! buoyancy-driven natural ventilation through window openings, plus a
//! compositor summing any number of them.
//!
//! Every strategy exposes the same contract: `air_exchange(room, time)`
//! returns the rate in volume turnovers per hour, zero whenever the
//! mechanism's `active` interval says it is off.

use crate::error::ModelError;
use crate::interval::Interval;
use crate::numeric::sorted_unique_times;
use crate::piecewise::PiecewiseConstant;
use crate::room::Room;
use crate::vectorised::Vectorised;
use serde::{Deserialize, Serialize};

/// Discharge coefficient of a sliding or side-hung window opening.
const SLIDING_WINDOW_DISCHARGE: f64 = 0.6;
/// Gravitational acceleration, m/s².
const GRAVITY: f64 = 9.81;

/// Geometry and schedule of an open window. Outside temperature is a
/// function of time; the inside temperature comes from the room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowOpening {
    /// When the window is open.
    pub active: Interval,
    /// Outside air temperature over the day, in Kelvin.
    pub outside_temp: PiecewiseConstant,
    /// Height of the window, in m.
    pub window_height: Vectorised,
    /// Length of the opening, in m.
    pub opening_length: Vectorised,
    /// Number of identical windows open at once.
    pub number_of_windows: u32,
}

impl WindowOpening {
    pub fn new(
        active: Interval,
        outside_temp: PiecewiseConstant,
        window_height: impl Into<Vectorised>,
        opening_length: impl Into<Vectorised>,
        number_of_windows: u32,
    ) -> Result<Self, ModelError> {
        let window_height = window_height.into();
        let opening_length = opening_length.into();
        if window_height.min_value() <= 0.0 {
            return Err(ModelError::InvalidGeometry(
                "the window height must be positive".to_string(),
            ));
        }
        if opening_length.min_value() <= 0.0 {
            return Err(ModelError::InvalidGeometry(
                "the window opening length must be positive".to_string(),
            ));
        }
        if number_of_windows == 0 {
            return Err(ModelError::InvalidGeometry(
                "at least one window is needed".to_string(),
            ));
        }
        Ok(WindowOpening {
            active,
            outside_temp,
            window_height,
            opening_length,
            number_of_windows,
        })
    }

    /// Buoyancy-driven flow through the opening, in air changes per hour.
    ///
    /// Bernoulli flow driven by the density difference between inside and
    /// outside air. An inverted or zero temperature gradient produces no
    /// buoyancy: the rate goes continuously to its zero-difference limit, 0.
    fn air_exchange(&self, room: &Room, time: f64, cd_b: &Vectorised) -> Vectorised {
        if !self.active.triggered(time) {
            return 0.0.into();
        }
        let inside_temp = room.inside_temp.value(time);
        let outside_temp = self.outside_temp.value(time);
        let delta_temp = (inside_temp - &outside_temp).maximum(0.0);
        let temp_gradient = delta_temp / &outside_temp;
        let root = (GRAVITY * &self.window_height * temp_gradient).sqrt();
        let window_area =
            &self.window_height * &self.opening_length * f64::from(self.number_of_windows);
        3600.0 / (3.0 * &room.volume) * cd_b * window_area * root
    }

    fn transition_times(&self, room: &Room) -> Vec<f64> {
        let mut times = self.active.transition_times();
        times.extend_from_slice(room.inside_temp.transition_times());
        times.extend_from_slice(self.outside_temp.transition_times());
        sorted_unique_times(times)
    }
}

/// A top- or side-hung window, whose discharge coefficient depends on the
/// opening angle and the width/height ratio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HingedWindow {
    pub window: WindowOpening,
    /// Width of the window, in m.
    pub window_width: Vectorised,
}

impl HingedWindow {
    pub fn new(
        active: Interval,
        outside_temp: PiecewiseConstant,
        window_height: impl Into<Vectorised>,
        opening_length: impl Into<Vectorised>,
        window_width: impl Into<Vectorised>,
        number_of_windows: u32,
    ) -> Result<Self, ModelError> {
        let window_height = window_height.into();
        let opening_length = opening_length.into();
        let window_width = window_width.into();
        if window_width.min_value() <= 0.0 {
            return Err(ModelError::InvalidGeometry(
                "the hinged window width must be positive".to_string(),
            ));
        }
        // The opening angle is asin(L / 2H): an opening longer than twice
        // the height has no geometric meaning for a hinged pane.
        let out_of_range = opening_length
            .zip_with(&window_height, |l, h| if l > 2.0 * h { 1.0 } else { 0.0 })
            .to_vec()
            .iter()
            .any(|&flag| flag != 0.0);
        if out_of_range {
            return Err(ModelError::InvalidGeometry(
                "the opening length of a hinged window cannot exceed twice its height"
                    .to_string(),
            ));
        }
        Ok(HingedWindow {
            window: WindowOpening::new(
                active,
                outside_temp,
                window_height,
                opening_length,
                number_of_windows,
            )?,
            window_width,
        })
    }

    /// Discharge coefficient of the hinged opening.
    ///
    /// `Cd_max · (1 − exp(−M·φ))` with the opening angle
    /// `φ = 2·asin(L/2H)` and `(M, Cd_max)` from the width/height ratio of
    /// the pane (CIBSE AM10 fits). Continuous and never negative.
    #[must_use]
    pub fn cd_b(&self) -> Vectorised {
        let ratio = &self.window_width / &self.window.window_height;
        let angle = self
            .window
            .opening_length
            .zip_with(&self.window.window_height, |l, h| {
                2.0 * (l / (2.0 * h)).asin()
            });
        ratio.zip_with(&angle, |ratio, angle| {
            let (m, cd_max) = if ratio < 0.5 {
                (0.06, 0.612)
            } else if ratio < 1.0 {
                (0.048, 0.589)
            } else if ratio < 2.0 {
                (0.04, 0.563)
            } else {
                (0.038, 0.548)
            };
            cd_max * (1.0 - (-m * angle).exp())
        })
    }
}

/// A ventilation mechanism. A closed set of variants sharing the
/// `air_exchange` contract; [`Ventilation::Multiple`] composes any number of
/// them, to arbitrary depth, by summing their rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Ventilation {
    /// A fixed air-change rate (h⁻¹) while active.
    AirChange {
        active: Interval,
        air_exch: Vectorised,
    },
    /// Natural ventilation through a sliding or fully open window.
    SlidingWindow(WindowOpening),
    /// Natural ventilation through a hinged window.
    HingedWindow(HingedWindow),
    /// An HVAC system supplying `q_air_mech` m³/h of fresh air.
    HVACMechanical {
        active: Interval,
        q_air_mech: Vectorised,
    },
    /// A HEPA filtration unit processing `q_air_mech` m³/h. Filtration
    /// removes virions like fresh-air supply does, so the rate contract is
    /// the same.
    HEPAFilter {
        active: Interval,
        q_air_mech: Vectorised,
    },
    Multiple(Vec<Ventilation>),
}

impl Ventilation {
    pub fn sliding_window(
        active: Interval,
        outside_temp: PiecewiseConstant,
        window_height: impl Into<Vectorised>,
        opening_length: impl Into<Vectorised>,
    ) -> Result<Self, ModelError> {
        Ok(Ventilation::SlidingWindow(WindowOpening::new(
            active,
            outside_temp,
            window_height,
            opening_length,
            1,
        )?))
    }

    pub fn hinged_window(
        active: Interval,
        outside_temp: PiecewiseConstant,
        window_height: impl Into<Vectorised>,
        opening_length: impl Into<Vectorised>,
        window_width: impl Into<Vectorised>,
    ) -> Result<Self, ModelError> {
        Ok(Ventilation::HingedWindow(HingedWindow::new(
            active,
            outside_temp,
            window_height,
            opening_length,
            window_width,
            1,
        )?))
    }

    /// The air-exchange rate at `time`, in volume turnovers per hour.
    /// Always ≥ 0; exactly 0 outside the mechanism's active interval.
    #[must_use]
    pub fn air_exchange(&self, room: &Room, time: f64) -> Vectorised {
        match self {
            Ventilation::AirChange { active, air_exch } => {
                if active.triggered(time) {
                    air_exch.clone()
                } else {
                    0.0.into()
                }
            }
            Ventilation::SlidingWindow(window) => {
                window.air_exchange(room, time, &SLIDING_WINDOW_DISCHARGE.into())
            }
            Ventilation::HingedWindow(hinged) => {
                hinged.window.air_exchange(room, time, &hinged.cd_b())
            }
            Ventilation::HVACMechanical { active, q_air_mech }
            | Ventilation::HEPAFilter { active, q_air_mech } => {
                if active.triggered(time) {
                    q_air_mech / &room.volume
                } else {
                    0.0.into()
                }
            }
            Ventilation::Multiple(ventilations) => ventilations
                .iter()
                .fold(Vectorised::from(0.0), |acc, ventilation| {
                    acc + ventilation.air_exchange(room, time)
                }),
        }
    }

    /// All times at which this mechanism's rate may change state.
    #[must_use]
    pub fn transition_times(&self, room: &Room) -> Vec<f64> {
        match self {
            Ventilation::AirChange { active, .. }
            | Ventilation::HVACMechanical { active, .. }
            | Ventilation::HEPAFilter { active, .. } => active.transition_times(),
            Ventilation::SlidingWindow(window) => window.transition_times(room),
            Ventilation::HingedWindow(hinged) => hinged.window.transition_times(room),
            Ventilation::Multiple(ventilations) => {
                let mut times = Vec::new();
                for ventilation in ventilations {
                    times.extend(ventilation.transition_times(room));
                }
                sorted_unique_times(times)
            }
        }
    }
}
