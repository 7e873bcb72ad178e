//! Convenient re-exports of the types needed to assemble a scenario.

pub use crate::activity::Activity;
pub use crate::cases::Cases;
pub use crate::concentration::{ConcentrationModel, DEFAULT_EVAPORATION_FACTOR};
pub use crate::error::ModelError;
pub use crate::expiration::Expiration;
pub use crate::exposure::ExposureModel;
pub use crate::interval::{Interval, PeriodicInterval, SpecificInterval};
pub use crate::mask::Mask;
pub use crate::monte_carlo::{percentile, summarize, Parameter, Prior, SummaryStats};
pub use crate::piecewise::PiecewiseConstant;
pub use crate::population::{EmittingPopulation, Infected, InfectedPopulation, Population};
pub use crate::room::Room;
pub use crate::vectorised::Vectorised;
pub use crate::ventilation::{HingedWindow, Ventilation, WindowOpening};
pub use crate::virus::Virus;
