//! Physical activity levels and their breathing rates.

use crate::vectorised::Vectorised;
use serde::{Deserialize, Serialize};

/// An occupant's physical activity, determining how much air they move.
/// Rates are in m³/h (Adams, 1993).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub inhalation_rate: Vectorised,
    pub exhalation_rate: Vectorised,
}

impl Activity {
    pub fn new(
        inhalation_rate: impl Into<Vectorised>,
        exhalation_rate: impl Into<Vectorised>,
    ) -> Self {
        Activity {
            inhalation_rate: inhalation_rate.into(),
            exhalation_rate: exhalation_rate.into(),
        }
    }

    #[must_use]
    pub fn seated() -> Self {
        Activity::new(0.51, 0.51)
    }

    #[must_use]
    pub fn standing() -> Self {
        Activity::new(0.57, 0.57)
    }

    #[must_use]
    pub fn light_activity() -> Self {
        Activity::new(1.25, 1.25)
    }

    #[must_use]
    pub fn moderate_activity() -> Self {
        Activity::new(1.78, 1.78)
    }

    #[must_use]
    pub fn heavy_exercise() -> Self {
        Activity::new(3.30, 3.30)
    }
}
