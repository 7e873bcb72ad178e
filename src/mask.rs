//! Face covering filtration.

use crate::vectorised::Vectorised;
use serde::{Deserialize, Serialize};

/// A face covering worn by an occupant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mask {
    /// Filtration efficiency when inhaling, as a fraction in [0, 1].
    pub eta_inhale: Vectorised,
    /// Global factor applied to the filtration efficiency when exhaling.
    pub factor_exhale: f64,
}

impl Mask {
    pub fn new(eta_inhale: impl Into<Vectorised>) -> Self {
        Mask {
            eta_inhale: eta_inhale.into(),
            factor_exhale: 1.0,
        }
    }

    /// The filtration efficiency applied to inhaled air.
    #[must_use]
    pub fn inhale_efficiency(&self) -> &Vectorised {
        &self.eta_inhale
    }

    /// Overall exhale filtration efficiency, including the effect of leaks
    /// through the sides, as a function of the particle diameter in microns.
    ///
    /// Piecewise linear fit obtained from measurements of filtration
    /// efficiency and side leakage (Asadi et al. 2020).
    #[must_use]
    pub fn exhale_efficiency(&self, diameter: &Vectorised) -> Vectorised {
        diameter.map(|d| {
            let eta = if d < 0.5 {
                0.0
            } else if d < 0.94614 {
                0.5893 * d + 0.1546
            } else if d < 3.0 {
                0.0509 * d + 0.664
            } else {
                0.8167
            };
            eta * self.factor_exhale
        })
    }

    /// No face covering.
    #[must_use]
    pub fn no_mask() -> Self {
        Mask {
            eta_inhale: 0.0.into(),
            factor_exhale: 0.0,
        }
    }

    /// A surgical (Type I) mask.
    #[must_use]
    pub fn type_i() -> Self {
        Mask::new(0.5)
    }

    /// An FFP2 respirator.
    #[must_use]
    pub fn ffp2() -> Self {
        Mask::new(0.865)
    }
}
