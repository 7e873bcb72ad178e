//! Virus properties: load in respiratory fluid, dose-response parameters,
//! and the airborne viability decay law.

use crate::vectorised::Vectorised;
use serde::{Deserialize, Serialize};

/// The longest airborne half-life the decay regression is allowed to
/// produce, in hours.
const MAX_HALFLIFE_HOURS: f64 = 6.43;

/// A virus strain. All quantities may carry one value per Monte-Carlo
/// sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Virus {
    /// RNA copies per mL of respiratory fluid.
    pub viral_load_in_sputum: Vectorised,
    /// RNA copies at which the infection probability reaches 50%.
    pub infectious_dose: Vectorised,
    /// Ratio of viable virions to total RNA copies.
    pub viable_to_rna_ratio: Vectorised,
    /// Reported change of transmissibility of a variant of concern, as a
    /// multiplier on the infectious dose (smaller means more transmissible).
    pub transmissibility_factor: f64,
    /// Number of days an infected person stays infectious.
    pub infectiousness_days: f64,
}

impl Virus {
    /// Airborne viability half-life in hours, as a function of relative
    /// humidity (fraction) and inside temperature (Kelvin).
    ///
    /// Regression on the measurements of Dabisch et al.
    /// (doi.org/10.1080/02786826.2020.1829536) with the simulated-sunlight
    /// term set to zero, i.e. indoors. The regression is clamped to
    /// [`MAX_HALFLIFE_HOURS`] and falls back to that cap where it turns
    /// non-positive outside its fitted range.
    #[must_use]
    pub fn halflife(&self, humidity: &Vectorised, inside_temp: &Vectorised) -> Vectorised {
        humidity.zip_with(inside_temp, |humidity, temp| {
            let temp_term = ((temp - 273.15) - 20.615) / 10.585;
            let humidity_term = (humidity * 100.0 - 45.235) / 28.665;
            // Decay in 1/min; the -0.14369 and -0.02636 terms are the
            // sunlight interaction at zero irradiance.
            let decay_per_minute = 0.16030 + 0.04018 * temp_term + 0.02176 * humidity_term
                - 0.14369
                - 0.02636 * temp_term;
            let halflife = std::f64::consts::LN_2 / (decay_per_minute * 60.0);
            if halflife <= 0.0 {
                MAX_HALFLIFE_HOURS
            } else {
                halflife.min(MAX_HALFLIFE_HOURS)
            }
        })
    }

    /// Viral inactivation rate in h⁻¹.
    #[must_use]
    pub fn decay_constant(&self, humidity: &Vectorised, inside_temp: &Vectorised) -> Vectorised {
        std::f64::consts::LN_2 / self.halflife(humidity, inside_temp)
    }

    /// Wild-type SARS-CoV-2.
    #[must_use]
    pub fn sars_cov_2() -> Self {
        Virus {
            viral_load_in_sputum: 1e9.into(),
            infectious_dose: 50.0.into(),
            viable_to_rna_ratio: 0.5.into(),
            transmissibility_factor: 1.0,
            infectiousness_days: 14.0,
        }
    }

    /// The Alpha variant of concern.
    #[must_use]
    pub fn sars_cov_2_alpha() -> Self {
        Virus {
            transmissibility_factor: 0.78,
            ..Virus::sars_cov_2()
        }
    }

    /// The Delta variant of concern.
    #[must_use]
    pub fn sars_cov_2_delta() -> Self {
        Virus {
            transmissibility_factor: 0.51,
            ..Virus::sars_cov_2()
        }
    }

    /// The Omicron variant of concern.
    #[must_use]
    pub fn sars_cov_2_omicron() -> Self {
        Virus {
            transmissibility_factor: 0.2,
            ..Virus::sars_cov_2()
        }
    }
}
