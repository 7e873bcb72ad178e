//! Geographic incidence data: the prior probability that a random
//! encountered individual is infectious.

use crate::vectorised::Vectorised;
use crate::virus::Virus;
use serde::{Deserialize, Serialize};

/// Incidence data for the area the room's occupants are drawn from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cases {
    /// Population of the geographic area.
    pub geographic_population: Vectorised,
    /// New reported cases in the area, per day.
    pub geographic_cases: Vectorised,
    /// Multiplier correcting reported cases for under-ascertainment.
    pub ascertainment_bias: f64,
    /// Overrides the virus's infectiousness duration when set (days).
    pub infectiousness_days: Option<f64>,
}

impl Cases {
    pub fn new(
        geographic_population: impl Into<Vectorised>,
        geographic_cases: impl Into<Vectorised>,
        ascertainment_bias: f64,
    ) -> Self {
        Cases {
            geographic_population: geographic_population.into(),
            geographic_cases: geographic_cases.into(),
            ascertainment_bias,
            infectiousness_days: None,
        }
    }

    fn infectiousness_days(&self, virus: &Virus) -> f64 {
        self.infectiousness_days
            .unwrap_or(virus.infectiousness_days)
    }

    /// Probability that a randomly chosen individual from the area is
    /// currently infectious: active cases (reported cases, corrected for
    /// ascertainment, alive over the infectiousness window) over the
    /// population, clipped to [0, 1].
    #[must_use]
    pub fn probability_random_individual(&self, virus: &Virus) -> Vectorised {
        let prob = &self.geographic_cases * self.ascertainment_bias
            * self.infectiousness_days(virus)
            / &self.geographic_population;
        prob.minimum(1.0)
    }

    /// Probability that exactly `n_infected` of the `event_population`
    /// encountered individuals are infectious, treating each as an
    /// independent Bernoulli draw with [`Self::probability_random_individual`]
    /// (binomial law; Sun et al., doi.org/10.1038/s41562-020-01000-9).
    #[must_use]
    pub fn probability_meet_infected_person(
        &self,
        virus: &Virus,
        n_infected: u32,
        event_population: u32,
    ) -> Vectorised {
        let successes = binomial_coefficient(event_population, n_infected);
        self.probability_random_individual(virus).map(|p| {
            successes
                * p.powi(n_infected as i32)
                * (1.0 - p).powi((event_population - n_infected) as i32)
        })
    }
}

// C(n, k) as a float; event populations are room-sized, far from overflow.
fn binomial_coefficient(n: u32, k: u32) -> f64 {
    if k > n {
        return 0.0;
    }
    let k = k.min(n - k);
    (1..=k).fold(1.0, |acc, i| acc * f64::from(n - k + i) / f64::from(i))
}
