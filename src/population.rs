//! Occupant groups: the exposed population and the infected occupants whose
//! breathing, speaking or shouting loads the room air with virions.

use crate::activity::Activity;
use crate::expiration::Expiration;
use crate::interval::Interval;
use crate::mask::Mask;
use crate::vectorised::Vectorised;
use crate::virus::Virus;
use serde::{Deserialize, Serialize};

/// A group of occupants sharing presence times, mask, activity and immunity
/// status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Population {
    /// Number of people in the group.
    pub number: u32,
    /// When the group is in the room.
    pub presence: Interval,
    pub mask: Mask,
    pub activity: Activity,
    /// Fraction of the group that is immune, in [0, 1].
    pub host_immunity: Vectorised,
}

impl Population {
    #[must_use]
    pub fn person_present(&self, time: f64) -> bool {
        self.presence.triggered(time)
    }
}

/// Infected occupants whose emission is derived from their expiratory
/// activity: viral load carried by the ejected aerosol volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfectedPopulation {
    pub number: u32,
    pub presence: Interval,
    pub mask: Mask,
    pub activity: Activity,
    pub virus: Virus,
    pub expiration: Expiration,
    pub host_immunity: Vectorised,
}

/// Infected occupants with a directly known per-person emission rate, e.g.
/// fitted from an observed superspreading event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmittingPopulation {
    pub number: u32,
    pub presence: Interval,
    pub mask: Mask,
    pub activity: Activity,
    pub virus: Virus,
    /// Emission rate per infected person, in virions/h.
    pub known_individual_emission_rate: f64,
    pub host_immunity: Vectorised,
}

/// The source of airborne virions in the room. A closed set of variants
/// sharing one emission contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Infected {
    Population(InfectedPopulation),
    Emitting(EmittingPopulation),
}

impl Infected {
    #[must_use]
    pub fn number(&self) -> u32 {
        match self {
            Infected::Population(p) => p.number,
            Infected::Emitting(p) => p.number,
        }
    }

    /// A structural copy with the occupant count replaced, used to build
    /// what-if scenarios (e.g. the total probability rule).
    #[must_use]
    pub fn with_number(&self, number: u32) -> Infected {
        match self {
            Infected::Population(p) => Infected::Population(InfectedPopulation {
                number,
                ..p.clone()
            }),
            Infected::Emitting(p) => Infected::Emitting(EmittingPopulation {
                number,
                ..p.clone()
            }),
        }
    }

    #[must_use]
    pub fn presence(&self) -> &Interval {
        match self {
            Infected::Population(p) => &p.presence,
            Infected::Emitting(p) => &p.presence,
        }
    }

    #[must_use]
    pub fn virus(&self) -> &Virus {
        match self {
            Infected::Population(p) => &p.virus,
            Infected::Emitting(p) => &p.virus,
        }
    }

    #[must_use]
    pub fn person_present(&self, time: f64) -> bool {
        self.presence().triggered(time)
    }

    /// The droplet diameter of the emission, when one is modeled.
    #[must_use]
    pub fn particle_diameter(&self) -> Option<&Vectorised> {
        match self {
            Infected::Population(p) => p.expiration.diameter(),
            Infected::Emitting(_) => None,
        }
    }

    /// Emission rate per mL of ejected respiratory fluid per infected
    /// person, in virions·cm³/(mL·m³·h). The exhalation rate in m³/h brings
    /// the 1e6 cm³/m³ conversion with it.
    #[must_use]
    pub fn emission_rate_per_aerosol_per_person(&self) -> Vectorised {
        match self {
            Infected::Population(p) => {
                &p.virus.viral_load_in_sputum
                    * &p.virus.viable_to_rna_ratio
                    * &p.activity.exhalation_rate
                    * 1e6
            }
            Infected::Emitting(p) => p.known_individual_emission_rate.into(),
        }
    }

    /// Ejected aerosol volume per volume of exhaled air, in mL/cm³, after
    /// the emitter's mask. The known-rate variant already measures whole
    /// virions, so its aerosol factor is 1.
    #[must_use]
    pub fn aerosols(&self) -> Vectorised {
        match self {
            Infected::Population(p) => p.expiration.aerosols(&p.mask),
            Infected::Emitting(_) => 1.0.into(),
        }
    }

    /// Emission rate per infected person, in virions/h.
    #[must_use]
    pub fn emission_rate_per_person(&self) -> Vectorised {
        self.emission_rate_per_aerosol_per_person() * self.aerosols()
    }

    /// Settling velocity of the emitted droplets, in m/s.
    #[must_use]
    pub fn settling_velocity(&self, evaporation_factor: f64) -> Vectorised {
        match self {
            Infected::Population(p) => p.expiration.settling_velocity(evaporation_factor),
            Infected::Emitting(_) => crate::expiration::REFERENCE_SETTLING_VELOCITY.into(),
        }
    }

    /// Fraction of the inhaled dose deposited in an exposed person's
    /// respiratory tract.
    #[must_use]
    pub fn fraction_deposited(&self, evaporation_factor: f64) -> Vectorised {
        match self {
            Infected::Population(p) => p.expiration.fraction_deposited(evaporation_factor),
            Infected::Emitting(_) => crate::expiration::DEFAULT_FRACTION_DEPOSITED.into(),
        }
    }
}
