//! Expiratory activity of an infected occupant: how much respiratory-fluid
//! aerosol they eject per volume of exhaled air, and the fate of those
//! droplets once airborne (settling, deposition in a receiving respiratory
//! tract).
//!
//! Droplets shrink by evaporation once exhaled; every diameter-dependent
//! quantity below is evaluated on the evaporated diameter `d · f_evap`.

use crate::error::ModelError;
use crate::mask::Mask;
use crate::vectorised::Vectorised;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Gravitational settling velocity of a 2.5 µm reference droplet, in m/s.
pub(crate) const REFERENCE_SETTLING_VELOCITY: f64 = 1.88e-4;
/// Reference droplet diameter for the Stokes scaling, in µm.
const REFERENCE_DIAMETER: f64 = 2.5;
/// Height of the emission source (mouth/nose) above the floor, in m.
pub(crate) const EMISSION_HEIGHT: f64 = 1.5;
/// Fraction of inhaled virions deposited in the respiratory tract when no
/// droplet diameter is modeled.
pub(crate) const DEFAULT_FRACTION_DEPOSITED: f64 = 0.6;

/// An expiratory activity profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expiration {
    /// A single aerosol mode with a droplet diameter (µm, scalar or one
    /// value per Monte-Carlo sample) and a particle number concentration
    /// `cn` in cm⁻³ of exhaled air.
    Aerosol { diameter: Vectorised, cn: f64 },
    /// A weighted mixture of expiratory activities, e.g. speaking one third
    /// of the time and breathing the rest.
    Multiple {
        expirations: Vec<Expiration>,
        weights: Vec<f64>,
    },
}

impl Expiration {
    /// Quiet nose breathing.
    #[must_use]
    pub fn breathing() -> Self {
        Expiration::Aerosol {
            diameter: 1.38.into(),
            cn: 0.06,
        }
    }

    /// Normal speech.
    #[must_use]
    pub fn speaking() -> Self {
        Expiration::Aerosol {
            diameter: 5.84.into(),
            cn: 0.2,
        }
    }

    /// Loud speech or shouting.
    #[must_use]
    pub fn shouting() -> Self {
        Expiration::Aerosol {
            diameter: 10.0.into(),
            cn: 0.54,
        }
    }

    /// A weighted mixture of expirations. The children must all have scalar
    /// diameters: a sampled-diameter axis cannot be averaged against
    /// per-activity weights without losing the per-bin semantics.
    pub fn multiple(
        expirations: Vec<Expiration>,
        weights: Vec<f64>,
    ) -> Result<Expiration, ModelError> {
        if expirations.len() != weights.len() {
            return Err(ModelError::Configuration(format!(
                "a mixed expiration needs one weight per activity (got {} activities and {} \
                 weights)",
                expirations.len(),
                weights.len()
            )));
        }
        if expirations.is_empty() {
            return Err(ModelError::Configuration(
                "a mixed expiration needs at least one activity".to_string(),
            ));
        }
        for e in &expirations {
            match e {
                Expiration::Aerosol { diameter, .. } if !diameter.is_scalar() => {
                    return Err(ModelError::Vectorisation(
                        "the diameters in a mixed expiration must all be scalars".to_string(),
                    ));
                }
                Expiration::Multiple { .. } => {
                    return Err(ModelError::Configuration(
                        "mixed expirations cannot be nested".to_string(),
                    ));
                }
                Expiration::Aerosol { .. } => {}
            }
        }
        Ok(Expiration::Multiple {
            expirations,
            weights,
        })
    }

    /// The droplet diameter, when this profile models a single mode.
    #[must_use]
    pub fn diameter(&self) -> Option<&Vectorised> {
        match self {
            Expiration::Aerosol { diameter, .. } => Some(diameter),
            Expiration::Multiple { .. } => None,
        }
    }

    /// Total volume of aerosols expired per volume of exhaled air, in
    /// mL/cm³, after filtration by the emitter's mask.
    #[must_use]
    pub fn aerosols(&self, mask: &Mask) -> Vectorised {
        match self {
            Expiration::Aerosol { diameter, cn } => {
                // Droplet volume in µm³; 1 µm³ = 1e-12 mL per cm³ of air.
                let volume = diameter.map(|d| PI / 6.0 * d.powi(3));
                let retained = 1.0 - mask.exhale_efficiency(diameter);
                volume * retained * *cn * 1e-12
            }
            Expiration::Multiple {
                expirations,
                weights,
            } => {
                let total: f64 = weights.iter().sum();
                let mut acc = Vectorised::from(0.0);
                for (e, w) in expirations.iter().zip(weights) {
                    acc = acc + e.aerosols(mask) * (*w / total);
                }
                acc
            }
        }
    }

    /// Gravitational settling velocity in m/s, Stokes-scaled from the
    /// reference droplet. Mixtures settle at the reference velocity.
    #[must_use]
    pub fn settling_velocity(&self, evaporation_factor: f64) -> Vectorised {
        match self.diameter() {
            None => REFERENCE_SETTLING_VELOCITY.into(),
            Some(d) => d.map(|d| {
                REFERENCE_SETTLING_VELOCITY
                    * (d * evaporation_factor / REFERENCE_DIAMETER).powi(2)
            }),
        }
    }

    /// Fraction of inhaled virions deposited in the respiratory tract
    /// (Hinds-style fit on the evaporated diameter).
    #[must_use]
    pub fn fraction_deposited(&self, evaporation_factor: f64) -> Vectorised {
        match self.diameter() {
            None => DEFAULT_FRACTION_DEPOSITED.into(),
            Some(d) => d.map(|d| {
                let d = d * evaporation_factor;
                let inhalable = 1.0 - 0.5 * (1.0 / (1.0 + 0.00076 * d.powf(2.8)));
                inhalable
                    * (0.0587
                        + 0.911 / (1.0 + (4.77 + 1.485 * d.ln()).exp())
                        + 0.943 / (1.0 + (0.508 - 2.58 * d.ln()).exp()))
            }),
        }
    }
}
