//! The enclosed space in which transmission is modeled.

use crate::error::ModelError;
use crate::piecewise::PiecewiseConstant;
use crate::vectorised::Vectorised;
use serde::{Deserialize, Serialize};

/// A room, created once per scenario and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    /// Volume in m³.
    pub volume: Vectorised,
    /// Inside air temperature over the day, in Kelvin.
    pub inside_temp: PiecewiseConstant,
    /// Relative humidity as a fraction in [0, 1].
    pub humidity: Vectorised,
}

impl Room {
    pub fn new(
        volume: impl Into<Vectorised>,
        inside_temp: PiecewiseConstant,
        humidity: impl Into<Vectorised>,
    ) -> Result<Self, ModelError> {
        let volume = volume.into();
        let humidity = humidity.into();
        if volume.min_value() <= 0.0 {
            return Err(ModelError::Configuration(
                "the room volume must be positive".to_string(),
            ));
        }
        if humidity.min_value() < 0.0 || humidity.to_vec().iter().any(|&h| h > 1.0) {
            return Err(ModelError::Configuration(
                "the relative humidity must be a fraction between 0 and 1".to_string(),
            ));
        }
        Ok(Room {
            volume,
            inside_temp,
            humidity,
        })
    }

    /// A room at 20 °C and 50% relative humidity.
    pub fn with_volume(volume: impl Into<Vectorised>) -> Result<Self, ModelError> {
        Room::new(volume, PiecewiseConstant::constant(293.15), 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_room_conditions() {
        let room = Room::with_volume(75.0).unwrap();
        assert_eq!(room.inside_temp.value(12.0), Vectorised::Scalar(293.15));
        assert_eq!(room.humidity, Vectorised::Scalar(0.5));
    }

    #[test]
    fn non_positive_volume_is_rejected() {
        assert!(Room::with_volume(0.0).is_err());
        assert!(Room::with_volume(-10.0).is_err());
        assert!(Room::with_volume(vec![50.0, -1.0]).is_err());
    }

    #[test]
    fn humidity_outside_unit_interval_is_rejected() {
        assert!(Room::new(50.0, PiecewiseConstant::constant(293.0), 1.5).is_err());
        assert!(Room::new(50.0, PiecewiseConstant::constant(293.0), -0.1).is_err());
    }
}
