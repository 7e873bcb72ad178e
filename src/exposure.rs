//! The exposure engine: integrates the concentration an exposed occupant
//! breathes over their presence, turns it into a deposited dose and an
//! infection probability, and combines both with the geographic prior into
//! expected new cases.

use crate::cases::Cases;
use crate::concentration::ConcentrationModel;
use crate::error::ModelError;
use crate::population::{Infected, Population};
use crate::vectorised::Vectorised;
use log::debug;
use serde::{Deserialize, Serialize};
use std::f64::consts::LN_2;

/// Error raised when the droplet-diameter axis is combined with a second
/// axis of variation. The diameter-weighted integral is performed per
/// diameter bin and cannot be commingled with an independent broadcast axis.
const DIAMETER_AXIS_ERROR: &str = "If the diameter is an array, none of the ventilation \
                                   parameters or virus decay constant can be arrays at the same \
                                   time.";

/// A complete exposure scenario: the concentration model, the exposed
/// population breathing it, and the geographic prior on encountering an
/// infectious individual.
///
/// Composite models are immutable; variant scenarios are built by cloning
/// and replacing a field, never by in-place mutation. The short-range
/// exposure model is an external collaborator: callers holding one add its
/// dose contribution to [`ExposureModel::deposited_exposure`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposureModel {
    pub concentration_model: ConcentrationModel,
    pub exposed: Population,
    /// Geographic incidence prior, when known.
    pub geographical_data: Option<Cases>,
    /// Number of identical exposure days the scenario repeats for.
    pub repeats: u32,
}

impl ExposureModel {
    pub fn new(
        concentration_model: ConcentrationModel,
        exposed: Population,
        geographical_data: Option<Cases>,
    ) -> Result<Self, ModelError> {
        let model = ExposureModel {
            concentration_model,
            exposed,
            geographical_data,
            repeats: 1,
        };
        model.check_diameter_axis()?;
        model.check_sample_sizes()?;
        Ok(model)
    }

    // When the emission diameter is sampled, the concentration is computed
    // per diameter bin and collapsed by averaging before any other
    // array-valued quantity touches it. The removal rate must therefore be
    // scalar apart from its settling term: the decay constant and every
    // ventilation parameter (or anything feeding the air-exchange rate,
    // e.g. the room volume under a window) must not be arrays.
    fn check_diameter_axis(&self) -> Result<(), ModelError> {
        let cm = &self.concentration_model;
        let diameter_is_array = cm
            .infected
            .particle_diameter()
            .is_some_and(|d| !d.is_scalar());
        if !diameter_is_array {
            return Ok(());
        }
        for time in cm.state_change_times() {
            let decay = cm
                .infected
                .virus()
                .decay_constant(&cm.room.humidity, &cm.room.inside_temp.value(time));
            let diameter_independent = decay + cm.ventilation.air_exchange(&cm.room, time);
            if !diameter_independent.is_scalar() {
                return Err(ModelError::Vectorisation(DIAMETER_AXIS_ERROR.to_string()));
            }
        }
        Ok(())
    }

    // Apart from the diameter axis, every sampled quantity in the tree must
    // share one sample count for the elementwise formulas to be defined.
    fn check_sample_sizes(&self) -> Result<(), ModelError> {
        let cm = &self.concentration_model;
        let mut sized: Vec<(&str, usize)> = Vec::new();
        let mut collect = |name: &'static str, value: &Vectorised| {
            if let Some(n) = value.sample_size() {
                sized.push((name, n));
            }
        };

        collect("room volume", &cm.room.volume);
        collect("room humidity", &cm.room.humidity);
        for value in cm.room.inside_temp.values() {
            collect("room inside temperature", value);
        }
        let virus = cm.infected.virus();
        collect("viral load", &virus.viral_load_in_sputum);
        collect("infectious dose", &virus.infectious_dose);
        collect("viable-to-RNA ratio", &virus.viable_to_rna_ratio);
        if let Infected::Population(p) = &cm.infected {
            collect("infected mask efficiency", &p.mask.eta_inhale);
            collect("infected inhalation rate", &p.activity.inhalation_rate);
            collect("infected exhalation rate", &p.activity.exhalation_rate);
            collect("infected host immunity", &p.host_immunity);
        }
        collect("exposed mask efficiency", &self.exposed.mask.eta_inhale);
        collect("exposed inhalation rate", &self.exposed.activity.inhalation_rate);
        collect("exposed host immunity", &self.exposed.host_immunity);
        if let Some(cases) = &self.geographical_data {
            collect("geographic population", &cases.geographic_population);
            collect("geographic cases", &cases.geographic_cases);
        }
        for time in cm.state_change_times() {
            // Covers every ventilation parameter at once.
            collect(
                "ventilation air-exchange rate",
                &cm.ventilation.air_exchange(&cm.room, time),
            );
        }

        if let Some(&(first_name, first_size)) = sized.first() {
            for &(name, size) in &sized[1..] {
                if size != first_size {
                    return Err(ModelError::Vectorisation(format!(
                        "inconsistent sample counts across the model: {first_name} has \
                         {first_size} samples but {name} has {size}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// The state-change times of the exposed population's presence.
    fn exposed_presence_boundaries(&self) -> Vec<(f64, f64)> {
        self.exposed.presence.boundaries()
    }

    /// Dose deposited in one exposed person's respiratory tract over the
    /// scenario, in virions.
    ///
    /// Per presence interval: integrated normed concentration × ejected
    /// aerosol volume × deposited fraction — averaged over the diameter
    /// axis when the diameter is sampled (the Monte-Carlo integral over
    /// droplet sizes) — scaled back by the emission normalization and the
    /// exposed person's inhalation rate and mask.
    #[must_use]
    pub fn deposited_exposure(&self) -> Vectorised {
        let cm = &self.concentration_model;
        let times = cm.state_change_times();
        let boundary_values = cm.normed_boundary_concentrations(&times);

        let infected = &cm.infected;
        let aerosols = infected.aerosols();
        let fraction_deposited = infected.fraction_deposited(cm.evaporation_factor);
        let diameter_is_array = infected
            .particle_diameter()
            .is_some_and(|d| !d.is_scalar());

        let mut dose = Vectorised::from(0.0);
        for (start, stop) in self.exposed_presence_boundaries() {
            let normed =
                cm.normed_integrated_with_table(&times, &boundary_values, start, stop);
            let mut contribution = normed * &aerosols * &fraction_deposited;
            if diameter_is_array {
                // Collapse the diameter axis first; diameter-dependent and
                // sample-axis quantities must not be multiplied lane-wise.
                contribution = contribution.mean().into();
            }
            dose = dose + contribution;
        }
        debug!(
            "deposited exposure over {} presence intervals",
            self.exposed_presence_boundaries().len()
        );
        dose * infected.emission_rate_per_aerosol_per_person()
            * f64::from(infected.number())
            * &self.exposed.activity.inhalation_rate
            * (1.0 - self.exposed.mask.inhale_efficiency())
            * f64::from(self.repeats)
    }

    /// Probability (in percent) that one exposed person becomes infected.
    ///
    /// Exponential dose-response on the deposited dose, scaled by host
    /// immunity; the virus's infectious dose is an ID50, so the rate
    /// constant carries a ln 2.
    #[must_use]
    pub fn infection_probability(&self) -> Vectorised {
        let virus = self.concentration_model.infected.virus();
        let effective_dose =
            self.deposited_exposure() * (1.0 - &self.exposed.host_immunity);
        // ID50 scaled by the variant's transmissibility; dividing by ln 2
        // turns it into the exponential law's characteristic dose.
        let characteristic_dose =
            &virus.infectious_dose * virus.transmissibility_factor / LN_2;
        (1.0 - (-(effective_dose / characteristic_dose)).exp()) * 100.0
    }

    /// Expected number of new cases among the exposed population.
    #[must_use]
    pub fn expected_new_cases(&self) -> Vectorised {
        self.infection_probability() / 100.0 * f64::from(self.exposed.number)
    }

    /// Probability (in percent) that at least one exposed person becomes
    /// infected, weighting each possible number of infectious occupants by
    /// the geographic prior (total probability rule).
    ///
    /// Contributions beyond ten simultaneous infectious occupants are
    /// negligible and dropped.
    pub fn total_probability_rule(&self) -> Result<Vectorised, ModelError> {
        let Some(cases) = &self.geographical_data else {
            return Err(ModelError::Configuration(
                "the total probability rule needs geographic incidence data".to_string(),
            ));
        };
        if cases.geographic_population.min_value() == 0.0 {
            return Ok(0.0.into());
        }

        let virus = self.concentration_model.infected.virus().clone();
        let total_people = self.concentration_model.infected.number() + self.exposed.number;
        let max_num_infected = total_people.min(10);

        let mut sum_probability = Vectorised::from(0.0);
        for num_infected in 1..=max_num_infected {
            // Same scenario with the infected headcount replaced.
            let variant = ExposureModel {
                concentration_model: ConcentrationModel {
                    infected: self
                        .concentration_model
                        .infected
                        .with_number(num_infected),
                    ..self.concentration_model.clone()
                },
                ..self.clone()
            };
            let prob_individual = variant.infection_probability().mean() / 100.0;
            let others = total_people - num_infected;
            let prob_at_least_one =
                1.0 - (1.0 - prob_individual).powi(others as i32);
            sum_probability = sum_probability
                + prob_at_least_one
                    * cases.probability_meet_infected_person(&virus, num_infected, total_people);
        }
        Ok(sum_probability * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::Activity;
    use crate::concentration::DEFAULT_EVAPORATION_FACTOR;
    use crate::expiration::Expiration;
    use crate::interval::Interval;
    use crate::mask::Mask;
    use crate::piecewise::PiecewiseConstant;
    use crate::population::{EmittingPopulation, InfectedPopulation};
    use crate::room::Room;
    use crate::ventilation::Ventilation;
    use crate::virus::Virus;

    fn halftime() -> Interval {
        Interval::periodic(120.0, 60.0).unwrap()
    }

    fn diameter_dependent_concentration(
        room: Room,
        ventilation: Ventilation,
    ) -> ConcentrationModel {
        ConcentrationModel::new(
            room,
            ventilation,
            Infected::Population(InfectedPopulation {
                number: 1,
                presence: halftime(),
                mask: Mask::no_mask(),
                activity: Activity::seated(),
                virus: Virus::sars_cov_2_delta(),
                // A sampled-diameter emission.
                expiration: Expiration::Aerosol {
                    diameter: vec![1.0, 2.0, 5.0].into(),
                    cn: 0.06,
                },
                host_immunity: 0.0.into(),
            }),
            DEFAULT_EVAPORATION_FACTOR,
        )
        .unwrap()
    }

    fn exposed(number: u32) -> Population {
        Population {
            number,
            presence: halftime(),
            mask: Mask::type_i(),
            activity: Activity::standing(),
            host_immunity: 0.0.into(),
        }
    }

    #[test]
    fn diameter_and_ventilation_arrays_conflict() {
        let cm = diameter_dependent_concentration(
            Room::with_volume(50.0).unwrap(),
            Ventilation::AirChange {
                active: Interval::periodic(120.0, 120.0).unwrap(),
                air_exch: vec![0.5, 1.0].into(),
            },
        );
        let err = ExposureModel::new(cm, exposed(10), None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "If the diameter is an array, none of the ventilation parameters or virus decay \
             constant can be arrays at the same time."
        );
    }

    #[test]
    fn diameter_and_room_volume_arrays_conflict() {
        // The volume feeds the air-exchange rate of any flow-based system.
        let cm = diameter_dependent_concentration(
            Room::new(
                vec![50.0, 100.0],
                PiecewiseConstant::constant(293.0),
                0.3,
            )
            .unwrap(),
            Ventilation::HVACMechanical {
                active: Interval::all_day(),
                q_air_mech: 100.0.into(),
            },
        );
        assert!(ExposureModel::new(cm, exposed(10), None).is_err());
    }

    #[test]
    fn diameter_and_humidity_arrays_conflict() {
        // Humidity feeds the decay constant.
        let cm = diameter_dependent_concentration(
            Room::new(50.0, PiecewiseConstant::constant(293.0), vec![0.3, 0.5]).unwrap(),
            Ventilation::HVACMechanical {
                active: Interval::all_day(),
                q_air_mech: 100.0.into(),
            },
        );
        assert!(ExposureModel::new(cm, exposed(10), None).is_err());
    }

    #[test]
    fn diameter_and_window_parameter_arrays_conflict() {
        let cm = diameter_dependent_concentration(
            Room::with_volume(50.0).unwrap(),
            Ventilation::sliding_window(
                Interval::periodic(120.0, 120.0).unwrap(),
                PiecewiseConstant::constant(283.0),
                vec![1.0, 0.5],
                1.0,
            )
            .unwrap(),
        );
        assert!(ExposureModel::new(cm, exposed(10), None).is_err());
    }

    #[test]
    fn scalar_ventilation_with_sampled_diameter_is_fine() {
        let cm = diameter_dependent_concentration(
            Room::with_volume(50.0).unwrap(),
            Ventilation::HVACMechanical {
                active: Interval::all_day(),
                q_air_mech: 100.0.into(),
            },
        );
        let model = ExposureModel::new(cm, exposed(10), None).unwrap();
        // The diameter axis collapses: the dose is scalar here.
        assert!(model.deposited_exposure().is_scalar());
    }

    #[test]
    fn mismatched_sample_counts_are_rejected() {
        let cm = ConcentrationModel::new(
            Room::with_volume(50.0).unwrap(),
            Ventilation::AirChange {
                active: Interval::all_day(),
                air_exch: 0.25.into(),
            },
            Infected::Emitting(EmittingPopulation {
                number: 1,
                presence: halftime(),
                mask: Mask::no_mask(),
                activity: Activity::seated(),
                virus: Virus::sars_cov_2(),
                known_individual_emission_rate: 48500.0,
                host_immunity: 0.0.into(),
            }),
            DEFAULT_EVAPORATION_FACTOR,
        )
        .unwrap();
        let mut population = exposed(10);
        population.mask = Mask::new(vec![0.3, 0.35]);
        population.host_immunity = vec![0.0, 0.5, 1.0].into();
        let err = ExposureModel::new(cm, population, None).unwrap_err();
        assert!(err.to_string().contains("inconsistent sample counts"));
    }

    #[test]
    fn dose_is_monotonic_in_exposure_duration() {
        let cm = ConcentrationModel::new(
            Room::with_volume(100.0).unwrap(),
            Ventilation::AirChange {
                active: Interval::all_day(),
                air_exch: 0.25.into(),
            },
            Infected::Population(InfectedPopulation {
                number: 1,
                presence: Interval::all_day(),
                mask: Mask::no_mask(),
                activity: Activity::seated(),
                virus: Virus::sars_cov_2(),
                expiration: Expiration::speaking(),
                host_immunity: 0.0.into(),
            }),
            DEFAULT_EVAPORATION_FACTOR,
        )
        .unwrap();
        let mut previous = 0.0;
        for hours in [1.0, 2.0, 4.0, 8.0, 16.0] {
            let mut population = exposed(1);
            population.presence = Interval::specific(&[(0.0, hours)]).unwrap();
            let model =
                ExposureModel::new(cm.clone(), population, None).unwrap();
            let dose = model.deposited_exposure().mean();
            assert!(
                dose > previous,
                "dose {dose} did not grow at {hours} h of exposure"
            );
            previous = dose;
        }
    }

    #[test]
    fn full_immunity_means_zero_probability() {
        let cm = ConcentrationModel::new(
            Room::with_volume(100.0).unwrap(),
            Ventilation::AirChange {
                active: Interval::all_day(),
                air_exch: 0.25.into(),
            },
            Infected::Population(InfectedPopulation {
                number: 1,
                presence: halftime(),
                mask: Mask::no_mask(),
                activity: Activity::seated(),
                virus: Virus::sars_cov_2(),
                expiration: Expiration::speaking(),
                host_immunity: 0.0.into(),
            }),
            DEFAULT_EVAPORATION_FACTOR,
        )
        .unwrap();

        let mut fully_immune = exposed(10);
        fully_immune.host_immunity = 1.0.into();
        let model = ExposureModel::new(cm.clone(), fully_immune, None).unwrap();
        assert_eq!(model.infection_probability(), Vectorised::Scalar(0.0));
        assert_eq!(model.expected_new_cases(), Vectorised::Scalar(0.0));

        // Zero immunity recovers the baseline, and the vectorised mix puts
        // both in their lanes.
        let baseline =
            ExposureModel::new(cm.clone(), exposed(10), None).unwrap();
        let baseline_probability = baseline.infection_probability().mean();
        assert!(baseline_probability > 0.0);

        let mut mixed = exposed(10);
        mixed.host_immunity = vec![0.0, 1.0].into();
        let model = ExposureModel::new(cm, mixed, None).unwrap();
        let lanes = model.infection_probability().to_vec();
        assert!((lanes[0] - baseline_probability).abs() < 1e-12);
        assert_eq!(lanes[1], 0.0);
    }

    #[test]
    fn total_probability_rule_needs_cases_data() {
        let cm = diameter_dependent_concentration(
            Room::with_volume(50.0).unwrap(),
            Ventilation::HVACMechanical {
                active: Interval::all_day(),
                q_air_mech: 100.0.into(),
            },
        );
        let model = ExposureModel::new(cm, exposed(10), None).unwrap();
        assert!(model.total_probability_rule().is_err());
    }
}
