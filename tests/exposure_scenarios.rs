//! End-to-end scenarios exercising the whole pipeline: room + ventilation +
//! emission → concentration → dose → probability → expected cases.

use airisk::prelude::*;
use assert_approx_eq::assert_approx_eq;

fn relative_close(got: f64, expected: f64, rtol: f64) {
    assert!(
        (got - expected).abs() <= rtol * expected.abs(),
        "got {got}, expected {expected} (rtol {rtol})"
    );
}

/// A superspreading-event room: known per-person emission rate, constant
/// mechanical ventilation.
fn emitting_concentration() -> ConcentrationModel {
    ConcentrationModel::new(
        Room::new(25.0, PiecewiseConstant::constant(293.0), 0.5).unwrap(),
        Ventilation::AirChange {
            active: Interval::all_day(),
            air_exch: 5.0.into(),
        },
        Infected::Emitting(EmittingPopulation {
            number: 1,
            presence: Interval::specific(&[(0.0, 1.0), (1.01, 1.02), (12.0, 24.0)]).unwrap(),
            mask: Mask::no_mask(),
            activity: Activity::seated(),
            virus: Virus::sars_cov_2(),
            known_individual_emission_rate: 970.0 * 50.0,
            host_immunity: 0.0.into(),
        }),
        DEFAULT_EVAPORATION_FACTOR,
    )
    .unwrap()
}

fn standing_type_i(number: u32, presence: Interval) -> Population {
    Population {
        number,
        presence,
        mask: Mask::type_i(),
        activity: Activity::standing(),
        host_immunity: 0.0.into(),
    }
}

// Expected deposited exposures computed with a trapezoidal reference
// integration using a mesh of 10'000 points per exposed presence interval.
#[test]
fn deposited_exposure_integral_accuracy() {
    for (interval, expected) in [
        ((0.0, 1.0), 42.63222033436878),
        ((1.0, 1.01), 0.485377549596179),
        ((1.01, 1.02), 0.47058239520823814),
        ((12.0, 12.01), 0.01622776617499709),
        ((12.0, 24.0), 595.1115223695439),
        ((0.0, 24.0), 645.8401125684933),
    ] {
        let exposed = standing_type_i(10, Interval::specific(&[interval]).unwrap());
        let model = ExposureModel::new(emitting_concentration(), exposed, None).unwrap();
        relative_close(model.deposited_exposure().mean(), expected, 1e-6);
    }
}

#[test]
fn total_probability_rule_with_geographic_prior() {
    let exposed = standing_type_i(10, Interval::periodic(120.0, 60.0).unwrap());
    let model = ExposureModel::new(
        emitting_concentration(),
        exposed,
        Some(Cases::new(100_000.0, 68.0, 5.0)),
    )
    .unwrap();

    // Piecewise-exact references for this exact scenario.
    relative_close(model.deposited_exposure().mean(), 336.40707761309966, 1e-10);
    relative_close(model.infection_probability().mean(), 99.05674834104138, 1e-10);
    relative_close(model.expected_new_cases().mean(), 9.90567483410414, 1e-10);
    relative_close(
        model.total_probability_rule().unwrap().mean(),
        41.51920686062445,
        1e-10,
    );
}

#[test]
fn probability_of_meeting_an_infectious_individual() {
    let virus = Virus::sars_cov_2();
    let cases = Cases::new(100_000.0, 68.0, 5.0);
    let prob = cases.probability_meet_infected_person(&virus, 1, 11).mean();
    relative_close(prob, 0.321509274, 0.05);
}

/// An office day: one infected occupant alternating talking and breathing,
/// windows opened during breaks on top of a constant mechanical trickle.
fn office_exposure() -> ExposureModel {
    let work_hours = Interval::specific(&[(0.0, 1.5), (2.0, 3.5), (4.5, 6.0), (6.5, 8.0)]).unwrap();
    let breaks = Interval::specific(&[(1.5, 2.0), (3.5, 4.5), (6.0, 6.5)]).unwrap();
    let concentration = ConcentrationModel::new(
        Room::new(160.0, PiecewiseConstant::constant(295.0), 0.3).unwrap(),
        Ventilation::Multiple(vec![
            Ventilation::sliding_window(
                breaks,
                PiecewiseConstant::constant(291.0),
                1.6,
                0.6,
            )
            .unwrap(),
            Ventilation::AirChange {
                active: Interval::all_day(),
                air_exch: 0.25.into(),
            },
        ]),
        Infected::Population(InfectedPopulation {
            number: 1,
            presence: work_hours.clone(),
            mask: Mask::no_mask(),
            activity: Activity::seated(),
            virus: Virus::sars_cov_2(),
            expiration: Expiration::multiple(
                vec![Expiration::speaking(), Expiration::breathing()],
                vec![1.0, 2.0],
            )
            .unwrap(),
            host_immunity: 0.0.into(),
        }),
        DEFAULT_EVAPORATION_FACTOR,
    )
    .unwrap();
    let exposed = Population {
        number: 18,
        presence: work_hours,
        mask: Mask::no_mask(),
        activity: Activity::seated(),
        host_immunity: 0.0.into(),
    };
    ExposureModel::new(concentration, exposed, None).unwrap()
}

#[test]
fn office_scenario_reference_values() {
    let model = office_exposure();
    let concentration = &model.concentration_model;

    // The open windows dominate the trickle ventilation during breaks.
    let room = &concentration.room;
    let break_rate = concentration.ventilation.air_exchange(room, 1.7).mean();
    relative_close(break_rate, 2.0066043204800175 + 0.25, 1e-10);
    let work_rate = concentration.ventilation.air_exchange(room, 1.0).mean();
    relative_close(work_rate, 0.25, 1e-12);

    assert_approx_eq!(concentration.concentration(1.0).mean(), 6.771638881224045, 1e-8);
    assert_approx_eq!(concentration.concentration(8.0).mean(), 8.535989362397746, 1e-8);

    relative_close(model.deposited_exposure().mean(), 10.379343338975323, 1e-8);
    relative_close(
        model.infection_probability().mean(),
        13.401548481603221,
        1e-8,
    );
    relative_close(model.expected_new_cases().mean(), 2.4122787266885797, 1e-8);
}

#[test]
fn office_concentration_is_continuous_across_window_events() {
    let model = office_exposure();
    let concentration = &model.concentration_model;
    let eps = 1e-9;
    for boundary in [1.5, 2.0, 3.5, 4.5, 6.0, 6.5, 8.0] {
        let left = concentration.concentration(boundary - eps).mean();
        let at = concentration.concentration(boundary).mean();
        let right = concentration.concentration(boundary + eps).mean();
        let scale = at.abs().max(1e-30);
        assert!(((left - at) / scale).abs() < 1e-6, "left limit at {boundary}");
        assert!(((right - at) / scale).abs() < 1e-6, "right limit at {boundary}");
    }
}

#[test]
fn monte_carlo_lanes_flow_through_the_pipeline() {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    let mut rng = StdRng::seed_from_u64(2023);
    let viral_load = Prior::LogNormal {
        mean_log: 9.0 * std::f64::consts::LN_10,
        std_dev_log: 1.2,
    }
    .sample(500, &mut rng)
    .unwrap();

    let build = |viral_load: Vectorised| {
        let mut virus = Virus::sars_cov_2();
        virus.viral_load_in_sputum = viral_load;
        let concentration = ConcentrationModel::new(
            Room::with_volume(100.0).unwrap(),
            Ventilation::AirChange {
                active: Interval::all_day(),
                air_exch: 0.25.into(),
            },
            Infected::Population(InfectedPopulation {
                number: 1,
                presence: Interval::specific(&[(0.0, 2.0)]).unwrap(),
                mask: Mask::no_mask(),
                activity: Activity::seated(),
                virus,
                expiration: Expiration::breathing(),
                host_immunity: 0.0.into(),
            }),
            DEFAULT_EVAPORATION_FACTOR,
        )
        .unwrap();
        let exposed = Population {
            number: 14,
            presence: Interval::specific(&[(0.0, 2.0)]).unwrap(),
            mask: Mask::no_mask(),
            activity: Activity::seated(),
            host_immunity: 0.0.into(),
        };
        ExposureModel::new(concentration, exposed, None).unwrap()
    };

    let model = build(viral_load.clone());
    let probability = model.infection_probability();
    assert_eq!(probability.sample_size(), Some(500));

    let stats = summarize(&probability);
    assert!(stats.percentile_05 <= stats.median && stats.median <= stats.percentile_95);
    assert!((0.0..=100.0).contains(&stats.mean));

    // Same seed, same outputs: the engine is deterministic given its draws.
    let mut rng = StdRng::seed_from_u64(2023);
    let again = Prior::LogNormal {
        mean_log: 9.0 * std::f64::consts::LN_10,
        std_dev_log: 1.2,
    }
    .sample(500, &mut rng)
    .unwrap();
    assert_eq!(build(again).infection_probability(), probability);
}

#[test]
fn replacing_one_field_builds_a_variant_scenario() {
    let base = office_exposure();
    let concentration = ConcentrationModel {
        infected: base.concentration_model.infected.with_number(3),
        ..base.concentration_model.clone()
    };
    let variant = ExposureModel::new(concentration, base.exposed.clone(), None).unwrap();
    // Emission scales linearly with the infected headcount; the dose-response
    // saturates, so probability grows but sublinearly.
    relative_close(
        variant.deposited_exposure().mean(),
        3.0 * base.deposited_exposure().mean(),
        1e-10,
    );
    assert!(variant.infection_probability().mean() > base.infection_probability().mean());
}
