use airisk::prelude::*;
use criterion::{criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::hint::black_box;

fn scenario(viral_load: Vectorised) -> ExposureModel {
    let work_hours =
        Interval::specific(&[(0.0, 1.5), (2.0, 3.5), (4.5, 6.0), (6.5, 8.0)]).unwrap();
    let breaks = Interval::specific(&[(1.5, 2.0), (3.5, 4.5), (6.0, 6.5)]).unwrap();
    let mut virus = Virus::sars_cov_2();
    virus.viral_load_in_sputum = viral_load;
    let concentration = ConcentrationModel::new(
        Room::new(160.0, PiecewiseConstant::constant(295.0), 0.3).unwrap(),
        Ventilation::Multiple(vec![
            Ventilation::sliding_window(breaks, PiecewiseConstant::constant(291.0), 1.6, 0.6)
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
            virus,
            expiration: Expiration::speaking(),
            host_immunity: 0.0.into(),
        }),
        DEFAULT_EVAPORATION_FACTOR,
    )
    .unwrap();
    let exposed = Population {
        number: 18,
        presence: work_hours,
        mask: Mask::type_i(),
        activity: Activity::seated(),
        host_immunity: 0.0.into(),
    };
    ExposureModel::new(concentration, exposed, None).unwrap()
}

fn bench_exposure(c: &mut Criterion) {
    let scalar = scenario(1e9.into());
    c.bench_function("deposited_exposure_scalar", |b| {
        b.iter(|| black_box(&scalar).deposited_exposure())
    });

    let samples = Prior::LogNormal {
        mean_log: 9.0 * std::f64::consts::LN_10,
        std_dev_log: 1.2,
    }
    .sample(10_000, &mut StdRng::seed_from_u64(1))
    .unwrap();
    let vectorised = scenario(samples);
    c.bench_function("deposited_exposure_10k_samples", |b| {
        b.iter(|| black_box(&vectorised).deposited_exposure())
    });

    c.bench_function("infection_probability_10k_samples", |b| {
        b.iter(|| black_box(&vectorised).infection_probability())
    });
}

criterion_group!(benches, bench_exposure);
criterion_main!(benches);
