//! Monte-Carlo sampling of model parameters.
//!
//! Any physical parameter of the model tree can be a [`Vectorised`] array of
//! samples instead of a scalar; this module provides the priors those
//! samples are drawn from and the summary statistics the report-rendering
//! collaborator consumes. Draws are deterministic given the caller's seeded
//! RNG, keeping whole evaluations reproducible.

use crate::error::ModelError;
use crate::vectorised::Vectorised;
use rand::Rng;
use rand_distr::Distribution;
use serde::{Deserialize, Serialize};

/// A prior distribution for a physical parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Prior {
    Normal { mean: f64, std_dev: f64 },
    /// Log-normal, parameterized by the mean and standard deviation of the
    /// underlying normal.
    LogNormal { mean_log: f64, std_dev_log: f64 },
    Uniform { low: f64, high: f64 },
}

impl Prior {
    /// Draws `size` independent samples.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        size: usize,
        rng: &mut R,
    ) -> Result<Vectorised, ModelError> {
        if size == 0 {
            return Err(ModelError::Configuration(
                "the Monte-Carlo sample count must be at least 1".to_string(),
            ));
        }
        let samples = match self {
            Prior::Normal { mean, std_dev } => {
                let dist = rand_distr::Normal::new(*mean, *std_dev).map_err(|e| {
                    ModelError::Configuration(format!("invalid normal prior: {e}"))
                })?;
                (0..size).map(|_| dist.sample(rng)).collect()
            }
            Prior::LogNormal {
                mean_log,
                std_dev_log,
            } => {
                let dist = rand_distr::LogNormal::new(*mean_log, *std_dev_log).map_err(|e| {
                    ModelError::Configuration(format!("invalid log-normal prior: {e}"))
                })?;
                (0..size).map(|_| dist.sample(rng)).collect()
            }
            Prior::Uniform { low, high } => {
                if low >= high {
                    return Err(ModelError::Configuration(format!(
                        "invalid uniform prior: low bound {low} is not below high bound {high}"
                    )));
                }
                (0..size).map(|_| rng.random_range(*low..*high)).collect()
            }
        };
        Ok(Vectorised::Samples(samples))
    }
}

/// A parameter that is either fixed or drawn from a prior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Parameter {
    Fixed(f64),
    Sampled(Prior),
}

impl Parameter {
    /// Resolves the parameter into a model value: fixed parameters stay
    /// scalar, sampled ones are drawn `size` times.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        size: usize,
        rng: &mut R,
    ) -> Result<Vectorised, ModelError> {
        match self {
            Parameter::Fixed(value) => Ok(Vectorised::Scalar(*value)),
            Parameter::Sampled(prior) => prior.sample(size, rng),
        }
    }
}

/// The `q`-th percentile (in [0, 100]) of the sample lanes, with linear
/// interpolation between order statistics.
#[must_use]
pub fn percentile(value: &Vectorised, q: f64) -> f64 {
    let mut lanes = value.to_vec();
    lanes.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let n = lanes.len();
    if n == 0 {
        return f64::NAN;
    }
    if n == 1 {
        return lanes[0];
    }
    let rank = (q / 100.0).clamp(0.0, 1.0) * (n - 1) as f64;
    let below = rank.floor() as usize;
    let above = rank.ceil() as usize;
    let weight = rank - below as f64;
    lanes[below] * (1.0 - weight) + lanes[above] * weight
}

/// Summary statistics of a Monte-Carlo output, for report rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub mean: f64,
    pub median: f64,
    pub percentile_05: f64,
    pub percentile_25: f64,
    pub percentile_75: f64,
    pub percentile_95: f64,
}

/// Summarizes an output distribution.
#[must_use]
pub fn summarize(value: &Vectorised) -> SummaryStats {
    SummaryStats {
        mean: value.mean(),
        median: percentile(value, 50.0),
        percentile_05: percentile(value, 5.0),
        percentile_25: percentile(value, 25.0),
        percentile_75: percentile(value, 75.0),
        percentile_95: percentile(value, 95.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_almost_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn sampling_is_deterministic_given_the_seed() {
        let prior = Prior::LogNormal {
            mean_log: 9.0,
            std_dev_log: 1.2,
        };
        let a = prior.sample(64, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = prior.sample(64, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
        let c = prior.sample(64, &mut StdRng::seed_from_u64(88)).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn normal_samples_concentrate_around_the_mean() {
        let prior = Prior::Normal {
            mean: 10.0,
            std_dev: 0.5,
        };
        let samples = prior
            .sample(10_000, &mut StdRng::seed_from_u64(1))
            .unwrap();
        assert_almost_eq!(samples.mean(), 10.0, 0.05);
    }

    #[test]
    fn uniform_samples_stay_in_bounds() {
        let prior = Prior::Uniform {
            low: 2.0,
            high: 3.0,
        };
        let samples = prior.sample(1_000, &mut StdRng::seed_from_u64(7)).unwrap();
        assert!(samples.to_vec().iter().all(|&x| (2.0..3.0).contains(&x)));
    }

    #[test]
    fn invalid_priors_are_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(Prior::Uniform {
            low: 3.0,
            high: 2.0
        }
        .sample(10, &mut rng)
        .is_err());
        assert!(Prior::Normal {
            mean: 0.0,
            std_dev: -1.0
        }
        .sample(10, &mut rng)
        .is_err());
        assert!(Prior::Normal {
            mean: 0.0,
            std_dev: 1.0
        }
        .sample(0, &mut rng)
        .is_err());
    }

    #[test]
    fn fixed_parameters_stay_scalar() {
        let mut rng = StdRng::seed_from_u64(0);
        let value = Parameter::Fixed(50.0).generate(1_000, &mut rng).unwrap();
        assert_eq!(value, Vectorised::Scalar(50.0));
    }

    #[test]
    fn percentiles_interpolate_linearly() {
        let value = Vectorised::from(vec![4.0, 1.0, 3.0, 2.0]);
        assert_eq!(percentile(&value, 0.0), 1.0);
        assert_eq!(percentile(&value, 100.0), 4.0);
        assert_eq!(percentile(&value, 50.0), 2.5);
        assert_eq!(percentile(&value, 25.0), 1.75);
    }

    #[test]
    fn summary_of_a_scalar_is_the_scalar() {
        let stats = summarize(&Vectorised::Scalar(7.0));
        assert_eq!(stats.mean, 7.0);
        assert_eq!(stats.median, 7.0);
        assert_eq!(stats.percentile_95, 7.0);
    }
}
