//! Convenience wrappers around methods from the approx crate, for working
//! with floating point precision in the engine and its tests.

use approx::AbsDiffEq;

/// Targeted accuracy instantiated over `f64`
pub const ACC: f64 = 10e-11;

/// Absolute tolerance used when merging state-change times coming from
/// different model components (hours).
pub const TIME_ACC: f64 = 1e-9;

/// Compares if two floats are close via `approx::abs_diff_eq` using a maximum
/// absolute difference (epsilon) of `acc`.
#[must_use]
pub fn almost_eq(a: f64, b: f64, acc: f64) -> bool {
    if a.is_infinite() && b.is_infinite() {
        return a == b;
    }
    a.abs_diff_eq(&b, acc)
}

/// Sorts and deduplicates a set of times, treating values closer than
/// [`TIME_ACC`] as the same instant. Used to merge boundary times collected
/// from several intervals and piecewise functions.
#[must_use]
pub fn sorted_unique_times(mut times: Vec<f64>) -> Vec<f64> {
    times.sort_by(|a, b| a.partial_cmp(b).unwrap());
    times.dedup_by(|a, b| almost_eq(*a, *b, TIME_ACC));
    times
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_almost_eq;

    #[test]
    fn almost_eq_within_tolerance() {
        assert!(almost_eq(1.0, 1.0 + 0.5e-11, ACC));
    }

    #[test]
    fn almost_eq_outside_tolerance() {
        assert!(!almost_eq(1.0, 1.0 + 2e-10, ACC));
    }

    #[test]
    fn almost_eq_infinities() {
        assert!(almost_eq(f64::INFINITY, f64::INFINITY, ACC));
        assert!(!almost_eq(f64::INFINITY, f64::NEG_INFINITY, ACC));
    }

    #[test]
    fn sorted_unique_times_merges_duplicates() {
        let times = sorted_unique_times(vec![4.0, 0.0, 24.0, 4.0 + 1e-12, 9.0]);
        assert_eq!(times, vec![0.0, 4.0, 9.0, 24.0]);
    }

    #[test]
    fn assert_almost_eq_macro_passes() {
        assert_almost_eq!(3.14159265, 3.14159264, 1e-7);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn assert_almost_eq_macro_panics() {
        assert_almost_eq!(1.0, 1.001, 1e-4);
    }
}
