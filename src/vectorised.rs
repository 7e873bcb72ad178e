//! `Vectorised`: a physical quantity that is either a single scalar or one
//! value per Monte-Carlo sample.
//!
//! Every formula in the engine is written once, in scalar form, and applied
//! elementwise over sample lanes by broadcasting: a scalar combines with an
//! array by repetition, two arrays combine lane by lane and must have the
//! same length. This is data-parallelism within one call, not task
//! concurrency — the engine itself stays single-threaded and side-effect
//! free.
//!
//! Mismatched array lengths are a programming error (model constructors
//! validate user-supplied sample counts up front) and panic with a
//! descriptive message.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Neg, Sub};

/// A scalar-or-samples value. Serialized untagged so a JSON number or a JSON
/// array both deserialize into the natural variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Vectorised {
    Scalar(f64),
    Samples(Vec<f64>),
}

impl Vectorised {
    #[must_use]
    pub fn is_scalar(&self) -> bool {
        matches!(self, Vectorised::Scalar(_))
    }

    /// The number of sample lanes, or `None` for a scalar.
    #[must_use]
    pub fn sample_size(&self) -> Option<usize> {
        match self {
            Vectorised::Scalar(_) => None,
            Vectorised::Samples(v) => Some(v.len()),
        }
    }

    /// Applies `f` to every lane.
    #[must_use]
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Vectorised {
        match self {
            Vectorised::Scalar(a) => Vectorised::Scalar(f(*a)),
            Vectorised::Samples(v) => Vectorised::Samples(v.iter().map(|&a| f(a)).collect()),
        }
    }

    /// Combines two values lane by lane, broadcasting scalars.
    ///
    /// Panics if both are sample arrays of different lengths.
    #[must_use]
    pub fn zip_with(&self, other: &Vectorised, f: impl Fn(f64, f64) -> f64) -> Vectorised {
        use Vectorised::{Samples, Scalar};
        match (self, other) {
            (Scalar(a), Scalar(b)) => Scalar(f(*a, *b)),
            (Scalar(a), Samples(b)) => Samples(b.iter().map(|&y| f(*a, y)).collect()),
            (Samples(a), Scalar(b)) => Samples(a.iter().map(|&x| f(x, *b)).collect()),
            (Samples(a), Samples(b)) => {
                assert_eq!(
                    a.len(),
                    b.len(),
                    "cannot broadcast together sample arrays of size {} and {}",
                    a.len(),
                    b.len()
                );
                Samples(a.iter().zip(b).map(|(&x, &y)| f(x, y)).collect())
            }
        }
    }

    /// Three-way elementwise combination with scalar broadcasting.
    #[must_use]
    pub fn zip_with3(
        a: &Vectorised,
        b: &Vectorised,
        c: &Vectorised,
        f: impl Fn(f64, f64, f64) -> f64,
    ) -> Vectorised {
        let n = [a, b, c].iter().find_map(|v| v.sample_size());
        match n {
            None => {
                let (x, y, z) = (a.as_scalar(), b.as_scalar(), c.as_scalar());
                Vectorised::Scalar(f(x, y, z))
            }
            Some(n) => Vectorised::Samples(
                (0..n)
                    .map(|i| f(a.lane(i, n), b.lane(i, n), c.lane(i, n)))
                    .collect(),
            ),
        }
    }

    // Lane accessor used by the broadcasting helpers: scalars repeat, arrays
    // must have exactly `n` lanes.
    fn lane(&self, i: usize, n: usize) -> f64 {
        match self {
            Vectorised::Scalar(a) => *a,
            Vectorised::Samples(v) => {
                assert_eq!(
                    v.len(),
                    n,
                    "cannot broadcast together sample arrays of size {} and {}",
                    v.len(),
                    n
                );
                v[i]
            }
        }
    }

    fn as_scalar(&self) -> f64 {
        match self {
            Vectorised::Scalar(a) => *a,
            Vectorised::Samples(_) => unreachable!("scalar accessor used on a sample array"),
        }
    }

    /// Elementwise `e^x`.
    #[must_use]
    pub fn exp(&self) -> Vectorised {
        self.map(f64::exp)
    }

    /// Elementwise square root.
    #[must_use]
    pub fn sqrt(&self) -> Vectorised {
        self.map(f64::sqrt)
    }

    /// Elementwise integer power.
    #[must_use]
    pub fn powi(&self, n: i32) -> Vectorised {
        self.map(|a| a.powi(n))
    }

    /// Elementwise maximum against a scalar floor.
    #[must_use]
    pub fn maximum(&self, floor: f64) -> Vectorised {
        self.map(|a| a.max(floor))
    }

    /// Elementwise minimum against a scalar cap.
    #[must_use]
    pub fn minimum(&self, cap: f64) -> Vectorised {
        self.map(|a| a.min(cap))
    }

    /// The mean over sample lanes; the identity for a scalar.
    #[must_use]
    pub fn mean(&self) -> f64 {
        match self {
            Vectorised::Scalar(a) => *a,
            Vectorised::Samples(v) => {
                if v.is_empty() {
                    f64::NAN
                } else {
                    v.iter().sum::<f64>() / v.len() as f64
                }
            }
        }
    }

    /// The smallest lane value; the identity for a scalar.
    #[must_use]
    pub fn min_value(&self) -> f64 {
        match self {
            Vectorised::Scalar(a) => *a,
            Vectorised::Samples(v) => v.iter().copied().fold(f64::INFINITY, f64::min),
        }
    }

    /// A snapshot of the lanes as a `Vec` (a scalar yields one element).
    #[must_use]
    pub fn to_vec(&self) -> Vec<f64> {
        match self {
            Vectorised::Scalar(a) => vec![*a],
            Vectorised::Samples(v) => v.clone(),
        }
    }
}

impl From<f64> for Vectorised {
    fn from(value: f64) -> Self {
        Vectorised::Scalar(value)
    }
}

impl From<Vec<f64>> for Vectorised {
    fn from(values: Vec<f64>) -> Self {
        Vectorised::Samples(values)
    }
}

macro_rules! impl_vectorised_binop {
    ($trait:ident, $method:ident, $op:tt) => {
        impl $trait<&Vectorised> for &Vectorised {
            type Output = Vectorised;
            fn $method(self, rhs: &Vectorised) -> Vectorised {
                self.zip_with(rhs, |a, b| a $op b)
            }
        }

        impl $trait<Vectorised> for Vectorised {
            type Output = Vectorised;
            fn $method(self, rhs: Vectorised) -> Vectorised {
                (&self).$method(&rhs)
            }
        }

        impl $trait<&Vectorised> for Vectorised {
            type Output = Vectorised;
            fn $method(self, rhs: &Vectorised) -> Vectorised {
                (&self).$method(rhs)
            }
        }

        impl $trait<Vectorised> for &Vectorised {
            type Output = Vectorised;
            fn $method(self, rhs: Vectorised) -> Vectorised {
                self.$method(&rhs)
            }
        }

        impl $trait<f64> for &Vectorised {
            type Output = Vectorised;
            fn $method(self, rhs: f64) -> Vectorised {
                self.map(|a| a $op rhs)
            }
        }

        impl $trait<f64> for Vectorised {
            type Output = Vectorised;
            fn $method(self, rhs: f64) -> Vectorised {
                (&self).$method(rhs)
            }
        }

        impl $trait<&Vectorised> for f64 {
            type Output = Vectorised;
            fn $method(self, rhs: &Vectorised) -> Vectorised {
                rhs.map(|b| self $op b)
            }
        }

        impl $trait<Vectorised> for f64 {
            type Output = Vectorised;
            fn $method(self, rhs: Vectorised) -> Vectorised {
                self.$method(&rhs)
            }
        }
    };
}

impl_vectorised_binop!(Add, add, +);
impl_vectorised_binop!(Sub, sub, -);
impl_vectorised_binop!(Mul, mul, *);
impl_vectorised_binop!(Div, div, /);

impl Neg for &Vectorised {
    type Output = Vectorised;
    fn neg(self) -> Vectorised {
        self.map(|a| -a)
    }
}

impl Neg for Vectorised {
    type Output = Vectorised;
    fn neg(self) -> Vectorised {
        -&self
    }
}
