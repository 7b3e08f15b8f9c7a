//! Scalar types the elimination routines operate on.

use std::fmt::{Debug, Display};

use num_traits::{Float, NumCast};
use rand::distributions::uniform::SampleUniform;

/// A real floating-point scalar.
///
/// Pivots and scale factors are always computed in the matrix's own scalar
/// type. Implemented for `f32` and `f64`.
pub trait Real:
    Float + From<f32> + SampleUniform + Send + Sync + Debug + Display + 'static
{
    /// Converts a single-precision literal into this type.
    #[must_use]
    fn lit(value: f32) -> Self {
        <Self as From<f32>>::from(value)
    }

    /// Converts a double-precision constant, rounding to nearest for `f32`.
    #[must_use]
    fn cast(value: f64) -> Self {
        <Self as NumCast>::from(value).unwrap_or_else(Self::nan)
    }

    /// Widens this value for error reports.
    #[must_use]
    fn widen(self) -> f64 {
        self.to_f64().unwrap_or(f64::NAN)
    }
}

impl<T> Real for T where
    T: Float + From<f32> + SampleUniform + Send + Sync + Debug + Display + 'static
{
}
