//! Tolerance-based comparison of a parallel result against the serial
//! reference.

use rayon::prelude::*;

use crate::error::VerificationError;
use crate::matrix::Matrix;
use crate::scalar::Real;

/// Default per-cell tolerance.
pub const DEFAULT_EPSILON: f64 = 0.005;

/// Summary of a successful verification.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Verification {
    /// Number of cells compared.
    pub cells: usize,
    /// Largest absolute difference observed.
    pub max_difference: f64,
}

/// Compares every cell of two matrices within a fixed tolerance.
#[derive(Clone, Copy, Debug)]
pub struct Verifier<T> {
    epsilon: T,
}

impl<T: Real> Default for Verifier<T> {
    fn default() -> Self {
        Self::new(T::cast(DEFAULT_EPSILON))
    }
}

impl<T: Real> Verifier<T> {
    /// Creates a verifier with the given tolerance.
    #[must_use]
    pub fn new(epsilon: T) -> Self {
        Self { epsilon }
    }

    /// Creates a verifier that only accepts identical values.
    #[must_use]
    pub fn exact() -> Self {
        Self::new(T::zero())
    }

    /// Returns the tolerance.
    #[must_use]
    pub fn epsilon(&self) -> T {
        self.epsilon
    }

    /// Verifies that every cell of `parallel` is within the tolerance of the
    /// corresponding cell of `serial`.
    ///
    /// Rows are compared in parallel. NaN never compares as within tolerance.
    ///
    /// # Errors
    ///
    /// Returns the first mismatching cell in row-major order, or a shape
    /// mismatch if the orders differ.
    pub fn verify(
        &self,
        parallel: &Matrix<T>,
        serial: &Matrix<T>,
    ) -> Result<Verification, VerificationError> {
        if parallel.order() != serial.order() {
            return Err(VerificationError::ShapeMismatch {
                parallel: parallel.order(),
                serial: serial.order(),
            });
        }

        let n = parallel.order().max(1);
        let epsilon = self.epsilon;
        let within = move |a: T, b: T| (a - b).abs() <= epsilon;

        let mismatch = parallel
            .as_slice()
            .par_chunks(n)
            .zip(serial.as_slice().par_chunks(n))
            .enumerate()
            .find_map_first(|(row, (p, s))| {
                p.iter()
                    .zip(s)
                    .position(|(&a, &b)| !within(a, b))
                    .map(|col| (row, col))
            });

        if let Some((row, col)) = mismatch {
            let (a, b) = (parallel[(row, col)], serial[(row, col)]);
            return Err(VerificationError::Mismatch {
                row,
                col,
                parallel: a.widen(),
                serial: b.widen(),
                difference: (a - b).abs().widen(),
                epsilon: epsilon.widen(),
            });
        }

        let max_difference = parallel
            .as_slice()
            .par_iter()
            .zip(serial.as_slice())
            .map(|(&a, &b)| (a - b).abs())
            .reduce(T::zero, T::max);

        Ok(Verification {
            cells: parallel.as_slice().len(),
            max_difference: max_difference.widen(),
        })
    }
}
