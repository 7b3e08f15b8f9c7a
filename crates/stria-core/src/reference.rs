//! Serial Gaussian elimination and the row primitives it shares with the
//! parallel kernel.
//!
//! The parallel kernel calls [`normalize_pivot_row`] and [`eliminate_row`]
//! on exactly the same values in exactly the same order as
//! [`serial_eliminate`], so a run with any worker count reproduces the serial
//! result bit for bit.

use crate::error::NumericalError;
use crate::matrix::Matrix;
use crate::scalar::Real;

/// A pivot row that cannot be normalized.
///
/// Row primitives do not know which worker or global row they operate on;
/// callers attach that with [`PivotFault::at`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PivotFault {
    /// The pivot is exactly zero.
    Zero,
    /// The pivot or a normalized value is NaN or infinite.
    NonFinite {
        /// First non-finite column.
        column: usize,
    },
}

impl PivotFault {
    /// Attributes the fault to a step, global row and worker.
    #[must_use]
    pub fn at(self, step: usize, row: usize, worker: usize) -> NumericalError {
        match self {
            Self::Zero => NumericalError::ZeroPivot { step, row, worker },
            Self::NonFinite { column } => NumericalError::NonFinite {
                step,
                row,
                column,
                worker,
            },
        }
    }
}

/// Normalizes the pivot row for elimination step `step`.
///
/// Every element right of the diagonal is divided by the pivot, and the
/// diagonal is then assigned 1 directly rather than divided by itself.
///
/// # Errors
///
/// Returns [`PivotFault::Zero`] for a zero pivot (the row is left untouched)
/// and [`PivotFault::NonFinite`] if the pivot or any quotient is NaN or
/// infinite.
pub fn normalize_pivot_row<T: Real>(row: &mut [T], step: usize) -> Result<(), PivotFault> {
    let pivot = row[step];
    if pivot.is_zero() {
        return Err(PivotFault::Zero);
    }
    if !pivot.is_finite() {
        return Err(PivotFault::NonFinite { column: step });
    }

    let tail = &mut row[step + 1..];
    for value in tail.iter_mut() {
        *value = *value / pivot;
    }
    if let Some(offset) = tail.iter().position(|v| !v.is_finite()) {
        return Err(PivotFault::NonFinite {
            column: step + 1 + offset,
        });
    }

    row[step] = T::one();
    Ok(())
}

/// Eliminates column `step` from `row` using the normalized `pivot_row`.
///
/// `pivot_row` must already be normalized for `step`. The eliminated cell is
/// assigned 0 directly.
pub fn eliminate_row<T: Real>(row: &mut [T], pivot_row: &[T], step: usize) {
    let scale = row[step];
    for (value, &pivot) in row[step + 1..].iter_mut().zip(&pivot_row[step + 1..]) {
        *value = *value - scale * pivot;
    }
    row[step] = T::zero();
}

/// Reduces `matrix` to row-echelon form in place.
///
/// # Errors
///
/// Returns a [`NumericalError`] attributed to worker 0 at the first step
/// whose pivot is zero or non-finite. Rows below the failing pivot are left
/// as they were after the previous step.
pub fn serial_eliminate_in_place<T: Real>(matrix: &mut Matrix<T>) -> Result<(), NumericalError> {
    let n = matrix.order();
    for step in 0..n {
        let (head, tail) = matrix.as_mut_slice().split_at_mut((step + 1) * n);
        let pivot_row = &mut head[step * n..];
        normalize_pivot_row(pivot_row, step).map_err(|fault| fault.at(step, step, 0))?;

        for row in tail.chunks_exact_mut(n) {
            eliminate_row(row, pivot_row, step);
        }
    }
    Ok(())
}

/// Returns the row-echelon form of `matrix`, the single-worker ground truth.
///
/// # Errors
///
/// See [`serial_eliminate_in_place`].
pub fn serial_eliminate<T: Real>(matrix: &Matrix<T>) -> Result<Matrix<T>, NumericalError> {
    let mut result = matrix.clone();
    serial_eliminate_in_place(&mut result)?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_pivot_row() {
        let mut row = vec![9.0, 4.0, 8.0, -2.0];
        normalize_pivot_row(&mut row, 1).unwrap();
        // Columns left of the pivot are untouched.
        assert_eq!(row, vec![9.0, 1.0, 2.0, -0.5]);
    }

    #[test]
    fn test_normalize_zero_pivot() {
        let mut row = vec![1.0, 0.0, 3.0];
        assert_eq!(normalize_pivot_row(&mut row, 1), Err(PivotFault::Zero));
        assert_eq!(row, vec![1.0, 0.0, 3.0]);
    }

    #[test]
    fn test_normalize_detects_overflow() {
        let mut row = vec![1e-300, f64::MAX];
        assert_eq!(
            normalize_pivot_row(&mut row, 0),
            Err(PivotFault::NonFinite { column: 1 })
        );
    }

    #[test]
    fn test_normalize_nan_pivot() {
        let mut row = vec![f32::NAN, 1.0];
        assert_eq!(
            normalize_pivot_row(&mut row, 0),
            Err(PivotFault::NonFinite { column: 0 })
        );
    }

    #[test]
    fn test_eliminate_row() {
        let pivot = vec![1.0, 0.5, 2.0];
        let mut row = vec![4.0, 3.0, 1.0];
        eliminate_row(&mut row, &pivot, 0);
        assert_eq!(row, vec![0.0, 1.0, -7.0]);
    }

    #[test]
    fn test_serial_eliminate_2x2() {
        let m = Matrix::from_rows(vec![vec![2.0, 4.0], vec![3.0, 5.0]]).unwrap();
        let r = serial_eliminate(&m).unwrap();
        // Row 0 / 2 = [1, 2]; row 1 - 3*row 0 = [0, -1]; row 1 / -1 = [0, 1].
        assert_eq!(r.as_slice(), &[1.0, 2.0, 0.0, 1.0]);
        assert!(r.is_row_echelon());
    }

    #[test]
    fn test_serial_eliminate_does_not_modify_input() {
        let m = Matrix::from_rows(vec![vec![2.0, 1.0], vec![1.0, 2.0]]).unwrap();
        let before = m.clone();
        let _ = serial_eliminate(&m).unwrap();
        assert_eq!(m, before);
    }

    #[test]
    fn test_serial_eliminate_checks_last_pivot() {
        // Rows 0 and 1 are equal, so the last pivot cancels to exactly zero.
        let m = Matrix::from_rows(vec![vec![1.0, 2.0], vec![1.0, 2.0]]).unwrap();
        assert_eq!(
            serial_eliminate(&m).unwrap_err(),
            NumericalError::ZeroPivot {
                step: 1,
                row: 1,
                worker: 0
            }
        );
    }

    #[test]
    fn test_serial_eliminate_leading_zero() {
        let m = Matrix::from_rows(vec![vec![0.0, 1.0], vec![1.0, 0.0]]).unwrap();
        let err = serial_eliminate(&m).unwrap_err();
        assert_eq!(err.step(), 0);
        assert_eq!(err.worker(), 0);
    }
}
