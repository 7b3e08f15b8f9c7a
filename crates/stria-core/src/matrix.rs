//! Square dense matrix stored in row-major order.
//!
//! The matrix is the authoritative copy of the data: the coordinator owns it
//! before distribution and after collection, and workers borrow or receive
//! disjoint rows of it in between.

use std::fmt;
use std::ops::{Index, IndexMut};
use std::slice::ChunksExactMut;

use crate::error::ConfigError;
use crate::scalar::Real;

/// Square dense matrix stored in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T> {
    /// Matrix entries in row-major order.
    data: Vec<T>,
    /// Number of rows (and columns).
    order: usize,
}

impl<T: Real> Matrix<T> {
    /// Creates a new matrix filled with zeros.
    #[must_use]
    pub fn zeros(order: usize) -> Self {
        Self {
            data: vec![T::zero(); order * order],
            order,
        }
    }

    /// Creates an identity matrix.
    #[must_use]
    pub fn identity(order: usize) -> Self {
        let mut m = Self::zeros(order);
        for i in 0..order {
            m[(i, i)] = T::one();
        }
        m
    }

    /// Creates a matrix from a list of rows.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyMatrix`] for an empty list and
    /// [`ConfigError::NotSquare`] if any row length differs from the number
    /// of rows.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self, ConfigError> {
        let order = rows.len();
        if order == 0 {
            return Err(ConfigError::EmptyMatrix);
        }
        if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != order) {
            return Err(ConfigError::NotSquare {
                rows: order,
                row,
                cols: r.len(),
            });
        }
        Ok(Self {
            data: rows.into_iter().flatten().collect(),
            order,
        })
    }

    /// Creates a matrix from a flat row-major buffer.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::BufferLength`] unless `data` holds exactly
    /// `order * order` values.
    pub fn from_vec(order: usize, data: Vec<T>) -> Result<Self, ConfigError> {
        if data.len() != order * order {
            return Err(ConfigError::BufferLength {
                expected: order * order,
                actual: data.len(),
            });
        }
        Ok(Self { data, order })
    }

    /// Wraps a buffer already known to be `order * order` long.
    pub(crate) fn from_raw(order: usize, data: Vec<T>) -> Self {
        debug_assert_eq!(data.len(), order * order);
        Self { data, order }
    }

    /// Returns the matrix order N.
    #[must_use]
    pub fn order(&self) -> usize {
        self.order
    }

    /// Returns a slice of the specified row.
    #[must_use]
    pub fn row(&self, row: usize) -> &[T] {
        let start = row * self.order;
        &self.data[start..start + self.order]
    }

    /// Returns a mutable slice of the specified row.
    pub fn row_mut(&mut self, row: usize) -> &mut [T] {
        let start = row * self.order;
        &mut self.data[start..start + self.order]
    }

    /// Splits the matrix into disjoint mutable rows, in row order.
    pub fn rows_mut(&mut self) -> ChunksExactMut<'_, T> {
        self.data.chunks_exact_mut(self.order.max(1))
    }

    /// Returns the entries in row-major order.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Returns the entries in row-major order, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consumes the matrix, returning its row-major buffer.
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Checks for row-echelon form: unit diagonal and an exactly-zero
    /// sub-diagonal.
    #[must_use]
    pub fn is_row_echelon(&self) -> bool {
        (0..self.order).all(|i| {
            let row = self.row(i);
            row[i] == T::one() && row[..i].iter().all(|v| v.is_zero())
        })
    }

    /// Returns the largest absolute cell difference, or `None` if the orders
    /// differ.
    #[must_use]
    pub fn max_abs_diff(&self, other: &Self) -> Option<T> {
        if self.order != other.order {
            return None;
        }
        Some(
            self.data
                .iter()
                .zip(&other.data)
                .map(|(a, b)| (*a - *b).abs())
                .fold(T::zero(), T::max),
        )
    }
}

impl<T> Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &Self::Output {
        &self.data[row * self.order + col]
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix<T> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut Self::Output {
        &mut self.data[row * self.order + col]
    }
}

impl<T: Real> fmt::Display for Matrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.order {
            let mut cells = self.row(i).iter();
            if let Some(first) = cells.next() {
                write!(f, "{first:.3}")?;
            }
            for value in cells {
                write!(f, "\t{value:.3}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeros() {
        let m: Matrix<f64> = Matrix::zeros(3);
        assert_eq!(m.order(), 3);
        assert!(m.as_slice().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_identity_is_row_echelon() {
        let id: Matrix<f32> = Matrix::identity(4);
        for i in 0..4 {
            for j in 0..4 {
                assert_eq!(id[(i, j)], if i == j { 1.0 } else { 0.0 });
            }
        }
        assert!(id.is_row_echelon());
    }

    #[test]
    fn test_from_rows_rejects_ragged_input() {
        let err = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::NotSquare {
                rows: 2,
                row: 1,
                cols: 1
            }
        );
    }

    #[test]
    fn test_from_rows_rejects_rectangular_input() {
        let err = Matrix::from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap_err();
        assert!(matches!(err, ConfigError::NotSquare { row: 0, cols: 3, .. }));
    }

    #[test]
    fn test_from_rows_rejects_empty_input() {
        let rows: Vec<Vec<f64>> = Vec::new();
        assert_eq!(Matrix::from_rows(rows).unwrap_err(), ConfigError::EmptyMatrix);
    }

    #[test]
    fn test_from_vec_checks_length() {
        assert!(Matrix::from_vec(2, vec![1.0f64; 4]).is_ok());
        assert_eq!(
            Matrix::from_vec(2, vec![1.0f64; 5]).unwrap_err(),
            ConfigError::BufferLength {
                expected: 4,
                actual: 5
            }
        );
    }

    #[test]
    fn test_rows_mut_are_disjoint_rows() {
        let mut m = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let mut rows: Vec<&mut [f64]> = m.rows_mut().collect();
        rows[1][0] = 30.0;
        rows[0][1] = 20.0;
        assert_eq!(m.as_slice(), &[1.0, 20.0, 30.0, 4.0]);
    }

    #[test]
    fn test_is_row_echelon_requires_exact_zeros() {
        let mut m: Matrix<f64> = Matrix::identity(3);
        m[(0, 2)] = 7.5;
        assert!(m.is_row_echelon());
        m[(2, 0)] = 1e-12;
        assert!(!m.is_row_echelon());
    }

    #[test]
    fn test_max_abs_diff() {
        let a = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let b = Matrix::from_rows(vec![vec![1.0, 2.5], vec![2.0, 4.0]]).unwrap();
        assert_eq!(a.max_abs_diff(&b), Some(1.0));
        assert_eq!(a.max_abs_diff(&Matrix::zeros(3)), None);
    }

    #[test]
    fn test_display() {
        let m = Matrix::from_rows(vec![vec![1.0, -0.5], vec![0.0, 1.0]]).unwrap();
        assert_eq!(m.to_string(), "1.000\t-0.500\n0.000\t1.000\n");
    }
}
