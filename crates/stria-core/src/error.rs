//! Error types shared by the elimination crates.

use thiserror::Error;

/// An invalid run configuration, detected before any row is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The matrix order is zero.
    #[error("matrix order must be positive")]
    EmptyMatrix,

    /// The worker count is zero.
    #[error("worker count must be positive")]
    NoWorkers,

    /// Rows cannot be split evenly across workers.
    #[error("matrix order {order} is not divisible by worker count {workers}")]
    UnevenPartition {
        /// Matrix order N.
        order: usize,
        /// Worker count P.
        workers: usize,
    },

    /// A row has a different length than the number of rows.
    #[error("matrix is not square: {rows} rows, but row {row} has {cols} columns")]
    NotSquare {
        /// Number of rows supplied.
        rows: usize,
        /// First offending row.
        row: usize,
        /// Length of that row.
        cols: usize,
    },

    /// A flat buffer does not hold `order * order` values.
    #[error("buffer holds {actual} values, expected {expected}")]
    BufferLength {
        /// Required length.
        expected: usize,
        /// Supplied length.
        actual: usize,
    },

    /// The matrix order differs from the configured order.
    #[error("matrix order {actual} does not match configured order {expected}")]
    OrderMismatch {
        /// Configured order.
        expected: usize,
        /// Order of the supplied matrix.
        actual: usize,
    },
}

/// A fatal numerical failure during elimination.
///
/// No pivoting fallback exists, so both variants end the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NumericalError {
    /// The diagonal element used as pivot is exactly zero.
    #[error("zero pivot at step {step} (row {row}, worker {worker})")]
    ZeroPivot {
        /// Elimination step.
        step: usize,
        /// Global row index of the pivot row.
        row: usize,
        /// Worker owning the pivot row.
        worker: usize,
    },

    /// Normalizing the pivot row produced NaN or infinity.
    #[error("non-finite value at step {step} in row {row}, column {column} (worker {worker})")]
    NonFinite {
        /// Elimination step.
        step: usize,
        /// Global row index of the pivot row.
        row: usize,
        /// First non-finite column.
        column: usize,
        /// Worker owning the pivot row.
        worker: usize,
    },
}

impl NumericalError {
    /// Returns the elimination step at which the failure was detected.
    #[must_use]
    pub fn step(&self) -> usize {
        match self {
            Self::ZeroPivot { step, .. } | Self::NonFinite { step, .. } => *step,
        }
    }

    /// Returns the worker that detected the failure.
    #[must_use]
    pub fn worker(&self) -> usize {
        match self {
            Self::ZeroPivot { worker, .. } | Self::NonFinite { worker, .. } => *worker,
        }
    }
}

/// A parallel result that does not match the serial reference.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VerificationError {
    /// The two matrices have different orders.
    #[error("shape mismatch: parallel result has order {parallel}, serial result has order {serial}")]
    ShapeMismatch {
        /// Order of the parallel result.
        parallel: usize,
        /// Order of the serial result.
        serial: usize,
    },

    /// A cell differs by more than the tolerance.
    #[error(
        "cell ({row}, {col}) differs by {difference} (tolerance {epsilon}): parallel={parallel}, serial={serial}"
    )]
    Mismatch {
        /// Row of the first mismatching cell.
        row: usize,
        /// Column of the first mismatching cell.
        col: usize,
        /// Value in the parallel result.
        parallel: f64,
        /// Value in the serial result.
        serial: f64,
        /// Absolute difference.
        difference: f64,
        /// Tolerance in effect.
        epsilon: f64,
    },
}
