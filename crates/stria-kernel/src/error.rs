//! Errors surfaced by an elimination run.

use stria_comm::CommError;
use stria_core::{ConfigError, NumericalError};
use thiserror::Error;

/// Why an elimination run failed.
///
/// Nothing here is recoverable; each variant names the worker (and where
/// known the step) that detected the problem.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EliminationError {
    /// The configuration was rejected before any row was touched.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// A pivot was zero or normalization produced a non-finite value.
    #[error("numerical failure: {0}")]
    Numerical(#[from] NumericalError),

    /// A collective could not complete.
    #[error("communication failure on worker {worker}{}: {source}", step_suffix(.step))]
    Communication {
        /// Worker that observed the failure.
        worker: usize,
        /// Elimination step, if the failure happened during elimination.
        step: Option<usize>,
        /// Underlying transport error.
        #[source]
        source: CommError,
    },

    /// A worker received or returned a partition of the wrong size.
    #[error("worker {worker} holds {actual} values, expected {expected}")]
    PartitionSize {
        /// Worker whose partition is wrong.
        worker: usize,
        /// Expected number of values, `(N / P) * N`.
        expected: usize,
        /// Actual number of values.
        actual: usize,
    },

    /// The coordinator received the wrong number of partitions.
    #[error("received {actual} partitions for {expected} workers")]
    PartitionCount {
        /// Worker count P.
        expected: usize,
        /// Partitions received.
        actual: usize,
    },

    /// A worker thread panicked.
    #[error("worker {worker} panicked")]
    WorkerPanicked {
        /// Worker whose thread panicked.
        worker: usize,
    },
}

fn step_suffix(step: &Option<usize>) -> String {
    step.map(|s| format!(" at step {s}")).unwrap_or_default()
}

impl EliminationError {
    pub(crate) fn comm(worker: usize, step: Option<usize>) -> impl FnOnce(CommError) -> Self {
        move |source| Self::Communication {
            worker,
            step,
            source,
        }
    }

    /// Returns true if this error only echoes a failure on another worker.
    #[must_use]
    pub fn is_cascade(&self) -> bool {
        matches!(self, Self::Communication { source, .. } if source.is_cascade())
    }

    /// Ranks errors so the root cause of a failed run is reported first.
    pub(crate) fn precedence(&self) -> u8 {
        match self {
            Self::Config(_) | Self::Numerical(_) => 0,
            Self::PartitionSize { .. } | Self::PartitionCount { .. } => 1,
            Self::Communication { .. } if !self.is_cascade() => 1,
            Self::WorkerPanicked { .. } => 2,
            Self::Communication { .. } => 3,
        }
    }
}
