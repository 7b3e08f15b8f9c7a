//! The result of a successful elimination run.

use std::time::Duration;

use stria_core::{Mapping, Matrix};

use crate::config::Backend;
use crate::worker::WorkerStats;

/// A matrix in row-echelon form plus how it was produced.
#[derive(Clone, Debug)]
pub struct EliminationReport<T> {
    /// The collected result.
    pub matrix: Matrix<T>,
    /// Elimination wall time, the slowest worker's timed window.
    pub elapsed: Duration,
    /// Per-worker counters in rank order.
    pub workers: Vec<WorkerStats>,
    /// Mapping used.
    pub mapping: Mapping,
    /// Backend used.
    pub backend: Backend,
}

impl<T> EliminationReport<T> {
    /// Returns the total number of row eliminations across all workers.
    #[must_use]
    pub fn row_updates(&self) -> usize {
        self.workers.iter().map(|w| w.row_updates).sum()
    }

    /// Returns the total number of pivot rows published.
    #[must_use]
    pub fn pivots_published(&self) -> usize {
        self.workers.iter().map(|w| w.pivots_published).sum()
    }
}
