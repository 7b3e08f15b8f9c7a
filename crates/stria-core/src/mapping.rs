//! Row mapping policies.
//!
//! A mapping assigns every global row to exactly one worker and gives that
//! row a dense, zero-based index inside the worker's local storage. The
//! worker's `k`-th owned row (in increasing global order) has local index `k`.

use std::fmt;

use crate::error::ConfigError;

/// How rows are assigned to workers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Mapping {
    /// Contiguous ranges: worker `w` owns rows `w*N/P .. (w+1)*N/P`.
    Block,
    /// Interleaved rows: worker `w` owns every row `i` with `i % P == w`.
    ///
    /// Later elimination steps touch fewer rows, so interleaving keeps every
    /// worker busy until the end.
    #[default]
    Cyclic,
}

impl Mapping {
    /// Both supported mappings.
    pub const ALL: [Mapping; 2] = [Mapping::Block, Mapping::Cyclic];
}

impl fmt::Display for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Block => f.write_str("block"),
            Self::Cyclic => f.write_str("cyclic"),
        }
    }
}

/// Where a global row lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowLocation {
    /// Owning worker.
    pub worker: usize,
    /// Index into the owner's local storage.
    pub local: usize,
}

/// A validated row partition of an N×N matrix over P workers.
///
/// Fixed for the whole run once constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowMap {
    order: usize,
    workers: usize,
    rows_per_worker: usize,
    mapping: Mapping,
}

impl RowMap {
    /// Validates `order` and `workers` and builds the partition.
    ///
    /// # Errors
    ///
    /// Fails if either count is zero or if `order` is not a multiple of
    /// `workers`.
    pub fn new(order: usize, workers: usize, mapping: Mapping) -> Result<Self, ConfigError> {
        if order == 0 {
            return Err(ConfigError::EmptyMatrix);
        }
        if workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if order % workers != 0 {
            return Err(ConfigError::UnevenPartition { order, workers });
        }
        Ok(Self {
            order,
            workers,
            rows_per_worker: order / workers,
            mapping,
        })
    }

    /// Returns the matrix order N.
    #[must_use]
    pub fn order(&self) -> usize {
        self.order
    }

    /// Returns the worker count P.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Returns N / P.
    #[must_use]
    pub fn rows_per_worker(&self) -> usize {
        self.rows_per_worker
    }

    /// Returns the mapping policy.
    #[must_use]
    pub fn mapping(&self) -> Mapping {
        self.mapping
    }

    /// Returns the worker that owns global row `row`.
    #[must_use]
    pub fn owner(&self, row: usize) -> usize {
        debug_assert!(row < self.order);
        match self.mapping {
            Mapping::Block => row / self.rows_per_worker,
            Mapping::Cyclic => row % self.workers,
        }
    }

    /// Returns the index of global row `row` inside its owner's storage.
    #[must_use]
    pub fn local_index(&self, row: usize) -> usize {
        debug_assert!(row < self.order);
        match self.mapping {
            Mapping::Block => row % self.rows_per_worker,
            Mapping::Cyclic => row / self.workers,
        }
    }

    /// Returns the owner and local index of global row `row`.
    #[must_use]
    pub fn locate(&self, row: usize) -> RowLocation {
        RowLocation {
            worker: self.owner(row),
            local: self.local_index(row),
        }
    }

    /// Returns the global row stored at `local` on `worker`.
    #[must_use]
    pub fn global_index(&self, worker: usize, local: usize) -> usize {
        debug_assert!(worker < self.workers && local < self.rows_per_worker);
        match self.mapping {
            Mapping::Block => worker * self.rows_per_worker + local,
            Mapping::Cyclic => local * self.workers + worker,
        }
    }

    /// Iterates over the global rows owned by `worker`, in local order.
    pub fn rows_of(&self, worker: usize) -> impl Iterator<Item = usize> + '_ {
        (0..self.rows_per_worker).map(move |local| self.global_index(worker, local))
    }
}
