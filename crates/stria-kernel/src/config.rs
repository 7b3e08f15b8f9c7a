//! Run configuration.

use std::fmt;

use stria_core::{ConfigError, Mapping, RowMap};

/// Which scheduling model runs the workers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Backend {
    /// Threads sharing the coordinator's matrix.
    #[default]
    SharedMemory,
    /// Workers owning private row slices, exchanging messages only.
    MessagePassing,
}

impl Backend {
    /// Both supported backends.
    pub const ALL: [Backend; 2] = [Backend::SharedMemory, Backend::MessagePassing];
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SharedMemory => f.write_str("shared-memory"),
            Self::MessagePassing => f.write_str("message-passing"),
        }
    }
}

/// Configuration for one elimination run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EliminationConfig {
    /// Matrix order N.
    pub order: usize,
    /// Worker count P; must divide N.
    pub workers: usize,
    /// Row mapping policy.
    pub mapping: Mapping,
    /// Scheduling model.
    pub backend: Backend,
}

impl Default for EliminationConfig {
    fn default() -> Self {
        Self {
            order: 8,
            workers: 4,
            mapping: Mapping::Cyclic,
            backend: Backend::SharedMemory,
        }
    }
}

impl EliminationConfig {
    /// Creates a configuration for an N×N matrix over P workers.
    #[must_use]
    pub fn new(order: usize, workers: usize) -> Self {
        Self {
            order,
            workers,
            ..Self::default()
        }
    }

    /// Sets the mapping policy.
    #[must_use]
    pub fn with_mapping(mut self, mapping: Mapping) -> Self {
        self.mapping = mapping;
        self
    }

    /// Sets the scheduling model.
    #[must_use]
    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    /// Validates the configuration and builds its row partition.
    ///
    /// # Errors
    ///
    /// Fails if N or P is zero or if P does not divide N.
    pub fn validate(&self) -> Result<RowMap, ConfigError> {
        RowMap::new(self.order, self.workers, self.mapping)
    }
}
