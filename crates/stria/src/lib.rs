//! # Stria
//!
//! Parallel dense Gaussian elimination on row-striped workers.
//!
//! An N×N matrix is split across P workers by a block or cyclic row
//! mapping. Each step, the owner of the pivot row normalizes and publishes
//! it, and every worker eliminates the pivot column from the rows it owns.
//! The reduced matrix is upper-triangular with a unit diagonal and matches
//! the serial reference bit for bit.
//!
//! ## Crates
//!
//! - [`core`]: matrices, row mappings, sources, the serial reference and
//!   the verifier
//! - [`comm`]: the collective [`Group`](comm::Group) capability and its
//!   shared-memory and message-passing realizations
//! - [`kernel`]: workers, the step state machine and the run driver
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stria::prelude::*;
//!
//! let matrix: Matrix<f64> = UniformSource::new(DEFAULT_SEED).init(8);
//! let config = EliminationConfig::default().with_backend(Backend::MessagePassing);
//! let outcome = eliminate_and_verify(matrix, &config, &SystemClock::new(), &Verifier::default())?;
//! println!("{}", outcome.report.matrix);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod harness;

pub use stria_comm as comm;
pub use stria_core as core;
pub use stria_kernel as kernel;

pub use harness::{eliminate_and_verify, HarnessError, Outcome};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::harness::{eliminate_and_verify, HarnessError, Outcome};
    pub use stria_core::{
        serial_eliminate, DiagonallyDominantSource, Mapping, Matrix, MatrixSource, Real,
        UniformSource, Verifier, DEFAULT_EPSILON, DEFAULT_SEED,
    };
    pub use stria_kernel::{
        run, Backend, Clock, EliminationConfig, EliminationError, EliminationReport,
        SystemClock,
    };
}
