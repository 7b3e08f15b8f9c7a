//! # stria-kernel
//!
//! Parallel dense Gaussian elimination over P row-partitioned workers.
//!
//! For every step `i` the owner of row `i` normalizes it and publishes it,
//! every worker eliminates column `i` from the rows it owns below `i`, and
//! the workers synchronize before step `i + 1`. The result is bit-for-bit
//! identical to [`stria_core::serial_eliminate`] for any worker count and
//! either mapping.
//!
//! ## Scheduling models
//!
//! - [`Backend::SharedMemory`]: scoped threads borrow disjoint rows of the
//!   coordinator's matrix and share a pivot slot behind a reusable barrier.
//! - [`Backend::MessagePassing`]: workers own only the rows scattered to them
//!   and exchange pivots through blocking broadcasts.
//!
//! ## Example
//!
//! ```rust,ignore
//! use stria_core::{Matrix, MatrixSource, UniformSource};
//! use stria_kernel::{run, EliminationConfig, SystemClock};
//!
//! let matrix: Matrix<f64> = UniformSource::new(7).init(8);
//! let report = run(matrix, &EliminationConfig::default(), &SystemClock::new())?;
//! assert!(report.matrix.is_row_echelon());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod clock;
pub mod config;
pub mod distribute;
pub mod error;
pub mod report;
pub mod runner;
pub mod worker;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Backend, EliminationConfig};
pub use distribute::{collect, distribute, lend_rows};
pub use error::EliminationError;
pub use report::EliminationReport;
pub use runner::{run, run_message_passing, run_shared_memory};
pub use worker::{StepPhase, Worker, WorkerStats};

#[cfg(test)]
mod proptests;
