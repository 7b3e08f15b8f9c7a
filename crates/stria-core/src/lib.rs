//! # stria-core
//!
//! Dense matrices and the serial building blocks of row-striped Gaussian
//! elimination.
//!
//! This crate provides:
//! - A square, row-major dense [`Matrix`] over any [`Real`] scalar
//! - Row mapping policies ([`Mapping::Block`], [`Mapping::Cyclic`]) that
//!   partition rows across workers
//! - Seeded matrix sources for reproducible inputs
//! - The serial elimination oracle and the row primitives it shares with the
//!   parallel kernel
//! - A tolerance-based verifier
//!
//! ## Elimination
//!
//! Elimination always pivots on the diagonal. There is no row exchange, so a
//! zero (or non-finite) pivot is reported as a [`NumericalError`] instead of
//! being worked around. The result is upper-triangular with a unit diagonal;
//! no back-substitution is performed.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod mapping;
pub mod matrix;
pub mod reference;
pub mod scalar;
pub mod source;
pub mod verify;

pub use error::{ConfigError, NumericalError, VerificationError};
pub use mapping::{Mapping, RowLocation, RowMap};
pub use matrix::Matrix;
pub use reference::{
    eliminate_row, normalize_pivot_row, serial_eliminate, serial_eliminate_in_place, PivotFault,
};
pub use scalar::Real;
pub use source::{DiagonallyDominantSource, MatrixSource, UniformSource, DEFAULT_SEED};
pub use verify::{Verification, Verifier, DEFAULT_EPSILON};

#[cfg(test)]
mod proptests;
