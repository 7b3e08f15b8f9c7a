//! Run the parallel kernel and check it against the serial reference.

use std::time::Duration;

use stria_core::{serial_eliminate, Matrix, Real, Verification, VerificationError, Verifier};
use stria_kernel::{run, Clock, EliminationConfig, EliminationError, EliminationReport};
use thiserror::Error;
use tracing::{info, warn};

/// Why a verified run failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HarnessError {
    /// The parallel run or the serial reference failed.
    #[error(transparent)]
    Elimination(#[from] EliminationError),

    /// The parallel result differs from the serial reference.
    #[error("verification failed: {0}")]
    Verification(#[from] VerificationError),
}

/// Everything a verified run produced.
#[derive(Clone, Debug)]
pub struct Outcome<T> {
    /// The parallel run.
    pub report: EliminationReport<T>,
    /// The serial reference result.
    pub serial: Matrix<T>,
    /// Time taken by the serial reference.
    pub serial_elapsed: Duration,
    /// Verification summary.
    pub verification: Verification,
}

impl<T> Outcome<T> {
    /// Serial time divided by parallel time, if the parallel time is nonzero.
    #[must_use]
    pub fn speedup(&self) -> Option<f64> {
        let parallel = self.report.elapsed.as_secs_f64();
        (parallel > 0.0).then(|| self.serial_elapsed.as_secs_f64() / parallel)
    }
}

/// Eliminates `matrix` in parallel, eliminates a copy serially, and verifies
/// that the two agree within the verifier's tolerance.
///
/// The configuration is validated before either elimination starts.
///
/// # Errors
///
/// Returns the parallel failure or the first cell that differs from the
/// serial reference by more than the tolerance.
pub fn eliminate_and_verify<T: Real, C: Clock>(
    matrix: Matrix<T>,
    config: &EliminationConfig,
    clock: &C,
    verifier: &Verifier<T>,
) -> Result<Outcome<T>, HarnessError> {
    let input = matrix.clone();
    let report = run(matrix, config, clock)?;

    let start = clock.now();
    // Same primitives in the same order, so this only fails where the run did.
    let serial = serial_eliminate(&input).map_err(EliminationError::from)?;
    let serial_elapsed = clock.now().saturating_sub(start);

    let verification = verifier.verify(&report.matrix, &serial).map_err(|err| {
        warn!(%err, "parallel result does not match serial reference");
        err
    })?;
    info!(
        cells = verification.cells,
        max_difference = verification.max_difference,
        parallel = ?report.elapsed,
        serial = ?serial_elapsed,
        "verified"
    );

    Ok(Outcome {
        report,
        serial,
        serial_elapsed,
        verification,
    })
}
