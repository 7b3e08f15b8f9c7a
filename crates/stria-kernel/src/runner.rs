//! Spawning workers, joining them and reporting the root cause of failures.

use std::thread::{self, ScopedJoinHandle};

use stria_comm::{channel_groups, shared_groups, Group};
use stria_core::{ConfigError, Matrix, Real, RowMap};
use tracing::{info, info_span, warn};

use crate::clock::Clock;
use crate::config::{Backend, EliminationConfig};
use crate::distribute::{collect, distribute, lend_rows};
use crate::error::EliminationError;
use crate::report::EliminationReport;
use crate::worker::{Worker, WorkerStats};

/// Rank that holds the full matrix before distribution and after collection.
const COORDINATOR: usize = 0;

/// Reduces `matrix` to row-echelon form with the configured workers.
///
/// The configuration is validated before any row is touched.
///
/// # Errors
///
/// Fails with [`EliminationError::Config`] for an invalid configuration or a
/// matrix of the wrong order, and otherwise with the root cause of the first
/// failing worker.
pub fn run<T: Real, C: Clock>(
    matrix: Matrix<T>,
    config: &EliminationConfig,
    clock: &C,
) -> Result<EliminationReport<T>, EliminationError> {
    let map = config.validate()?;
    if matrix.order() != map.order() {
        return Err(ConfigError::OrderMismatch {
            expected: map.order(),
            actual: matrix.order(),
        }
        .into());
    }

    info!(
        order = map.order(),
        workers = map.workers(),
        mapping = %map.mapping(),
        backend = %config.backend,
        "starting elimination"
    );
    let result = match config.backend {
        Backend::SharedMemory => run_shared_memory(matrix, &map, clock),
        Backend::MessagePassing => run_message_passing(matrix, &map, clock),
    };
    match &result {
        Ok(report) => info!(elapsed = ?report.elapsed, "elimination complete"),
        Err(err) => warn!(%err, "elimination failed"),
    }
    result
}

/// Runs the workers as scoped threads over disjoint rows of `matrix`.
///
/// # Errors
///
/// See [`run`].
pub fn run_shared_memory<T: Real, C: Clock>(
    mut matrix: Matrix<T>,
    map: &RowMap,
    clock: &C,
) -> Result<EliminationReport<T>, EliminationError> {
    let partitions = lend_rows(&mut matrix, map)?;
    let groups = shared_groups::<T>(map.workers());

    let outcomes = thread::scope(|scope| {
        let handles: Vec<_> = partitions
            .into_iter()
            .zip(groups)
            .enumerate()
            .map(|(rank, (mut rows, mut group))| {
                let worker = Worker::new(rank, *map);
                scope.spawn(move || {
                    let _span = info_span!("worker", rank).entered();
                    let result = worker.run_timed(&mut group, &mut rows, clock);
                    if result.is_err() {
                        group.abort();
                    }
                    result
                })
            })
            .collect();
        join_all(handles)
    });

    let workers = settle(outcomes)?;
    Ok(report(matrix, workers, map, Backend::SharedMemory))
}

/// Runs the workers as threads that own only the rows scattered to them.
///
/// The coordinator's matrix is consumed by distribution; the result is
/// rebuilt from the gathered partitions.
///
/// # Errors
///
/// See [`run`].
pub fn run_message_passing<T: Real, C: Clock>(
    matrix: Matrix<T>,
    map: &RowMap,
    clock: &C,
) -> Result<EliminationReport<T>, EliminationError> {
    let mut partitions = Some(distribute(&matrix, map)?);
    drop(matrix);
    let groups = channel_groups::<T>(map.workers());

    let outcomes = thread::scope(|scope| {
        let handles: Vec<_> = groups
            .into_iter()
            .map(|mut group| {
                let rank = group.rank();
                let worker = Worker::new(rank, *map);
                let chunks = if rank == COORDINATOR {
                    partitions.take()
                } else {
                    None
                };
                scope.spawn(move || {
                    let _span = info_span!("worker", rank).entered();
                    let result = run_partition(&worker, &mut group, chunks, map, clock);
                    if result.is_err() {
                        group.abort();
                    }
                    result
                })
            })
            .collect();
        join_all(handles)
    });

    let (workers, gathered): (Vec<WorkerStats>, Vec<Option<Vec<Vec<T>>>>) =
        settle(outcomes)?.into_iter().unzip();
    let partitions = gathered
        .into_iter()
        .flatten()
        .next()
        .ok_or(EliminationError::PartitionCount {
            expected: map.workers(),
            actual: 0,
        })?;
    let matrix = collect(partitions, map)?;
    Ok(report(matrix, workers, map, Backend::MessagePassing))
}

type Gathered<T> = Option<Vec<Vec<T>>>;

/// One message-passing worker: receive a partition, eliminate, send it back.
fn run_partition<T: Real, G: Group<T>, C: Clock>(
    worker: &Worker,
    group: &mut G,
    chunks: Option<Vec<Vec<T>>>,
    map: &RowMap,
    clock: &C,
) -> Result<(WorkerStats, Gathered<T>), EliminationError> {
    let rank = worker.rank();
    let n = map.order();
    let solo = group.size() == 1;

    let mut local = if solo {
        chunks.and_then(|c| c.into_iter().next()).unwrap_or_default()
    } else {
        group
            .scatter(COORDINATOR, chunks)
            .map_err(EliminationError::comm(rank, None))?
    };
    let expected = map.rows_per_worker() * n;
    if local.len() != expected {
        return Err(EliminationError::PartitionSize {
            worker: rank,
            expected,
            actual: local.len(),
        });
    }

    let mut rows: Vec<&mut [T]> = local.chunks_exact_mut(n).collect();
    let stats = worker.run_timed(group, &mut rows, clock)?;

    let gathered = if solo {
        Some(vec![local])
    } else {
        group
            .gather(COORDINATOR, local)
            .map_err(EliminationError::comm(rank, None))?
    };
    Ok((stats, gathered))
}

fn join_all<R>(handles: Vec<ScopedJoinHandle<'_, Result<R, EliminationError>>>) -> Vec<Result<R, EliminationError>> {
    handles
        .into_iter()
        .enumerate()
        .map(|(worker, handle)| {
            handle
                .join()
                .unwrap_or(Err(EliminationError::WorkerPanicked { worker }))
        })
        .collect()
}

/// Returns every worker's result, or the root cause if any worker failed.
///
/// Errors that only echo another worker's failure lose to the failure itself;
/// among equals the lowest rank wins.
fn settle<R>(outcomes: Vec<Result<R, EliminationError>>) -> Result<Vec<R>, EliminationError> {
    let mut values = Vec::with_capacity(outcomes.len());
    let mut root_cause: Option<EliminationError> = None;
    for outcome in outcomes {
        match outcome {
            Ok(value) => values.push(value),
            Err(err) => {
                let replace = root_cause
                    .as_ref()
                    .map_or(true, |current| err.precedence() < current.precedence());
                if replace {
                    root_cause = Some(err);
                }
            }
        }
    }
    match root_cause {
        Some(err) => Err(err),
        None => Ok(values),
    }
}

fn report<T>(
    matrix: Matrix<T>,
    workers: Vec<WorkerStats>,
    map: &RowMap,
    backend: Backend,
) -> EliminationReport<T> {
    let elapsed = workers.iter().map(|w| w.elapsed).max().unwrap_or_default();
    EliminationReport {
        matrix,
        elapsed,
        workers,
        mapping: map.mapping(),
        backend,
    }
}
