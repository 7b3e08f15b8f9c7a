//! Moving rows between the coordinator's matrix and worker partitions.
//!
//! Every partition is dense and zero-based: the worker's `k`-th owned row
//! (in increasing global order) sits at local index `k`. None of these
//! functions change a value, they only relocate rows.

use stria_core::{ConfigError, Matrix, Real, RowMap};

use crate::error::EliminationError;

fn check_order<T: Real>(matrix: &Matrix<T>, map: &RowMap) -> Result<(), ConfigError> {
    if matrix.order() == map.order() {
        Ok(())
    } else {
        Err(ConfigError::OrderMismatch {
            expected: map.order(),
            actual: matrix.order(),
        })
    }
}

/// Copies each worker's rows into a contiguous `(N / P) × N` buffer.
///
/// # Errors
///
/// Fails if the matrix order differs from the partition's.
pub fn distribute<T: Real>(matrix: &Matrix<T>, map: &RowMap) -> Result<Vec<Vec<T>>, ConfigError> {
    check_order(matrix, map)?;
    let n = map.order();
    let partitions = (0..map.workers())
        .map(|worker| {
            let mut local = Vec::with_capacity(map.rows_per_worker() * n);
            for row in map.rows_of(worker) {
                local.extend_from_slice(matrix.row(row));
            }
            local
        })
        .collect();
    Ok(partitions)
}

/// Reassembles worker partitions into a matrix in global row order.
///
/// # Errors
///
/// Fails with [`EliminationError::PartitionSize`] if a partition does not hold
/// exactly `(N / P) × N` values, or with [`EliminationError::PartitionCount`]
/// if the number of partitions differs from the worker count.
pub fn collect<T: Real>(partitions: Vec<Vec<T>>, map: &RowMap) -> Result<Matrix<T>, EliminationError> {
    if partitions.len() != map.workers() {
        return Err(EliminationError::PartitionCount {
            expected: map.workers(),
            actual: partitions.len(),
        });
    }

    let n = map.order();
    let expected = map.rows_per_worker() * n;
    let mut matrix = Matrix::zeros(n);
    for (worker, local) in partitions.into_iter().enumerate() {
        if local.len() != expected {
            return Err(EliminationError::PartitionSize {
                worker,
                expected,
                actual: local.len(),
            });
        }
        for (row, values) in map.rows_of(worker).zip(local.chunks_exact(n)) {
            matrix.row_mut(row).copy_from_slice(values);
        }
    }
    Ok(matrix)
}

/// Splits the matrix into per-worker sets of disjoint mutable rows.
///
/// This is the zero-copy counterpart of [`distribute`] for workers that share
/// the coordinator's memory. The borrow ends, and the coordinator regains the
/// matrix, once every worker has returned its rows.
///
/// # Errors
///
/// Fails if the matrix order differs from the partition's.
pub fn lend_rows<'a, T: Real>(
    matrix: &'a mut Matrix<T>,
    map: &RowMap,
) -> Result<Vec<Vec<&'a mut [T]>>, ConfigError> {
    check_order(matrix, map)?;
    let mut partitions: Vec<Vec<&'a mut [T]>> = (0..map.workers())
        .map(|_| Vec::with_capacity(map.rows_per_worker()))
        .collect();
    for (row, values) in matrix.rows_mut().enumerate() {
        partitions[map.owner(row)].push(values);
    }
    Ok(partitions)
}
