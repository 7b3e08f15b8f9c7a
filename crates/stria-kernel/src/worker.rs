//! The per-worker elimination loop.
//!
//! A [`Worker`] is the typed task descriptor handed to each spawned worker.
//! It drives the step state machine over the rows it owns and talks to its
//! peers only through a [`Group`].

use std::time::Duration;

use stria_comm::Group;
use stria_core::{eliminate_row, normalize_pivot_row, Real, RowMap};
use tracing::{debug, trace};

use crate::clock::Clock;
use crate::error::EliminationError;

/// Where a worker is within an elimination step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StepPhase {
    /// Deciding whether this worker owns the pivot row.
    AwaitRole,
    /// Normalizing and publishing the owned pivot row.
    Normalize,
    /// Blocked until the owner's pivot row arrives.
    WaitBroadcast,
    /// The pivot row for this step is available locally.
    BroadcastDone,
    /// Eliminating the pivot column from owned rows below the pivot.
    EliminateOwnedRows,
    /// Waiting for every worker to finish the step.
    BarrierWait,
    /// All steps are complete.
    Terminate,
}

impl StepPhase {
    /// Returns the phase that follows `self`.
    ///
    /// `is_owner` selects between normalizing and waiting, `sync_each_step`
    /// decides whether a step ends at a barrier, and `last_step` ends the run.
    #[must_use]
    pub fn next(self, is_owner: bool, sync_each_step: bool, last_step: bool) -> Self {
        let finish = if last_step {
            Self::Terminate
        } else {
            Self::AwaitRole
        };
        match self {
            Self::AwaitRole if is_owner => Self::Normalize,
            Self::AwaitRole => Self::WaitBroadcast,
            Self::Normalize | Self::WaitBroadcast => Self::BroadcastDone,
            Self::BroadcastDone => Self::EliminateOwnedRows,
            Self::EliminateOwnedRows if sync_each_step => Self::BarrierWait,
            Self::EliminateOwnedRows | Self::BarrierWait => finish,
            Self::Terminate => Self::Terminate,
        }
    }
}

/// Counters collected by one worker over a run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WorkerStats {
    /// Worker rank.
    pub rank: usize,
    /// Rows owned by the worker.
    pub rows_owned: usize,
    /// Pivot rows this worker normalized and published.
    pub pivots_published: usize,
    /// Row eliminations applied.
    pub row_updates: usize,
    /// Explicit barrier episodes, including the two that delimit timing.
    pub barrier_waits: usize,
    /// Time spent between the timing barriers.
    pub elapsed: Duration,
}

/// Typed task descriptor for one worker.
#[derive(Clone, Copy, Debug)]
pub struct Worker {
    rank: usize,
    map: RowMap,
}

impl Worker {
    /// Creates a new worker for `rank` under the given partition.
    #[must_use]
    pub fn new(rank: usize, map: RowMap) -> Self {
        Self { rank, map }
    }

    /// Returns the worker's rank.
    #[must_use]
    pub fn rank(&self) -> usize {
        self.rank
    }

    fn check_partition<T>(&self, rows: &[&mut [T]]) -> Result<(), EliminationError> {
        let n = self.map.order();
        let expected = self.map.rows_per_worker() * n;
        let actual: usize = rows.iter().map(|row| row.len()).sum();
        if rows.len() == self.map.rows_per_worker() && rows.iter().all(|row| row.len() == n) {
            Ok(())
        } else {
            Err(EliminationError::PartitionSize {
                worker: self.rank,
                expected,
                actual,
            })
        }
    }

    /// Runs every elimination step over the worker's owned `rows`.
    ///
    /// `rows[k]` must be the worker's `k`-th owned row. Every worker in the
    /// group must call this with the same partition.
    ///
    /// # Errors
    ///
    /// Returns a numerical error if this worker owns a pivot that is zero or
    /// non-finite, and a communication error if a collective fails. The
    /// caller is expected to abort the group on error.
    pub fn run_steps<T: Real, G: Group<T>>(
        &self,
        group: &mut G,
        rows: &mut [&mut [T]],
    ) -> Result<WorkerStats, EliminationError> {
        self.check_partition(rows)?;
        let n = self.map.order();
        let mut stats = WorkerStats {
            rank: self.rank,
            rows_owned: rows.len(),
            ..WorkerStats::default()
        };
        let mut pivot = vec![T::zero(); n];
        let mut step = 0;
        let mut phase = StepPhase::AwaitRole;

        loop {
            let owner = self.map.owner(step);
            let is_owner = owner == self.rank;
            let last_step = step + 1 == n;
            trace!(step, ?phase, "phase");

            match phase {
                StepPhase::AwaitRole | StepPhase::BroadcastDone => {}
                StepPhase::Normalize => {
                    let row = &mut rows[self.map.local_index(step)][..];
                    normalize_pivot_row(row, step).map_err(|fault| fault.at(step, step, self.rank))?;
                    pivot.copy_from_slice(row);
                    debug!(step, "publishing pivot row");
                    group
                        .broadcast(self.rank, &mut pivot)
                        .map_err(EliminationError::comm(self.rank, Some(step)))?;
                    stats.pivots_published += 1;
                }
                StepPhase::WaitBroadcast => {
                    group
                        .broadcast(owner, &mut pivot)
                        .map_err(EliminationError::comm(self.rank, Some(step)))?;
                }
                StepPhase::EliminateOwnedRows => {
                    for (local, row) in rows.iter_mut().enumerate() {
                        if self.map.global_index(self.rank, local) > step {
                            eliminate_row(&mut row[..], &pivot, step);
                            stats.row_updates += 1;
                        }
                    }
                }
                StepPhase::BarrierWait => {
                    group
                        .barrier()
                        .map_err(EliminationError::comm(self.rank, Some(step)))?;
                    stats.barrier_waits += 1;
                }
                StepPhase::Terminate => return Ok(stats),
            }

            let next = phase.next(is_owner, G::SYNC_EACH_STEP, last_step);
            if next == StepPhase::AwaitRole {
                step += 1;
            }
            phase = next;
        }
    }

    /// Runs [`Worker::run_steps`] between two barriers and times it.
    ///
    /// The clock is read right after the opening barrier and right after the
    /// closing one, so distribution and collection are excluded.
    ///
    /// # Errors
    ///
    /// See [`Worker::run_steps`].
    pub fn run_timed<T: Real, G: Group<T>, C: Clock + ?Sized>(
        &self,
        group: &mut G,
        rows: &mut [&mut [T]],
        clock: &C,
    ) -> Result<WorkerStats, EliminationError> {
        group
            .barrier()
            .map_err(EliminationError::comm(self.rank, None))?;
        let start = clock.now();
        let mut stats = self.run_steps(group, rows)?;
        group
            .barrier()
            .map_err(EliminationError::comm(self.rank, None))?;
        stats.elapsed = clock.now().saturating_sub(start);
        stats.barrier_waits += 2;
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use stria_comm::{BarrierWaitResult, CommError};
    use stria_core::{serial_eliminate, Mapping, Matrix, NumericalError};

    /// A single-rank group that records every collective it sees.
    #[derive(Default)]
    struct RecordingGroup {
        broadcast_roots: Vec<usize>,
        barriers: usize,
        fail_broadcast_at: Option<usize>,
    }

    impl Group<f64> for RecordingGroup {
        const SYNC_EACH_STEP: bool = true;

        fn rank(&self) -> usize {
            0
        }

        fn size(&self) -> usize {
            1
        }

        fn scatter(
            &mut self,
            _root: usize,
            chunks: Option<Vec<Vec<f64>>>,
        ) -> Result<Vec<f64>, CommError> {
            Ok(chunks.unwrap_or_default().pop().unwrap_or_default())
        }

        fn broadcast(&mut self, root: usize, _buffer: &mut [f64]) -> Result<(), CommError> {
            if self.fail_broadcast_at == Some(self.broadcast_roots.len()) {
                return Err(CommError::Aborted);
            }
            self.broadcast_roots.push(root);
            Ok(())
        }

        fn gather(
            &mut self,
            _root: usize,
            local: Vec<f64>,
        ) -> Result<Option<Vec<Vec<f64>>>, CommError> {
            Ok(Some(vec![local]))
        }

        fn barrier(&mut self) -> Result<BarrierWaitResult, CommError> {
            self.barriers += 1;
            Ok(BarrierWaitResult::new(true))
        }

        fn abort(&mut self) {}
    }

    fn scenario_a() -> Matrix<f64> {
        Matrix::from_rows(vec![
            vec![4.0, 3.0, 2.0, 1.0],
            vec![3.0, 4.0, 3.0, 2.0],
            vec![2.0, 3.0, 4.0, 3.0],
            vec![1.0, 2.0, 3.0, 4.0],
        ])
        .unwrap()
    }

    #[test]
    fn test_phase_transitions() {
        use StepPhase::*;
        assert_eq!(AwaitRole.next(true, true, false), Normalize);
        assert_eq!(AwaitRole.next(false, true, false), WaitBroadcast);
        assert_eq!(Normalize.next(true, true, false), BroadcastDone);
        assert_eq!(WaitBroadcast.next(false, true, false), BroadcastDone);
        assert_eq!(BroadcastDone.next(false, true, false), EliminateOwnedRows);
        assert_eq!(EliminateOwnedRows.next(false, true, false), BarrierWait);
        assert_eq!(EliminateOwnedRows.next(false, false, false), AwaitRole);
        assert_eq!(EliminateOwnedRows.next(false, false, true), Terminate);
        assert_eq!(BarrierWait.next(false, true, false), AwaitRole);
        assert_eq!(BarrierWait.next(false, true, true), Terminate);
        assert_eq!(Terminate.next(true, true, true), Terminate);
    }

    #[test]
    fn test_solo_worker_matches_serial_reference() {
        let input = scenario_a();
        let expected = serial_eliminate(&input).unwrap();
        let map = RowMap::new(4, 1, Mapping::Cyclic).unwrap();

        let mut matrix = input.clone();
        let mut rows: Vec<&mut [f64]> = matrix.rows_mut().collect();
        let mut group = RecordingGroup::default();
        let stats = Worker::new(0, map).run_steps(&mut group, &mut rows).unwrap();

        assert_eq!(matrix, expected);
        assert_eq!(group.broadcast_roots, vec![0, 0, 0, 0]);
        assert_eq!(group.barriers, 4);
        assert_eq!(stats.pivots_published, 4);
        assert_eq!(stats.row_updates, 3 + 2 + 1);
        assert_eq!(stats.barrier_waits, 4);
    }

    #[test]
    fn test_run_timed_adds_delimiting_barriers() {
        let map = RowMap::new(4, 1, Mapping::Block).unwrap();
        let mut matrix = scenario_a();
        let mut rows: Vec<&mut [f64]> = matrix.rows_mut().collect();
        let mut group = RecordingGroup::default();
        let clock = ManualClock::new(Duration::from_millis(3));
        let stats = Worker::new(0, map)
            .run_timed(&mut group, &mut rows, &clock)
            .unwrap();
        assert_eq!(stats.barrier_waits, 6);
        assert_eq!(group.barriers, 6);
        assert_eq!(stats.elapsed, Duration::from_millis(3));
    }

    #[test]
    fn test_zero_pivot_is_attributed_to_owner() {
        let mut matrix =
            Matrix::from_rows(vec![vec![1.0, 2.0], vec![1.0, 2.0]]).unwrap();
        let map = RowMap::new(2, 1, Mapping::Cyclic).unwrap();
        let mut rows: Vec<&mut [f64]> = matrix.rows_mut().collect();
        let err = Worker::new(0, map)
            .run_steps(&mut RecordingGroup::default(), &mut rows)
            .unwrap_err();
        assert_eq!(
            err,
            EliminationError::Numerical(NumericalError::ZeroPivot {
                step: 1,
                row: 1,
                worker: 0
            })
        );
    }

    #[test]
    fn test_broadcast_failure_reports_step() {
        let mut matrix = scenario_a();
        let map = RowMap::new(4, 1, Mapping::Cyclic).unwrap();
        let mut rows: Vec<&mut [f64]> = matrix.rows_mut().collect();
        let mut group = RecordingGroup {
            fail_broadcast_at: Some(2),
            ..RecordingGroup::default()
        };
        let err = Worker::new(0, map).run_steps(&mut group, &mut rows).unwrap_err();
        assert_eq!(
            err,
            EliminationError::Communication {
                worker: 0,
                step: Some(2),
                source: CommError::Aborted
            }
        );
    }

    #[test]
    fn test_rejects_wrong_partition() {
        let mut matrix = scenario_a();
        let map = RowMap::new(4, 2, Mapping::Cyclic).unwrap();
        let mut rows: Vec<&mut [f64]> = matrix.rows_mut().collect();
        let err = Worker::new(1, map)
            .run_steps(&mut RecordingGroup::default(), &mut rows)
            .unwrap_err();
        assert_eq!(
            err,
            EliminationError::PartitionSize {
                worker: 1,
                expected: 8,
                actual: 16
            }
        );
    }
}
