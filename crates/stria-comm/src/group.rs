//! The collective-communication capability handed to each worker.

use crate::barrier::BarrierWaitResult;
use crate::error::CommError;

/// One worker's handle on a communication group.
///
/// All ranks must call the same collectives, with the same roots, in the same
/// order. Every collective blocks until this rank's part of it is complete.
pub trait Group<T> {
    /// Whether workers must rendezvous at the end of every elimination step.
    ///
    /// Shared-memory groups need it so that step `i + 1` cannot begin until
    /// every step-`i` update is visible. Message-passing groups already order
    /// steps through their blocking broadcasts.
    const SYNC_EACH_STEP: bool;

    /// Returns this worker's rank in `0..size()`.
    fn rank(&self) -> usize;

    /// Returns the number of workers.
    fn size(&self) -> usize;

    /// Sends `chunks[r]` from `root` to every rank `r` and returns this
    /// rank's chunk. Only the root supplies `chunks`.
    ///
    /// # Errors
    ///
    /// Fails if the root supplies the wrong number of chunks or a peer fails.
    fn scatter(&mut self, root: usize, chunks: Option<Vec<Vec<T>>>) -> Result<Vec<T>, CommError>;

    /// Copies `buffer` from `root` into `buffer` on every other rank.
    ///
    /// # Errors
    ///
    /// Fails if payload lengths differ or a peer fails.
    fn broadcast(&mut self, root: usize, buffer: &mut [T]) -> Result<(), CommError>;

    /// Collects every rank's `local` buffer at `root`, in rank order. Returns
    /// `Some` on the root and `None` elsewhere.
    ///
    /// # Errors
    ///
    /// Fails if a peer fails.
    fn gather(&mut self, root: usize, local: Vec<T>) -> Result<Option<Vec<Vec<T>>>, CommError>;

    /// Blocks until every rank has arrived. Exactly one rank is the leader.
    ///
    /// # Errors
    ///
    /// Fails if the group is aborted or a peer disconnects.
    fn barrier(&mut self) -> Result<BarrierWaitResult, CommError>;

    /// Releases every peer blocked in a collective with an error.
    fn abort(&mut self);
}

pub(crate) fn check_root(root: usize, size: usize) -> Result<(), CommError> {
    if root < size {
        Ok(())
    } else {
        Err(CommError::InvalidRoot { root, size })
    }
}
