//! Shared-memory group for worker threads.
//!
//! All handles of one group point at a single [`SharedContext`]. A broadcast
//! is a barrier-guarded shared read: the root writes the pivot slot, every
//! rank rendezvouses, and the other ranks copy the slot out. Two slots
//! alternate between consecutive broadcasts, so a root can publish broadcast
//! `s + 1` while slower ranks are still copying broadcast `s`.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::trace;

use crate::barrier::{Barrier, BarrierWaitResult};
use crate::error::CommError;
use crate::group::{check_root, Group};

/// State shared by every handle of one shared-memory group.
#[derive(Debug)]
pub struct SharedContext<T> {
    barrier: Barrier,
    pivot_slots: [RwLock<Vec<T>>; 2],
    mailboxes: Vec<Mutex<Option<Vec<T>>>>,
}

impl<T> SharedContext<T> {
    fn new(size: usize) -> Self {
        Self {
            barrier: Barrier::new(size),
            pivot_slots: [RwLock::new(Vec::new()), RwLock::new(Vec::new())],
            mailboxes: (0..size).map(|_| Mutex::new(None)).collect(),
        }
    }
}

/// One worker thread's handle on a shared-memory group.
///
/// Dropping a handle while its thread is panicking aborts the group.
#[derive(Debug)]
pub struct SharedGroup<T> {
    rank: usize,
    broadcasts: u64,
    context: Arc<SharedContext<T>>,
}

/// Creates one handle per rank for a shared-memory group of `size` workers.
///
/// # Panics
///
/// Panics if `size == 0`.
#[must_use]
pub fn shared_groups<T>(size: usize) -> Vec<SharedGroup<T>> {
    let context = Arc::new(SharedContext::new(size));
    (0..size)
        .map(|rank| SharedGroup {
            rank,
            broadcasts: 0,
            context: Arc::clone(&context),
        })
        .collect()
}

impl<T> SharedGroup<T> {
    fn rendezvous(&self) -> Result<BarrierWaitResult, CommError> {
        self.context.barrier.wait()
    }

    fn take_mailbox(&self, owner: usize, expected: &'static str) -> Result<Vec<T>, CommError> {
        self.context.mailboxes[owner]
            .lock()
            .take()
            .ok_or(CommError::Protocol {
                peer: owner,
                expected,
                received: "nothing",
            })
    }
}

impl<T: Clone + Send + Sync> Group<T> for SharedGroup<T> {
    const SYNC_EACH_STEP: bool = true;

    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.context.barrier.parties()
    }

    fn scatter(&mut self, root: usize, chunks: Option<Vec<Vec<T>>>) -> Result<Vec<T>, CommError> {
        check_root(root, self.size())?;
        if self.rank == root {
            let chunks = chunks.unwrap_or_default();
            if chunks.len() != self.size() {
                return Err(CommError::BufferCount {
                    supplied: chunks.len(),
                    size: self.size(),
                });
            }
            for (mailbox, chunk) in self.context.mailboxes.iter().zip(chunks) {
                *mailbox.lock() = Some(chunk);
            }
        }
        self.rendezvous()?;
        let local = self.take_mailbox(self.rank, "rows")?;
        // Keep the root from refilling mailboxes before every rank has emptied its own.
        self.rendezvous()?;
        trace!(rank = self.rank, root, len = local.len(), "scatter complete");
        Ok(local)
    }

    fn broadcast(&mut self, root: usize, buffer: &mut [T]) -> Result<(), CommError> {
        check_root(root, self.size())?;
        let parity = usize::from(self.broadcasts % 2 == 1);
        self.broadcasts += 1;
        let slot = &self.context.pivot_slots[parity];

        if self.rank == root {
            let mut published = slot.write();
            published.clear();
            published.extend_from_slice(buffer);
        }
        self.rendezvous()?;
        if self.rank != root {
            let published = slot.read();
            if published.len() != buffer.len() {
                return Err(CommError::LengthMismatch {
                    expected: buffer.len(),
                    actual: published.len(),
                });
            }
            buffer.clone_from_slice(&published);
        }
        Ok(())
    }

    fn gather(&mut self, root: usize, local: Vec<T>) -> Result<Option<Vec<Vec<T>>>, CommError> {
        check_root(root, self.size())?;
        *self.context.mailboxes[self.rank].lock() = Some(local);
        self.rendezvous()?;
        let gathered = if self.rank == root {
            let chunks = (0..self.size())
                .map(|owner| self.take_mailbox(owner, "rows"))
                .collect::<Result<Vec<_>, _>>()?;
            Some(chunks)
        } else {
            None
        };
        self.rendezvous()?;
        Ok(gathered)
    }

    fn barrier(&mut self) -> Result<BarrierWaitResult, CommError> {
        self.rendezvous()
    }

    fn abort(&mut self) {
        trace!(rank = self.rank, "aborting shared group");
        self.context.barrier.abort();
    }
}

impl<T> Drop for SharedGroup<T> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.context.barrier.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn run_group<R: Send + 'static>(
        size: usize,
        body: impl Fn(SharedGroup<f64>) -> R + Send + Sync + Copy + 'static,
    ) -> Vec<R> {
        let handles: Vec<_> = shared_groups(size)
            .into_iter()
            .map(|group| thread::spawn(move || body(group)))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    }

    #[test]
    fn test_broadcast_reaches_every_rank() {
        let results = run_group(4, |mut group| {
            let mut buffer = vec![0.0; 3];
            if group.rank() == 2 {
                buffer = vec![1.0, 2.0, 3.0];
            }
            group.broadcast(2, &mut buffer).unwrap();
            buffer
        });
        assert!(results.iter().all(|b| b == &vec![1.0, 2.0, 3.0]));
    }

    #[test]
    fn test_back_to_back_broadcasts_from_rotating_roots() {
        const ROUNDS: usize = 64;
        let results = run_group(3, |mut group| {
            let mut seen = Vec::with_capacity(ROUNDS);
            for round in 0..ROUNDS {
                let root = round % 3;
                let mut buffer = vec![0.0; 2];
                if group.rank() == root {
                    buffer = vec![round as f64, -(round as f64)];
                }
                group.broadcast(root, &mut buffer).unwrap();
                seen.push(buffer[0]);
            }
            seen
        });
        let expected: Vec<f64> = (0..ROUNDS).map(|r| r as f64).collect();
        assert!(results.iter().all(|seen| seen == &expected));
    }

    #[test]
    fn test_scatter_then_gather() {
        let results = run_group(3, |mut group| {
            let chunks = (group.rank() == 0)
                .then(|| (0..3).map(|r| vec![r as f64; 2]).collect::<Vec<_>>());
            let mut local = group.scatter(0, chunks).unwrap();
            for v in &mut local {
                *v += 10.0;
            }
            group.gather(0, local).unwrap()
        });
        assert_eq!(
            results[0],
            Some(vec![vec![10.0, 10.0], vec![11.0, 11.0], vec![12.0, 12.0]])
        );
        assert!(results[1].is_none() && results[2].is_none());
    }

    #[test]
    fn test_scatter_rejects_wrong_chunk_count() {
        let mut groups = shared_groups::<f64>(1);
        let err = groups[0].scatter(0, Some(vec![vec![], vec![]])).unwrap_err();
        assert_eq!(err, CommError::BufferCount { supplied: 2, size: 1 });
    }

    #[test]
    fn test_invalid_root() {
        let mut groups = shared_groups::<f64>(2);
        let err = groups[0].broadcast(5, &mut []).unwrap_err();
        assert_eq!(err, CommError::InvalidRoot { root: 5, size: 2 });
    }

    #[test]
    fn test_abort_releases_broadcast_waiters() {
        let results = run_group(3, |mut group| {
            if group.rank() == 0 {
                group.abort();
                return Err(CommError::Aborted);
            }
            let mut buffer = vec![0.0; 1];
            group.broadcast(0, &mut buffer)
        });
        assert!(results.iter().all(|r| r == &Err(CommError::Aborted)));
    }

    #[test]
    fn test_panicking_worker_aborts_group() {
        let mut groups = shared_groups::<f64>(2);
        let mut survivor = groups.pop().unwrap();
        let doomed = groups.pop().unwrap();
        let panicker = thread::spawn(move || {
            let _group = doomed;
            panic!("worker failure");
        });
        assert!(panicker.join().is_err());
        assert_eq!(survivor.barrier(), Err(CommError::Aborted));
    }
}
