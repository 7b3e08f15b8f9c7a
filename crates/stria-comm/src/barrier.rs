//! Reusable generational barrier.
//!
//! The barrier trips when `parties` callers have arrived and then resets for
//! the next generation. Exactly one caller observes `is_leader = true` per
//! generation. Aborting the barrier releases every current and future waiter
//! with [`CommError::Aborted`].

use parking_lot::{Condvar, Mutex};

use crate::error::CommError;

#[derive(Debug)]
struct BarrierState {
    arrived: usize,
    generation: u64,
    aborted: bool,
}

/// Barrier for N-way rendezvous, reusable across any number of episodes.
#[derive(Debug)]
pub struct Barrier {
    parties: usize,
    state: Mutex<BarrierState>,
    released: Condvar,
}

impl Barrier {
    /// Creates a new barrier that trips when `parties` have arrived.
    ///
    /// # Panics
    ///
    /// Panics if `parties == 0`.
    #[must_use]
    pub fn new(parties: usize) -> Self {
        assert!(parties > 0, "barrier requires at least 1 party");
        Self {
            parties,
            state: Mutex::new(BarrierState {
                arrived: 0,
                generation: 0,
                aborted: false,
            }),
            released: Condvar::new(),
        }
    }

    /// Returns the number of parties required to trip the barrier.
    #[must_use]
    pub fn parties(&self) -> usize {
        self.parties
    }

    /// Blocks until all parties have arrived for the current generation.
    ///
    /// # Errors
    ///
    /// Returns [`CommError::Aborted`] if the barrier was aborted before or
    /// while waiting.
    pub fn wait(&self) -> Result<BarrierWaitResult, CommError> {
        let mut state = self.state.lock();
        if state.aborted {
            return Err(CommError::Aborted);
        }

        let generation = state.generation;
        state.arrived += 1;
        if state.arrived == self.parties {
            state.arrived = 0;
            state.generation = state.generation.wrapping_add(1);
            self.released.notify_all();
            return Ok(BarrierWaitResult { is_leader: true });
        }

        while state.generation == generation && !state.aborted {
            self.released.wait(&mut state);
        }

        if state.generation == generation {
            Err(CommError::Aborted)
        } else {
            Ok(BarrierWaitResult { is_leader: false })
        }
    }

    /// Aborts the barrier, waking every waiter.
    pub fn abort(&self) {
        let mut state = self.state.lock();
        state.aborted = true;
        self.released.notify_all();
    }

    /// Returns true once the barrier has been aborted.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.state.lock().aborted
    }
}

/// Result of a barrier wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarrierWaitResult {
    is_leader: bool,
}

impl BarrierWaitResult {
    /// Creates a result; used by group realizations without a [`Barrier`].
    #[must_use]
    pub const fn new(is_leader: bool) -> Self {
        Self { is_leader }
    }

    /// Returns true for exactly one party (the leader) each generation.
    #[must_use]
    pub fn is_leader(&self) -> bool {
        self.is_leader
    }
}
