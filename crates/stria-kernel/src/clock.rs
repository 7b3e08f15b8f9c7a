//! Wall-clock sources for timing the elimination phase.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// A monotonic time source.
pub trait Clock: Sync {
    /// Returns the time elapsed since an arbitrary fixed origin.
    fn now(&self) -> Duration;
}

/// Monotonic system clock.
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Creates a clock whose origin is now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// A clock that advances by a fixed tick on every reading.
#[derive(Debug)]
pub struct ManualClock {
    nanos: AtomicU64,
    tick: u64,
}

impl ManualClock {
    /// Creates a clock starting at zero that advances by `tick` per reading.
    #[must_use]
    pub fn new(tick: Duration) -> Self {
        Self {
            nanos: AtomicU64::new(0),
            tick: u64::try_from(tick.as_nanos()).unwrap_or(u64::MAX),
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.fetch_add(self.tick, Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }

    #[test]
    fn test_manual_clock_ticks() {
        let clock = ManualClock::new(Duration::from_millis(2));
        assert_eq!(clock.now(), Duration::ZERO);
        assert_eq!(clock.now(), Duration::from_millis(2));
        assert_eq!(clock.now(), Duration::from_millis(4));
    }
}
