//! Sliding time-window reservoir.
//!
//! Keeps every sample observed in the trailing window and nothing older.
//! Backed by a mutex-guarded deque: this reservoir exists for the
//! sliding-window registry decorator, which is explicitly not on the
//! lock-free hot path the decaying reservoir serves.

use crate::core::{Clock, SystemClock};
use crate::reservoir::{Reservoir, Snapshot};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

/// Reservoir retaining all samples from the trailing time window.
pub struct SlidingTimeWindowReservoir {
    window_nanos: i64,
    clock: Arc<dyn Clock>,
    samples: Mutex<VecDeque<(i64, i64)>>, // (tick, value), ticks ascending
}

impl SlidingTimeWindowReservoir {
    /// Creates a reservoir over the given window with the system clock.
    pub fn new(window: Duration) -> Self {
        Self::with_clock(window, SystemClock::shared())
    }

    /// Creates a reservoir against an explicit clock.
    pub fn with_clock(window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            window_nanos: window.as_nanos().min(i64::MAX as u128) as i64,
            clock,
            samples: Mutex::new(VecDeque::new()),
        }
    }

    fn trim(&self, samples: &mut VecDeque<(i64, i64)>, now: i64) {
        let horizon = now - self.window_nanos;
        while samples.front().is_some_and(|(tick, _)| *tick <= horizon) {
            samples.pop_front();
        }
    }
}

impl Reservoir for SlidingTimeWindowReservoir {
    fn size(&self) -> usize {
        let now = self.clock.now_nanos();
        let mut samples = self.samples.lock();
        self.trim(&mut samples, now);
        samples.len()
    }

    fn update(&self, value: i64) {
        let now = self.clock.now_nanos();
        let mut samples = self.samples.lock();
        self.trim(&mut samples, now);
        samples.push_back((now, value));
    }

    fn snapshot(&self) -> Snapshot {
        let now = self.clock.now_nanos();
        let mut samples = self.samples.lock();
        self.trim(&mut samples, now);
        Snapshot::from_values(samples.iter().map(|(_, value)| *value).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ManualClock;

    fn windowed(seconds: u64, clock: &Arc<ManualClock>) -> SlidingTimeWindowReservoir {
        SlidingTimeWindowReservoir::with_clock(
            Duration::from_secs(seconds),
            Arc::clone(clock) as Arc<dyn Clock>,
        )
    }

    #[test]
    fn test_retains_window_contents() {
        let clock = Arc::new(ManualClock::new());
        let r = windowed(10, &clock);

        r.update(1);
        clock.advance_seconds(1);
        r.update(2);

        assert_eq!(r.size(), 2);
        assert_eq!(r.snapshot().values(), &[1, 2]);
    }

    #[test]
    fn test_expires_old_samples() {
        let clock = Arc::new(ManualClock::new());
        let r = windowed(10, &clock);

        r.update(1);
        clock.advance_seconds(6);
        r.update(2);
        clock.advance_seconds(6); // first sample now 12s old

        assert_eq!(r.snapshot().values(), &[2]);
        clock.advance_seconds(6);
        assert_eq!(r.size(), 0);
        assert_eq!(r.snapshot().max(), 0);
    }

    #[test]
    fn test_boundary_is_exclusive() {
        let clock = Arc::new(ManualClock::new());
        let r = windowed(10, &clock);

        r.update(7);
        clock.advance_seconds(10); // exactly the window edge
        assert_eq!(r.size(), 0);
    }
}
