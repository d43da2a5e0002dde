//! Duration timer: a histogram of nanosecond durations plus a rate meter.

use crate::core::{Clock, SystemClock};
use crate::metrics::{Histogram, Meter};
use crate::reservoir::{Reservoir, Snapshot};
use std::sync::Arc;
use std::time::Duration;

/// Measures how long events take and how often they occur.
pub struct Timer {
    histogram: Histogram,
    meter: Meter,
    clock: Arc<dyn Clock>,
}

impl Timer {
    /// Creates a timer over the given reservoir with the system clock.
    pub fn new(reservoir: Box<dyn Reservoir>) -> Self {
        Self::with_clock(reservoir, SystemClock::shared())
    }

    /// Creates a timer against an explicit clock.
    pub fn with_clock(reservoir: Box<dyn Reservoir>, clock: Arc<dyn Clock>) -> Self {
        Self {
            histogram: Histogram::new(reservoir),
            meter: Meter::with_clock(Arc::clone(&clock)),
            clock,
        }
    }

    /// Records one event of the given duration.
    pub fn update(&self, duration: Duration) {
        self.histogram
            .update(duration.as_nanos().min(i64::MAX as u128) as i64);
        self.meter.mark();
    }

    /// Times the closure and records its duration.
    pub fn time<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let start = self.clock.now_nanos();
        let result = f();
        let elapsed = self.clock.now_nanos() - start;
        self.update(Duration::from_nanos(elapsed.max(0) as u64));
        result
    }

    /// Number of recorded events.
    pub fn count(&self) -> i64 {
        self.histogram.count()
    }

    /// Average event rate since creation, per second.
    pub fn mean_rate(&self) -> f64 {
        self.meter.mean_rate()
    }

    /// One-minute EWMA event rate, per second.
    pub fn one_minute_rate(&self) -> f64 {
        self.meter.one_minute_rate()
    }

    /// Five-minute EWMA event rate, per second.
    pub fn five_minute_rate(&self) -> f64 {
        self.meter.five_minute_rate()
    }

    /// Fifteen-minute EWMA event rate, per second.
    pub fn fifteen_minute_rate(&self) -> f64 {
        self.meter.fifteen_minute_rate()
    }

    /// Distribution of recorded durations, in nanoseconds.
    pub fn snapshot(&self) -> Snapshot {
        self.histogram.snapshot()
    }
}

impl std::fmt::Debug for Timer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timer")
            .field("count", &self.count())
            .finish_non_exhaustive()
    }
}
