//! Event-rate meter with exponentially weighted moving averages.
//!
//! Tracks a total count plus mean and 1/5/15-minute EWMA rates, ticked on
//! a five-second interval against the injected clock. Rates live in
//! atomic f64-bit cells; the tick itself is claimed by a compare-and-swap
//! on the last-tick timestamp so exactly one caller advances the EWMAs per
//! elapsed interval.

use crate::core::{Clock, SystemClock, NANOS_PER_SECOND};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;

const TICK_INTERVAL_NANOS: i64 = 5 * NANOS_PER_SECOND;
const SECONDS_PER_TICK: f64 = 5.0;

/// One exponentially weighted moving average cell.
struct Ewma {
    alpha: f64,
    uncounted: AtomicI64,
    // f64 bits of the per-nanosecond rate.
    rate_bits: AtomicU64,
    initialized: AtomicBool,
}

impl Ewma {
    fn over_minutes(minutes: f64) -> Self {
        Self {
            alpha: 1.0 - (-SECONDS_PER_TICK / 60.0 / minutes).exp(),
            uncounted: AtomicI64::new(0),
            rate_bits: AtomicU64::new(0),
            initialized: AtomicBool::new(false),
        }
    }

    fn update(&self, n: i64) {
        self.uncounted.fetch_add(n, Ordering::Relaxed);
    }

    // Called by the single tick winner, so a plain store is enough.
    fn tick(&self) {
        let count = self.uncounted.swap(0, Ordering::Relaxed);
        let instant_rate = count as f64 / (TICK_INTERVAL_NANOS as f64);
        if self.initialized.load(Ordering::Relaxed) {
            let rate = f64::from_bits(self.rate_bits.load(Ordering::Relaxed));
            let next = rate + self.alpha * (instant_rate - rate);
            self.rate_bits.store(next.to_bits(), Ordering::Relaxed);
        } else {
            self.rate_bits.store(instant_rate.to_bits(), Ordering::Relaxed);
            self.initialized.store(true, Ordering::Relaxed);
        }
    }

    fn rate_per_second(&self) -> f64 {
        f64::from_bits(self.rate_bits.load(Ordering::Relaxed)) * NANOS_PER_SECOND as f64
    }
}

/// Measures the rate at which events occur.
pub struct Meter {
    clock: Arc<dyn Clock>,
    start_tick: i64,
    last_tick: AtomicI64,
    count: AtomicI64,
    m1: Ewma,
    m5: Ewma,
    m15: Ewma,
}

impl Meter {
    /// Creates a meter on the system clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock::shared())
    }

    /// Creates a meter against an explicit clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        let start = clock.now_nanos();
        Self {
            clock,
            start_tick: start,
            last_tick: AtomicI64::new(start),
            count: AtomicI64::new(0),
            m1: Ewma::over_minutes(1.0),
            m5: Ewma::over_minutes(5.0),
            m15: Ewma::over_minutes(15.0),
        }
    }

    /// Marks one event.
    pub fn mark(&self) {
        self.mark_n(1);
    }

    /// Marks `n` events.
    pub fn mark_n(&self, n: i64) {
        self.tick_if_necessary();
        self.count.fetch_add(n, Ordering::Relaxed);
        self.m1.update(n);
        self.m5.update(n);
        self.m15.update(n);
    }

    /// Total events marked.
    pub fn count(&self) -> i64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Average rate since creation, events per second.
    pub fn mean_rate(&self) -> f64 {
        let count = self.count();
        if count == 0 {
            return 0.0;
        }
        let elapsed = (self.clock.now_nanos() - self.start_tick) as f64;
        if elapsed <= 0.0 {
            return 0.0;
        }
        count as f64 * NANOS_PER_SECOND as f64 / elapsed
    }

    /// One-minute EWMA rate, events per second.
    pub fn one_minute_rate(&self) -> f64 {
        self.tick_if_necessary();
        self.m1.rate_per_second()
    }

    /// Five-minute EWMA rate, events per second.
    pub fn five_minute_rate(&self) -> f64 {
        self.tick_if_necessary();
        self.m5.rate_per_second()
    }

    /// Fifteen-minute EWMA rate, events per second.
    pub fn fifteen_minute_rate(&self) -> f64 {
        self.tick_if_necessary();
        self.m15.rate_per_second()
    }

    /// Catches the EWMAs up with elapsed five-second intervals. The CAS on
    /// `last_tick` elects exactly one caller to apply the missed ticks.
    fn tick_if_necessary(&self) {
        let old_tick = self.last_tick.load(Ordering::Acquire);
        let new_tick = self.clock.now_nanos();
        let age = new_tick - old_tick;
        if age > TICK_INTERVAL_NANOS {
            let interval_start = new_tick - age % TICK_INTERVAL_NANOS;
            if self
                .last_tick
                .compare_exchange(old_tick, interval_start, Ordering::AcqRel, Ordering::Relaxed)
                .is_ok()
            {
                let required_ticks = age / TICK_INTERVAL_NANOS;
                for _ in 0..required_ticks {
                    self.m1.tick();
                    self.m5.tick();
                    self.m15.tick();
                }
            }
        }
    }
}

impl Default for Meter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Meter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Meter")
            .field("count", &self.count())
            .finish_non_exhaustive()
    }
}
