//! Sliding-window registry decorator.
//!
//! A [`TaggedMetricRegistry`] whose histograms and timers sample over a
//! trailing time window instead of exponential decay. Everything else
//! delegates to the wrapped registry unchanged.

use crate::core::{Clock, Result, SystemClock};
use crate::metrics::{Counter, Gauge, Histogram, Meter, Metric, Timer};
use crate::name::MetricName;
use crate::registry::{RegistryListener, TaggedMetricRegistry};
use crate::reservoir::SlidingTimeWindowReservoir;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Registry producing sliding time-window reservoirs.
#[derive(Debug)]
pub struct SlidingWindowRegistry {
    inner: TaggedMetricRegistry,
    window: Duration,
}

impl SlidingWindowRegistry {
    /// Creates a registry over the given window with the system clock.
    pub fn new(window: Duration) -> Self {
        Self::with_clock(window, SystemClock::shared())
    }

    /// Creates a registry against an explicit clock.
    pub fn with_clock(window: Duration, clock: Arc<dyn Clock>) -> Self {
        let reservoir_clock = Arc::clone(&clock);
        let inner = TaggedMetricRegistry::with_reservoir_factory(
            clock,
            Arc::new(move || {
                Box::new(SlidingTimeWindowReservoir::with_clock(
                    window,
                    Arc::clone(&reservoir_clock),
                ))
            }),
        );
        Self { inner, window }
    }

    /// The trailing window applied to histograms and timers.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Counter registered in the wrapped registry.
    pub fn counter(&self, name: MetricName) -> Result<Arc<Counter>> {
        self.inner.counter(name)
    }

    /// Gauge registered in the wrapped registry.
    pub fn gauge<F>(&self, name: MetricName, producer: F) -> Result<Arc<Gauge>>
    where
        F: Fn() -> f64 + Send + Sync + 'static,
    {
        self.inner.gauge(name, producer)
    }

    /// Meter registered in the wrapped registry.
    pub fn meter(&self, name: MetricName) -> Result<Arc<Meter>> {
        self.inner.meter(name)
    }

    /// Histogram sampling over the trailing window.
    pub fn histogram(&self, name: MetricName) -> Result<Arc<Histogram>> {
        self.inner.histogram(name)
    }

    /// Timer sampling over the trailing window.
    pub fn timer(&self, name: MetricName) -> Result<Arc<Timer>> {
        self.inner.timer(name)
    }

    /// Removes a metric from the wrapped registry.
    pub fn remove(&self, name: &MetricName) -> Option<Metric> {
        self.inner.remove(name)
    }

    /// Enumerates the wrapped registry's metrics.
    pub fn get_metrics(&self) -> BTreeMap<MetricName, Metric> {
        self.inner.get_metrics()
    }

    /// Registers a change listener on the wrapped registry.
    pub fn add_listener(&self, listener: Arc<dyn RegistryListener>) {
        self.inner.add_listener(listener);
    }

    /// Removes a listener from the wrapped registry.
    pub fn remove_listener(&self, name: &str) -> Result<()> {
        self.inner.remove_listener(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ManualClock;

    #[test]
    fn test_histogram_forgets_samples_outside_window() {
        let clock = Arc::new(ManualClock::new());
        let registry = SlidingWindowRegistry::with_clock(
            Duration::from_secs(30),
            Arc::clone(&clock) as Arc<dyn Clock>,
        );

        let histogram = registry.histogram(MetricName::of("lat")).unwrap();
        histogram.update(100);
        clock.advance_seconds(10);
        histogram.update(200);

        assert_eq!(histogram.snapshot().values(), &[100, 200]);

        clock.advance_seconds(25); // first sample is now 35s old
        assert_eq!(histogram.snapshot().values(), &[200]);

        clock.advance_seconds(30);
        let snapshot = histogram.snapshot();
        assert_eq!(snapshot.size(), 0);
        assert_eq!(snapshot.max(), 0);
        // Total count is unaffected by window expiry.
        assert_eq!(histogram.count(), 2);
    }

    #[test]
    fn test_counters_behave_normally() {
        let registry = SlidingWindowRegistry::new(Duration::from_secs(60));
        let counter = registry.counter(MetricName::of("hits")).unwrap();
        counter.inc();
        assert_eq!(counter.count(), 1);
        assert_eq!(registry.get_metrics().len(), 1);
    }
}
