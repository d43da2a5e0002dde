//! Concurrent tagged metric registry.
//!
//! Maps [`MetricName`] to a single metric instance with get-or-create
//! semantics, kind stability per name, removal, change listeners, and
//! overlay of tagged sub-registries. Get-or-create is linearizable per
//! name through the backing map's entry API.

pub mod aggregate;
pub mod augmented;
pub mod listener;
pub mod sliding;

pub use aggregate::AggregatedMetrics;
pub use augmented::AugmentedRegistry;
pub use listener::RegistryListener;
pub use sliding::SlidingWindowRegistry;

use crate::core::{Clock, MetricsError, ReservoirConfig, Result, SystemClock};
use crate::metrics::{Counter, Gauge, Histogram, Meter, Metric, MetricKind, Timer};
use crate::name::MetricName;
use crate::registry::listener::Listeners;
use crate::reservoir::{ExponentiallyDecayingReservoir, Reservoir};
use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Builds the reservoir backing each new histogram and timer.
pub type ReservoirFactory = Arc<dyn Fn() -> Box<dyn Reservoir> + Send + Sync>;

/// Concurrent registry of tagged metrics.
pub struct TaggedMetricRegistry {
    metrics: DashMap<MetricName, Metric>,
    sub_registries: DashMap<(String, String), Arc<TaggedMetricRegistry>>,
    listeners: Listeners,
    clock: Arc<dyn Clock>,
    reservoir_factory: ReservoirFactory,
}

impl TaggedMetricRegistry {
    /// Creates a registry with default decaying reservoirs and the system
    /// clock.
    pub fn new() -> Self {
        let clock = SystemClock::shared();
        let config = ReservoirConfig::default();
        Self::with_reservoir_factory(Arc::clone(&clock), decaying_factory(config, clock))
    }

    /// Creates a registry whose histograms and timers use decaying
    /// reservoirs with the given configuration.
    pub fn with_config(config: ReservoirConfig) -> Result<Self> {
        Self::with_clock(config, SystemClock::shared())
    }

    /// Creates a registry against an explicit clock.
    pub fn with_clock(config: ReservoirConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let config = config.validate()?;
        Ok(Self::with_reservoir_factory(
            Arc::clone(&clock),
            decaying_factory(config, clock),
        ))
    }

    /// Creates a registry with a custom reservoir factory. Used by the
    /// composition registries to swap the reservoir flavor.
    pub fn with_reservoir_factory(clock: Arc<dyn Clock>, factory: ReservoirFactory) -> Self {
        Self {
            metrics: DashMap::new(),
            sub_registries: DashMap::new(),
            listeners: Listeners::new(),
            clock,
            reservoir_factory: factory,
        }
    }

    /// Process-wide convenience instance, lazily initialized.
    pub fn default_registry() -> &'static TaggedMetricRegistry {
        static DEFAULT: Lazy<TaggedMetricRegistry> = Lazy::new(TaggedMetricRegistry::new);
        &DEFAULT
    }

    /// Returns the counter registered under `name`, creating it if absent.
    pub fn counter(&self, name: MetricName) -> Result<Arc<Counter>> {
        let metric = self.get_or_create(name, MetricKind::Counter, || {
            Metric::Counter(Arc::new(Counter::new()))
        })?;
        Ok(metric.as_counter().unwrap_or_else(|| unreachable!()))
    }

    /// Returns the gauge registered under `name`, creating it from
    /// `producer` if absent. An already-registered gauge keeps its original
    /// producer.
    pub fn gauge<F>(&self, name: MetricName, producer: F) -> Result<Arc<Gauge>>
    where
        F: Fn() -> f64 + Send + Sync + 'static,
    {
        let metric = self.get_or_create(name, MetricKind::Gauge, || {
            Metric::Gauge(Arc::new(Gauge::new(producer)))
        })?;
        Ok(metric.as_gauge().unwrap_or_else(|| unreachable!()))
    }

    /// Returns the meter registered under `name`, creating it if absent.
    pub fn meter(&self, name: MetricName) -> Result<Arc<Meter>> {
        let clock = Arc::clone(&self.clock);
        let metric = self.get_or_create(name, MetricKind::Meter, || {
            Metric::Meter(Arc::new(Meter::with_clock(clock)))
        })?;
        Ok(metric.as_meter().unwrap_or_else(|| unreachable!()))
    }

    /// Returns the histogram registered under `name`, creating it if
    /// absent.
    pub fn histogram(&self, name: MetricName) -> Result<Arc<Histogram>> {
        let factory = Arc::clone(&self.reservoir_factory);
        let metric = self.get_or_create(name, MetricKind::Histogram, || {
            Metric::Histogram(Arc::new(Histogram::new(factory())))
        })?;
        Ok(metric.as_histogram().unwrap_or_else(|| unreachable!()))
    }

    /// Returns the timer registered under `name`, creating it if absent.
    pub fn timer(&self, name: MetricName) -> Result<Arc<Timer>> {
        let factory = Arc::clone(&self.reservoir_factory);
        let clock = Arc::clone(&self.clock);
        let metric = self.get_or_create(name, MetricKind::Timer, || {
            Metric::Timer(Arc::new(Timer::with_clock(factory(), clock)))
        })?;
        Ok(metric.as_timer().unwrap_or_else(|| unreachable!()))
    }

    /// Removes and returns the metric registered under `name`, notifying
    /// removal listeners.
    pub fn remove(&self, name: &MetricName) -> Option<Metric> {
        let (removed_name, metric) = self.metrics.remove(name)?;
        self.listeners.notify_removed(&removed_name, &metric);
        Some(metric)
    }

    /// Number of metrics registered directly in this registry (excludes
    /// sub-registry overlays).
    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    /// Returns true if no metrics are registered directly.
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Overlays a sub-registry: its metrics appear in enumeration with
    /// `tag_key=tag_value` injected into every name, without copying or
    /// mutating the sub-registry. Returns a previously attached registry
    /// for the same tag pair, if any.
    pub fn add_metrics(
        &self,
        tag_key: &str,
        tag_value: &str,
        registry: Arc<TaggedMetricRegistry>,
    ) -> Option<Arc<TaggedMetricRegistry>> {
        self.sub_registries
            .insert((tag_key.to_string(), tag_value.to_string()), registry)
    }

    /// Detaches a sub-registry overlay.
    pub fn remove_metrics(
        &self,
        tag_key: &str,
        tag_value: &str,
    ) -> Option<Arc<TaggedMetricRegistry>> {
        self.sub_registries
            .remove(&(tag_key.to_string(), tag_value.to_string()))
            .map(|(_, registry)| registry)
    }

    /// Eagerly enumerates all live metrics, sorted by name, including
    /// sub-registry overlays.
    pub fn get_metrics(&self) -> BTreeMap<MetricName, Metric> {
        let mut out = BTreeMap::new();
        self.for_each_metric(|name, metric| {
            out.insert(name.clone(), metric.clone());
        });
        out
    }

    /// Walks all live (name, metric) pairs, own metrics first, then each
    /// sub-registry overlay with its tag injected.
    pub fn for_each_metric<F>(&self, mut f: F)
    where
        F: FnMut(&MetricName, &Metric),
    {
        self.walk(&mut f);
    }

    fn walk(&self, f: &mut dyn FnMut(&MetricName, &Metric)) {
        for entry in self.metrics.iter() {
            f(entry.key(), entry.value());
        }
        for sub in self.sub_registries.iter() {
            let (tag_key, tag_value) = sub.key();
            sub.value().walk(&mut |name, metric| {
                match name.with_extra_tag(tag_key, tag_value) {
                    Ok(augmented) => f(&augmented, metric),
                    Err(err) => {
                        // One misconfigured sub-metric must not poison the
                        // whole enumeration.
                        tracing::warn!(
                            metric = %name,
                            tag_key,
                            error = %err,
                            "skipping sub-registry metric with conflicting tag"
                        );
                    },
                }
            });
        }
    }

    /// Registers a change listener. Dispatch order follows registration
    /// order.
    pub fn add_listener(&self, listener: Arc<dyn RegistryListener>) {
        self.listeners.add(listener);
    }

    /// Removes a listener by its name.
    pub fn remove_listener(&self, name: &str) -> Result<()> {
        self.listeners.remove(name)
    }

    fn get_or_create<F>(&self, name: MetricName, kind: MetricKind, factory: F) -> Result<Metric>
    where
        F: FnOnce() -> Metric,
    {
        // Fast path: the common case is a hit on an existing metric.
        if let Some(existing) = self.metrics.get(&name) {
            let metric = existing.value().clone();
            drop(existing);
            return Self::check_kind(name, metric, kind);
        }

        let mut created = false;
        let metric = {
            let entry = self.metrics.entry(name.clone()).or_insert_with(|| {
                created = true;
                factory()
            });
            entry.value().clone()
        };
        // Listeners fire after the shard lock is released so a listener
        // touching the registry cannot deadlock.
        if created {
            self.listeners.notify_added(&name, &metric);
            Ok(metric)
        } else {
            Self::check_kind(name, metric, kind)
        }
    }

    fn check_kind(name: MetricName, metric: Metric, requested: MetricKind) -> Result<Metric> {
        if metric.kind() == requested {
            Ok(metric)
        } else {
            Err(MetricsError::MetricKindConflict {
                name,
                existing: metric.kind(),
                requested,
            })
        }
    }
}

impl Default for TaggedMetricRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TaggedMetricRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaggedMetricRegistry")
            .field("metrics", &self.metrics.len())
            .field("sub_registries", &self.sub_registries.len())
            .finish_non_exhaustive()
    }
}

fn decaying_factory(config: ReservoirConfig, clock: Arc<dyn Clock>) -> ReservoirFactory {
    Arc::new(move || {
        Box::new(ExponentiallyDecayingReservoir::with_clock(
            config.clone(),
            Arc::clone(&clock),
        ))
    })
}
