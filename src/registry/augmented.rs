//! Tag-injecting registry decorator.
//!
//! Every metric created through an [`AugmentedRegistry`] gets a fixed set
//! of extra tags stamped into its name before the inner registry sees it.
//! Useful for pinning deployment-level tags (host, shard, region) once
//! instead of at every call site.

use crate::core::Result;
use crate::metrics::{Counter, Gauge, Histogram, Meter, Metric, Timer};
use crate::name::{MetricName, TagMap};
use crate::registry::TaggedMetricRegistry;
use std::sync::Arc;

/// Decorator that injects fixed tags into every created metric name.
#[derive(Debug)]
pub struct AugmentedRegistry {
    inner: Arc<TaggedMetricRegistry>,
    extra_tags: TagMap,
}

impl AugmentedRegistry {
    /// Wraps `inner`, injecting `extra_tags` into every name.
    pub fn new(inner: Arc<TaggedMetricRegistry>, extra_tags: TagMap) -> Self {
        Self { inner, extra_tags }
    }

    /// The tags injected by this decorator.
    pub fn extra_tags(&self) -> &TagMap {
        &self.extra_tags
    }

    /// The wrapped registry.
    pub fn inner(&self) -> &Arc<TaggedMetricRegistry> {
        &self.inner
    }

    fn augment(&self, name: MetricName) -> Result<MetricName> {
        let mut augmented = name;
        for (key, value) in self.extra_tags.iter() {
            augmented = augmented.with_extra_tag(key, value)?;
        }
        Ok(augmented)
    }

    /// Counter under the augmented name.
    pub fn counter(&self, name: MetricName) -> Result<Arc<Counter>> {
        self.inner.counter(self.augment(name)?)
    }

    /// Gauge under the augmented name.
    pub fn gauge<F>(&self, name: MetricName, producer: F) -> Result<Arc<Gauge>>
    where
        F: Fn() -> f64 + Send + Sync + 'static,
    {
        self.inner.gauge(self.augment(name)?, producer)
    }

    /// Meter under the augmented name.
    pub fn meter(&self, name: MetricName) -> Result<Arc<Meter>> {
        self.inner.meter(self.augment(name)?)
    }

    /// Histogram under the augmented name.
    pub fn histogram(&self, name: MetricName) -> Result<Arc<Histogram>> {
        self.inner.histogram(self.augment(name)?)
    }

    /// Timer under the augmented name.
    pub fn timer(&self, name: MetricName) -> Result<Arc<Timer>> {
        self.inner.timer(self.augment(name)?)
    }

    /// Removes the metric under the augmented name.
    pub fn remove(&self, name: MetricName) -> Result<Option<Metric>> {
        Ok(self.inner.remove(&self.augment(name)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MetricsError;

    fn augmented() -> AugmentedRegistry {
        AugmentedRegistry::new(
            Arc::new(TaggedMetricRegistry::new()),
            [("host", "web-1"), ("region", "eu")].into_iter().collect(),
        )
    }

    #[test]
    fn test_created_names_carry_extra_tags() {
        let registry = augmented();
        registry
            .counter(MetricName::builder("req").tag("code", "200").build())
            .unwrap();

        let metrics = registry.inner().get_metrics();
        let name = metrics.keys().next().unwrap();
        assert_eq!(name.tags().get("host"), Some("web-1"));
        assert_eq!(name.tags().get("region"), Some("eu"));
        assert_eq!(name.tags().get("code"), Some("200"));
    }

    #[test]
    fn test_same_instance_via_decorator_and_inner() {
        let registry = augmented();
        let via_decorator = registry.counter(MetricName::of("req")).unwrap();
        let via_inner = registry
            .inner()
            .counter(
                MetricName::builder("req")
                    .tag("host", "web-1")
                    .tag("region", "eu")
                    .build(),
            )
            .unwrap();
        assert!(Arc::ptr_eq(&via_decorator, &via_inner));
    }

    #[test]
    fn test_conflicting_caller_tag_rejected() {
        let registry = augmented();
        let err = registry
            .counter(MetricName::builder("req").tag("host", "other").build())
            .unwrap_err();
        assert!(matches!(err, MetricsError::DuplicateTagKey { .. }));
    }

    #[test]
    fn test_identical_caller_tag_accepted() {
        let registry = augmented();
        registry
            .counter(MetricName::builder("req").tag("host", "web-1").build())
            .unwrap();
    }

    #[test]
    fn test_remove_through_decorator() {
        let registry = augmented();
        registry.counter(MetricName::of("req")).unwrap();
        assert!(registry.remove(MetricName::of("req")).unwrap().is_some());
        assert!(registry.inner().is_empty());
    }
}
