//! Read-only aggregation view over multiple registries.

use crate::metrics::Metric;
use crate::name::MetricName;
use crate::registry::TaggedMetricRegistry;
use std::sync::Arc;

/// Enumerates the metrics of several registries as one merged, name-sorted
/// listing. Registries are neither copied nor mutated; duplicate names
/// across sources are all reported rather than collapsed.
#[derive(Debug, Default)]
pub struct AggregatedMetrics {
    sources: Vec<Arc<TaggedMetricRegistry>>,
}

impl AggregatedMetrics {
    /// Creates an aggregation over the given registries.
    pub fn new(sources: Vec<Arc<TaggedMetricRegistry>>) -> Self {
        Self { sources }
    }

    /// Adds another source registry to the view.
    pub fn add_registry(&mut self, registry: Arc<TaggedMetricRegistry>) {
        self.sources.push(registry);
    }

    /// Number of source registries.
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// All (name, metric) pairs across sources, sorted by name. Duplicate
    /// names appear once per source holding them.
    pub fn metrics(&self) -> Vec<(MetricName, Metric)> {
        let mut out = Vec::new();
        for source in &self.sources {
            source.for_each_metric(|name, metric| {
                out.push((name.clone(), metric.clone()));
            });
        }
        out.sort_by(|(a, _), (b, _)| a.cmp(b));
        out
    }

    /// Walks every (name, metric) pair, source by source.
    pub fn for_each_metric<F>(&self, mut f: F)
    where
        F: FnMut(&MetricName, &Metric),
    {
        for source in &self.sources {
            source.for_each_metric(&mut f);
        }
    }
}
