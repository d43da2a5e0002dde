//! Tagged metric registry with lock-free decaying reservoirs.
//!
//! This crate maintains counters, gauges, meters, histograms and timers
//! keyed by a tagged metric name, backing histograms and timers with a
//! statistically sound, memory-bounded sample reservoir that decays old
//! data over time.
//!
//! # Features
//!
//! - **Tagged names**: metric identity is a name string plus a sorted,
//!   immutable tag set with cheap structural equality and cached hashing
//! - **Decaying reservoirs**: lock-free exponentially decaying weighted
//!   sampling with periodic rescaling, plus an exemplar-capturing variant
//! - **Kind-stable registry**: per-name get-or-create with kind conflicts
//!   surfaced as errors, change listeners, and tagged sub-registry overlay
//! - **Composable**: sliding-window, tag-injecting and multi-registry
//!   aggregation decorators over the same registry surface
//!
//! # Example
//!
//! ```
//! use tagged_metrics::{MetricName, TaggedMetricRegistry};
//! use std::time::Duration;
//!
//! let registry = TaggedMetricRegistry::new();
//! let timer = registry
//!     .timer(MetricName::builder("handler.latency").tag("endpoint", "/api").build())
//!     .unwrap();
//!
//! timer.update(Duration::from_millis(17));
//! let snapshot = timer.snapshot();
//! assert_eq!(snapshot.size(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod core;
pub mod metrics;
pub mod name;
pub mod registry;
pub mod reservoir;

// Re-export the main surface for convenience
pub use crate::core::{Clock, ManualClock, MetricsError, ReservoirConfig, Result, SystemClock};
pub use crate::metrics::{Counter, Gauge, Histogram, Meter, Metric, MetricKind, Timer};
pub use crate::name::{MetricName, TagMap};
pub use crate::registry::{
    AggregatedMetrics, AugmentedRegistry, RegistryListener, SlidingWindowRegistry,
    TaggedMetricRegistry,
};
pub use crate::reservoir::{
    Exemplar, ExemplarReservoir, ExponentiallyDecayingReservoir, Reservoir,
    SlidingTimeWindowReservoir, Snapshot,
};
