//! Metric primitives: counters, gauges, meters, histograms, timers.
//!
//! Histograms and timers own a [`crate::reservoir::Reservoir`]; the rest
//! are thin atomic wrappers. [`Metric`] is the registry's stored union and
//! [`MetricKind`] the type tag enforced per name.

pub mod counter;
pub mod gauge;
pub mod histogram;
pub mod meter;
pub mod timer;

pub use counter::Counter;
pub use gauge::Gauge;
pub use histogram::Histogram;
pub use meter::Meter;
pub use timer::Timer;

use std::fmt;
use std::sync::Arc;

/// The concrete kind of a registered metric. A name's kind is fixed for
/// the lifetime of that name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    /// Atomic count.
    Counter,
    /// Instantaneous callback value.
    Gauge,
    /// Event rate.
    Meter,
    /// Value distribution.
    Histogram,
    /// Duration distribution plus event rate.
    Timer,
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Meter => "meter",
            MetricKind::Histogram => "histogram",
            MetricKind::Timer => "timer",
        };
        write!(f, "{}", name)
    }
}

/// A shared handle to any registered metric.
#[derive(Debug, Clone)]
pub enum Metric {
    /// A [`Counter`].
    Counter(Arc<Counter>),
    /// A [`Gauge`].
    Gauge(Arc<Gauge>),
    /// A [`Meter`].
    Meter(Arc<Meter>),
    /// A [`Histogram`].
    Histogram(Arc<Histogram>),
    /// A [`Timer`].
    Timer(Arc<Timer>),
}

impl Metric {
    /// The kind tag of this metric.
    pub fn kind(&self) -> MetricKind {
        match self {
            Metric::Counter(_) => MetricKind::Counter,
            Metric::Gauge(_) => MetricKind::Gauge,
            Metric::Meter(_) => MetricKind::Meter,
            Metric::Histogram(_) => MetricKind::Histogram,
            Metric::Timer(_) => MetricKind::Timer,
        }
    }

    /// Downcast to a counter handle.
    pub fn as_counter(&self) -> Option<Arc<Counter>> {
        match self {
            Metric::Counter(c) => Some(Arc::clone(c)),
            _ => None,
        }
    }

    /// Downcast to a gauge handle.
    pub fn as_gauge(&self) -> Option<Arc<Gauge>> {
        match self {
            Metric::Gauge(g) => Some(Arc::clone(g)),
            _ => None,
        }
    }

    /// Downcast to a meter handle.
    pub fn as_meter(&self) -> Option<Arc<Meter>> {
        match self {
            Metric::Meter(m) => Some(Arc::clone(m)),
            _ => None,
        }
    }

    /// Downcast to a histogram handle.
    pub fn as_histogram(&self) -> Option<Arc<Histogram>> {
        match self {
            Metric::Histogram(h) => Some(Arc::clone(h)),
            _ => None,
        }
    }

    /// Downcast to a timer handle.
    pub fn as_timer(&self) -> Option<Arc<Timer>> {
        match self {
            Metric::Timer(t) => Some(Arc::clone(t)),
            _ => None,
        }
    }
}
