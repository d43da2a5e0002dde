//! Registry change listeners.
//!
//! The listener list is copy-on-write behind an atomic swap, so listener
//! registration and removal never block metric recording. Dispatch is
//! synchronous and in registration order; a panicking listener is caught
//! and logged so it can neither starve later listeners nor poison the
//! registry.

use crate::core::{MetricsError, Result};
use crate::metrics::Metric;
use crate::name::MetricName;
use arc_swap::ArcSwap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Observes metrics entering and leaving a registry.
///
/// `name` identifies the listener for removal; the notification hooks have
/// empty defaults so implementors override only what they need.
pub trait RegistryListener: Send + Sync {
    /// Identity used by `remove_listener`.
    fn name(&self) -> &str;

    /// Called after a metric is added.
    fn on_metric_added(&self, _name: &MetricName, _metric: &Metric) {}

    /// Called after a metric is removed.
    fn on_metric_removed(&self, _name: &MetricName, _metric: &Metric) {}
}

type ListenerList = Vec<Arc<dyn RegistryListener>>;

/// Copy-on-write listener collection.
pub(crate) struct Listeners {
    inner: ArcSwap<ListenerList>,
}

impl Listeners {
    pub(crate) fn new() -> Self {
        Self {
            inner: ArcSwap::from_pointee(Vec::new()),
        }
    }

    pub(crate) fn add(&self, listener: Arc<dyn RegistryListener>) {
        self.inner.rcu(|current| {
            let mut next = ListenerList::clone(current);
            next.push(Arc::clone(&listener));
            next
        });
    }

    pub(crate) fn remove(&self, name: &str) -> Result<()> {
        loop {
            let current = self.inner.load_full();
            let Some(idx) = current.iter().position(|l| l.name() == name) else {
                return Err(MetricsError::ListenerNotFound(name.to_string()));
            };
            let mut next = ListenerList::clone(&current);
            next.remove(idx);
            let previous = self.inner.compare_and_swap(&current, Arc::new(next));
            if Arc::ptr_eq(&*previous, &current) {
                return Ok(());
            }
        }
    }

    pub(crate) fn notify_added(&self, name: &MetricName, metric: &Metric) {
        for listener in self.inner.load().iter() {
            if catch_unwind(AssertUnwindSafe(|| listener.on_metric_added(name, metric))).is_err() {
                tracing::warn!(
                    listener = listener.name(),
                    metric = %name,
                    "listener panicked during add notification"
                );
            }
        }
    }

    pub(crate) fn notify_removed(&self, name: &MetricName, metric: &Metric) {
        for listener in self.inner.load().iter() {
            if catch_unwind(AssertUnwindSafe(|| listener.on_metric_removed(name, metric))).is_err()
            {
                tracing::warn!(
                    listener = listener.name(),
                    metric = %name,
                    "listener panicked during remove notification"
                );
            }
        }
    }
}
