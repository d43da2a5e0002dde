//! Callback gauge: reads a value from a caller-supplied producer.

use std::fmt;

/// A gauge reports the instantaneous value of its producer closure.
pub struct Gauge {
    producer: Box<dyn Fn() -> f64 + Send + Sync>,
}

impl Gauge {
    /// Creates a gauge from a producer closure.
    pub fn new<F>(producer: F) -> Self
    where
        F: Fn() -> f64 + Send + Sync + 'static,
    {
        Self {
            producer: Box::new(producer),
        }
    }

    /// Evaluates the producer.
    pub fn value(&self) -> f64 {
        (self.producer)()
    }
}

impl fmt::Debug for Gauge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gauge").finish_non_exhaustive()
    }
}
