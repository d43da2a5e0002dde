//! Value-distribution histogram backed by a reservoir.

use crate::reservoir::{Reservoir, Snapshot};
use std::sync::atomic::{AtomicI64, Ordering};

/// Tracks the statistical distribution of recorded values.
pub struct Histogram {
    count: AtomicI64,
    reservoir: Box<dyn Reservoir>,
}

impl Histogram {
    /// Creates a histogram over the given reservoir.
    pub fn new(reservoir: Box<dyn Reservoir>) -> Self {
        Self {
            count: AtomicI64::new(0),
            reservoir,
        }
    }

    /// Records a value.
    pub fn update(&self, value: i64) {
        self.count.fetch_add(1, Ordering::Relaxed);
        self.reservoir.update(value);
    }

    /// Total number of recorded values (not bounded by reservoir size).
    pub fn count(&self) -> i64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Point-in-time view of the retained sample distribution.
    pub fn snapshot(&self) -> Snapshot {
        self.reservoir.snapshot()
    }
}

impl std::fmt::Debug for Histogram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Histogram")
            .field("count", &self.count())
            .finish_non_exhaustive()
    }
}
