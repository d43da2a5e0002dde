//! Monotonic-or-not integer counter.

use std::sync::atomic::{AtomicI64, Ordering};

/// A simple atomic counter.
#[derive(Debug, Default)]
pub struct Counter {
    count: AtomicI64,
}

impl Counter {
    /// Creates a counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments by one.
    pub fn inc(&self) {
        self.add(1);
    }

    /// Decrements by one.
    pub fn dec(&self) {
        self.add(-1);
    }

    /// Adds `n` (may be negative).
    pub fn add(&self, n: i64) {
        self.count.fetch_add(n, Ordering::Relaxed);
    }

    /// Current count.
    pub fn count(&self) -> i64 {
        self.count.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_counter_basics() {
        let counter = Counter::new();
        assert_eq!(counter.count(), 0);

        counter.inc();
        counter.inc();
        counter.add(5);
        counter.dec();
        assert_eq!(counter.count(), 6);

        counter.add(-10);
        assert_eq!(counter.count(), -4);
    }

    #[test]
    fn test_counter_concurrent() {
        let counter = Arc::new(Counter::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let counter = Arc::clone(&counter);
            handles.push(std::thread::spawn(move || {
                for _ in 0..10_000 {
                    counter.inc();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(counter.count(), 80_000);
    }
}
