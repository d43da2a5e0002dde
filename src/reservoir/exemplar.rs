//! Exemplar-capturing variant of the decaying reservoir.
//!
//! Identical sampling behaviour, but every accepted sample also captures a
//! piece of caller-provided metadata (a trace id, say) at insertion time.
//! Snapshot consumers can then correlate a statistically selected sample
//! back to the request that produced it.

use crate::core::{Clock, ReservoirConfig, SystemClock};
use crate::reservoir::decaying::DecayingCore;
use crate::reservoir::{Reservoir, Snapshot};
use std::sync::Arc;

/// A sample with the metadata captured when it entered the reservoir.
#[derive(Debug, Clone, PartialEq)]
pub struct Exemplar<M> {
    /// The recorded value.
    pub value: i64,
    /// The sample's decay weight at capture time.
    pub weight: f64,
    /// Metadata returned by the provider when the sample was accepted.
    pub metadata: M,
}

/// Zero-argument metadata provider, invoked only when a sample is accepted
/// into the reservoir. Returning `None` records the sample without an
/// exemplar.
pub type ExemplarProvider<M> = Arc<dyn Fn() -> Option<M> + Send + Sync>;

/// Decaying reservoir that captures exemplar metadata per retained sample.
pub struct ExemplarReservoir<M> {
    core: DecayingCore<M>,
    provider: ExemplarProvider<M>,
}

impl<M: Clone + Send + Sync + 'static> ExemplarReservoir<M> {
    /// Creates a reservoir with default configuration and the system clock.
    pub fn new(provider: ExemplarProvider<M>) -> Self {
        Self::with_config(ReservoirConfig::default(), provider)
    }

    /// Creates a reservoir with the given configuration.
    pub fn with_config(config: ReservoirConfig, provider: ExemplarProvider<M>) -> Self {
        Self::with_clock(config, SystemClock::shared(), provider)
    }

    /// Creates a reservoir against an explicit clock.
    pub fn with_clock(
        config: ReservoirConfig,
        clock: Arc<dyn Clock>,
        provider: ExemplarProvider<M>,
    ) -> Self {
        Self {
            core: DecayingCore::new(config, clock),
            provider,
        }
    }

    /// Snapshot plus the exemplars of every retained sample that carries
    /// metadata. Samples whose provider returned `None` are omitted from
    /// the exemplar list but still count toward the snapshot.
    pub fn snapshot_with_exemplars(&self) -> (Snapshot, Vec<Exemplar<M>>) {
        let entries = self.core.weighted_entries();
        let exemplars = entries
            .iter()
            .filter_map(|(value, weight, metadata)| {
                metadata.as_ref().map(|m| Exemplar {
                    value: *value,
                    weight: *weight,
                    metadata: m.clone(),
                })
            })
            .collect();
        let snapshot = Snapshot::from_weighted(
            entries
                .into_iter()
                .map(|(value, weight, _)| (value, weight))
                .collect(),
        );
        (snapshot, exemplars)
    }
}

impl<M: Clone + Send + Sync + 'static> Reservoir for ExemplarReservoir<M> {
    fn size(&self) -> usize {
        self.core.size()
    }

    fn update(&self, value: i64) {
        self.core.update_with(value, || (self.provider)());
    }

    fn snapshot(&self) -> Snapshot {
        self.snapshot_with_exemplars().0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ManualClock;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Duration;

    fn small_config() -> ReservoirConfig {
        ReservoirConfig {
            capacity: 32,
            alpha: 0.015,
            rescale_threshold: Duration::from_secs(3600),
        }
    }

    #[test]
    fn test_exemplar_per_retained_sample() {
        let clock = Arc::new(ManualClock::new());
        let counter = Arc::new(AtomicU64::new(0));
        let provider_counter = Arc::clone(&counter);
        let r = ExemplarReservoir::with_clock(
            small_config(),
            Arc::clone(&clock) as Arc<dyn Clock>,
            Arc::new(move || Some(provider_counter.fetch_add(1, Ordering::SeqCst))),
        );

        for i in 0..10 {
            r.update(i);
        }

        let (snapshot, exemplars) = r.snapshot_with_exemplars();
        assert_eq!(snapshot.size(), 10);
        assert_eq!(exemplars.len(), snapshot.size());

        // Metadata reflects insertion order capture, not snapshot time.
        let mut seen: Vec<u64> = exemplars.iter().map(|e| e.metadata).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_none_metadata_omitted_from_listing() {
        let clock = Arc::new(ManualClock::new());
        let toggle = Arc::new(AtomicU64::new(0));
        let provider_toggle = Arc::clone(&toggle);
        let r = ExemplarReservoir::with_clock(
            small_config(),
            Arc::clone(&clock) as Arc<dyn Clock>,
            Arc::new(move || {
                let n = provider_toggle.fetch_add(1, Ordering::SeqCst);
                if n % 2 == 0 {
                    Some(format!("trace-{}", n))
                } else {
                    None
                }
            }),
        );

        for i in 0..10 {
            r.update(i);
        }

        let (snapshot, exemplars) = r.snapshot_with_exemplars();
        assert_eq!(snapshot.size(), 10);
        assert_eq!(exemplars.len(), 5);
        assert!(exemplars.iter().all(|e| e.metadata.starts_with("trace-")));
    }

    #[test]
    fn test_provider_not_called_for_rejected_samples() {
        let clock = Arc::new(ManualClock::new());
        let calls = Arc::new(AtomicU64::new(0));
        let provider_calls = Arc::clone(&calls);
        let config = ReservoirConfig {
            capacity: 8,
            ..small_config()
        };
        let r = ExemplarReservoir::with_clock(
            config,
            Arc::clone(&clock) as Arc<dyn Clock>,
            Arc::new(move || Some(provider_calls.fetch_add(1, Ordering::SeqCst))),
        );

        // Far more updates than capacity, no elapsed time: most updates
        // lose the priority draw and must not touch the provider.
        for i in 0..10_000 {
            r.update(i);
        }

        let accepted = calls.load(Ordering::SeqCst);
        assert!(accepted < 10_000, "provider ran for rejected samples");
        assert!(accepted >= 8);
    }

    #[test]
    fn test_exemplars_survive_rescale() {
        let clock = Arc::new(ManualClock::new());
        let r = ExemplarReservoir::with_clock(
            small_config(),
            Arc::clone(&clock) as Arc<dyn Clock>,
            Arc::new(|| Some("ctx".to_string())),
        );

        for i in 0..5 {
            r.update(i);
        }
        clock.advance_seconds(3600); // force a rescale on next read

        let (snapshot, exemplars) = r.snapshot_with_exemplars();
        assert_eq!(exemplars.len(), snapshot.size());
        assert!(exemplars.iter().all(|e| e.metadata == "ctx"));
    }
}
