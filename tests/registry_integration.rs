//! End-to-end flow: registry get-or-create feeding decaying reservoirs,
//! driven by a hand-advanced clock.

use std::sync::Arc;
use std::time::Duration;
use tagged_metrics::{
    Clock, ManualClock, Metric, MetricName, MetricsError, RegistryListener, ReservoirConfig,
    TaggedMetricRegistry,
};

use parking_lot::Mutex;

fn registry_with_clock(clock: &Arc<ManualClock>) -> TaggedMetricRegistry {
    TaggedMetricRegistry::with_clock(
        ReservoirConfig::default(),
        Arc::clone(clock) as Arc<dyn Clock>,
    )
    .unwrap()
}

#[test]
fn timer_flow_from_registry_to_snapshot() {
    let clock = Arc::new(ManualClock::new());
    let registry = registry_with_clock(&clock);

    let name = MetricName::builder("handler.latency")
        .tag("endpoint", "/api")
        .build();
    let timer = registry.timer(name.clone()).unwrap();

    for ms in [5u64, 10, 15, 20, 25] {
        timer.update(Duration::from_millis(ms));
        clock.advance_seconds(1);
    }

    assert_eq!(timer.count(), 5);
    let snapshot = timer.snapshot();
    assert_eq!(snapshot.size(), 5);
    assert_eq!(snapshot.min(), 5_000_000);
    assert_eq!(snapshot.max(), 25_000_000);

    // The registry hands back the same timer for the same tagged name.
    let again = registry.timer(name).unwrap();
    assert!(Arc::ptr_eq(&timer, &again));
}

#[test]
fn decayed_histogram_converges_to_recent_batch() {
    let clock = Arc::new(ManualClock::new());
    let registry = registry_with_clock(&clock);

    let histogram = registry
        .histogram(MetricName::of("batch.latency"))
        .unwrap();

    for _ in 0..40 {
        histogram.update(177);
    }
    clock.advance_seconds(120);
    for _ in 0..10 {
        histogram.update(9999);
    }

    let snapshot = histogram.snapshot();
    assert_eq!(snapshot.median(), 9999.0);
}

#[test]
fn idle_reservoir_decays_to_empty_through_registry() {
    let clock = Arc::new(ManualClock::new());
    let registry = registry_with_clock(&clock);

    let histogram = registry.histogram(MetricName::of("quiet")).unwrap();
    for i in 0..20 {
        histogram.update(i);
    }

    clock.advance_seconds(24 * 60 * 60);

    let snapshot = histogram.snapshot();
    assert_eq!(snapshot.size(), 0);
    assert_eq!(snapshot.max(), 0);
    assert_eq!(snapshot.mean(), 0.0);
    assert_eq!(snapshot.median(), 0.0);
}

#[test]
fn kind_conflict_across_accessors() {
    let clock = Arc::new(ManualClock::new());
    let registry = registry_with_clock(&clock);

    let name = MetricName::builder("mixed").tag("k", "v").build();
    registry.counter(name.clone()).unwrap();

    let err = registry.timer(name.clone()).unwrap_err();
    assert!(matches!(err, MetricsError::MetricKindConflict { .. }));
    // The conflicting name with its tags is part of the diagnostics.
    assert!(err.to_string().contains("mixed{k=v}"));

    // The original registration is untouched.
    registry.counter(name).unwrap().inc();
}

#[test]
fn listener_sees_sub_registry_lifecycle() {
    struct Tracking {
        added: Arc<Mutex<Vec<String>>>,
    }
    impl RegistryListener for Tracking {
        fn name(&self) -> &str {
            "tracking"
        }
        fn on_metric_added(&self, name: &MetricName, _metric: &Metric) {
            self.added.lock().push(name.to_string());
        }
    }

    let clock = Arc::new(ManualClock::new());
    let root = registry_with_clock(&clock);
    let added = Arc::new(Mutex::new(Vec::new()));
    root.add_listener(Arc::new(Tracking {
        added: Arc::clone(&added),
    }));

    root.counter(MetricName::of("direct")).unwrap();
    assert_eq!(*added.lock(), vec!["direct"]);

    // Sub-registry metrics are overlaid with the extra tag at enumeration.
    let sub = Arc::new(registry_with_clock(&clock));
    sub.counter(MetricName::of("nested")).unwrap();
    root.add_metrics("pool", "a", sub);

    let names: Vec<String> = root
        .get_metrics()
        .keys()
        .map(|name| name.to_string())
        .collect();
    assert_eq!(names, vec!["direct", "nested{pool=a}"]);
}

#[test]
fn concurrent_mixed_load_stays_consistent() {
    use std::thread;

    let clock = Arc::new(ManualClock::new());
    let registry = Arc::new(registry_with_clock(&clock));

    let mut handles = Vec::new();
    for t in 0..4 {
        let registry = Arc::clone(&registry);
        let clock = Arc::clone(&clock);
        handles.push(thread::spawn(move || {
            let histogram = registry
                .histogram(MetricName::of("shared.histogram"))
                .unwrap();
            let counter = registry
                .counter(
                    MetricName::builder("per.thread")
                        .tag("t", t.to_string())
                        .build(),
                )
                .unwrap();
            for i in 0..5_000 {
                histogram.update(i);
                counter.inc();
                clock.advance_nanos(50);
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    let histogram = registry
        .histogram(MetricName::of("shared.histogram"))
        .unwrap();
    assert_eq!(histogram.count(), 20_000);
    assert!(histogram.snapshot().size() <= 1028);

    // 4 per-thread counters + 1 shared histogram.
    assert_eq!(registry.len(), 5);
    for t in 0..4 {
        let counter = registry
            .counter(
                MetricName::builder("per.thread")
                    .tag("t", t.to_string())
                    .build(),
            )
            .unwrap();
        assert_eq!(counter.count(), 5_000);
    }
}
