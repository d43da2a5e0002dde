//! Hot-path benchmarks: reservoir updates and registry lookups.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;
use tagged_metrics::{
    ExponentiallyDecayingReservoir, MetricName, Reservoir, TaggedMetricRegistry,
};

fn bench_reservoir_update(c: &mut Criterion) {
    let reservoir = ExponentiallyDecayingReservoir::new();
    // Warm to capacity so the benchmark measures the eviction path.
    for i in 0..2_048 {
        reservoir.update(i);
    }

    c.bench_function("reservoir_update_at_capacity", |b| {
        let mut i = 0i64;
        b.iter(|| {
            i += 1;
            reservoir.update(black_box(i));
        });
    });
}

fn bench_reservoir_snapshot(c: &mut Criterion) {
    let reservoir = ExponentiallyDecayingReservoir::new();
    for i in 0..2_048 {
        reservoir.update(i);
    }

    c.bench_function("reservoir_snapshot", |b| {
        b.iter(|| black_box(reservoir.snapshot().median()));
    });
}

fn bench_registry_hot_lookup(c: &mut Criterion) {
    let registry = Arc::new(TaggedMetricRegistry::new());
    let name = MetricName::builder("handler.latency")
        .tag("endpoint", "/api")
        .tag("method", "GET")
        .build();
    registry.counter(name.clone()).unwrap();

    c.bench_function("registry_counter_hit", |b| {
        b.iter(|| {
            let counter = registry.counter(black_box(name.clone())).unwrap();
            counter.inc();
        });
    });
}

fn bench_metric_name_build(c: &mut Criterion) {
    c.bench_function("metric_name_build_three_tags", |b| {
        b.iter(|| {
            black_box(
                MetricName::builder("handler.latency")
                    .tag("endpoint", "/api")
                    .tag("method", "GET")
                    .tag("code", "200")
                    .build(),
            )
        });
    });
}

criterion_group!(
    benches,
    bench_reservoir_update,
    bench_reservoir_snapshot,
    bench_registry_hot_lookup,
    bench_metric_name_build
);
criterion_main!(benches);
