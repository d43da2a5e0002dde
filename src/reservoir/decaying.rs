//! Lock-free exponentially decaying reservoir.
//!
//! Forward-decaying priority sampling: each update draws a priority
//! `weight / u` where `weight = exp(alpha * t)` grows with elapsed time
//! since a decay landmark and `u` is a fresh uniform draw in (0, 1). The
//! reservoir keeps the `capacity` highest-priority samples in a concurrent
//! skiplist, so recent observations statistically dominate. Periodic
//! rescaling moves the landmark and shrinks every weight by the same
//! factor, keeping the exponent bounded over arbitrarily long lifetimes.
//!
//! The only synchronization point is the atomically swappable state
//! reference: updates insert into the current state's sample map without
//! locks, and a rescale installs a wholly new state via compare-and-swap.

use crate::core::{Clock, ReservoirConfig, SystemClock, NANOS_PER_SECOND};
use crate::reservoir::{Reservoir, Snapshot};
use arc_swap::ArcSwap;
use crossbeam_skiplist::SkipMap;
use std::cmp::Ordering as CmpOrdering;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Sample priority key: strictly positive finite, ordered by `total_cmp`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Priority(f64);

impl Priority {
    fn scaled(self, factor: f64) -> f64 {
        self.0 * factor
    }
}

impl Eq for Priority {}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl Ord for Priority {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        self.0.total_cmp(&other.0)
    }
}

/// A retained sample: the observed value, its decay weight at insertion,
/// and optional exemplar metadata captured when the sample was accepted.
#[derive(Debug, Clone)]
pub(crate) struct WeightedSample<M> {
    pub value: i64,
    pub weight: f64,
    pub exemplar: Option<M>,
}

/// One immutable generation of reservoir state. Installed states are never
/// mutated apart from concurrent inserts/removals in the sample map and
/// the arrival count; a rescale replaces the whole state.
struct State<M> {
    start_tick: i64,
    count: AtomicUsize,
    samples: SkipMap<Priority, WeightedSample<M>>,
}

impl<M> State<M> {
    fn new(start_tick: i64) -> Self {
        Self {
            start_tick,
            count: AtomicUsize::new(0),
            samples: SkipMap::new(),
        }
    }
}

/// Shared engine behind the plain and exemplar-capturing reservoirs.
pub(crate) struct DecayingCore<M> {
    config: ReservoirConfig,
    rescale_threshold_nanos: i64,
    clock: Arc<dyn Clock>,
    state: ArcSwap<State<M>>,
}

impl<M: Clone + Send + Sync + 'static> DecayingCore<M> {
    pub(crate) fn new(config: ReservoirConfig, clock: Arc<dyn Clock>) -> Self {
        let start = clock.now_nanos();
        Self {
            rescale_threshold_nanos: config.rescale_threshold_nanos(),
            config,
            clock,
            state: ArcSwap::from_pointee(State::new(start)),
        }
    }

    /// Number of live samples, capped at capacity. Eventually consistent
    /// with concurrent updates by design.
    pub(crate) fn size(&self) -> usize {
        let state = self.state.load();
        state.count.load(Ordering::Relaxed).min(self.config.capacity)
    }

    /// Records a value. `exemplar` runs only if the sample is accepted.
    pub(crate) fn update_with<F>(&self, value: i64, exemplar: F)
    where
        F: FnOnce() -> Option<M>,
    {
        let now = self.clock.now_nanos();
        let state = self.current_state(now);

        let elapsed_secs = (now - state.start_tick) as f64 / NANOS_PER_SECOND as f64;
        let item_weight = (self.config.alpha * elapsed_secs).exp();
        let priority = item_weight / uniform_nonzero();
        if !priority.is_finite() || priority <= 0.0 {
            // Pathological clock skew; nothing sound to insert.
            return;
        }
        let priority = Priority(priority);

        let count = state.count.fetch_add(1, Ordering::Relaxed) + 1;
        if count <= self.config.capacity || state.samples.is_empty() {
            state.samples.insert(
                priority,
                WeightedSample {
                    value,
                    weight: item_weight,
                    exemplar: exemplar(),
                },
            );
        } else {
            let min_priority = match state.samples.front() {
                Some(entry) => *entry.key(),
                None => {
                    state.samples.insert(
                        priority,
                        WeightedSample {
                            value,
                            weight: item_weight,
                            exemplar: exemplar(),
                        },
                    );
                    return;
                },
            };
            if priority > min_priority {
                let existed = state.samples.get(&priority).is_some();
                state.samples.insert(
                    priority,
                    WeightedSample {
                        value,
                        weight: item_weight,
                        exemplar: exemplar(),
                    },
                );
                if !existed {
                    // pop_front removes *a* minimal entry atomically, so a
                    // concurrent evictor cannot make us spin on a stale
                    // minimum; None only if another thread emptied the map.
                    state.samples.pop_front();
                }
            }
            // Otherwise the sample loses the priority draw and is dropped:
            // intentional loss of a low-weight sample at capacity.
        }
    }

    /// Copies one consistent state's samples, forcing an overdue rescale
    /// first so stale weights never leak into reported statistics.
    pub(crate) fn weighted_entries(&self) -> Vec<(i64, f64, Option<M>)> {
        let now = self.clock.now_nanos();
        let state = self.current_state(now);
        state
            .samples
            .iter()
            .map(|entry| {
                let sample = entry.value();
                (sample.value, sample.weight, sample.exemplar.clone())
            })
            .collect()
    }

    fn current_state(&self, now: i64) -> Arc<State<M>> {
        let state = self.state.load_full();
        if now - state.start_tick >= self.rescale_threshold_nanos {
            self.rescale(now, state)
        } else {
            state
        }
    }

    /// Rebuilds the state against a fresh landmark: every weight and
    /// priority shrinks by `exp(-alpha * elapsed)`, samples whose weight
    /// rounds to exactly zero are dropped. Installed with a single CAS; a
    /// losing thread discards its work and adopts the winner.
    fn rescale(&self, now: i64, observed: Arc<State<M>>) -> Arc<State<M>> {
        let elapsed_secs = (now - observed.start_tick) as f64 / NANOS_PER_SECOND as f64;
        let factor = (-self.config.alpha * elapsed_secs).exp();

        let fresh = State::new(now);
        let mut survivors = 0usize;
        for entry in observed.samples.iter() {
            let sample = entry.value();
            let weight = sample.weight * factor;
            if weight == 0.0 {
                continue;
            }
            let priority = entry.key().scaled(factor);
            if !priority.is_finite() || priority <= 0.0 {
                continue;
            }
            fresh.samples.insert(
                Priority(priority),
                WeightedSample {
                    value: sample.value,
                    weight,
                    exemplar: sample.exemplar.clone(),
                },
            );
            survivors += 1;
        }
        fresh.count.store(survivors, Ordering::Relaxed);

        let fresh = Arc::new(fresh);
        let previous = self.state.compare_and_swap(&observed, Arc::clone(&fresh));
        if Arc::ptr_eq(&*previous, &observed) {
            tracing::debug!(
                survivors,
                factor,
                elapsed_secs,
                "rescaled decaying reservoir"
            );
            fresh
        } else {
            // Lost the race; the winner's state is already consistent.
            Arc::clone(&*previous)
        }
    }
}

/// Draws a uniform value in (0, 1); a zero draw would make the priority
/// infinite, so it is redrawn (probability 2^-53 per iteration).
fn uniform_nonzero() -> f64 {
    loop {
        let u = fastrand::f64();
        if u > 0.0 {
            return u;
        }
    }
}

/// Reservoir that exponentially favors recent data.
///
/// Defaults (capacity 1028, alpha 0.015) heavily bias toward the last five
/// minutes of samples while bounding memory.
pub struct ExponentiallyDecayingReservoir {
    core: DecayingCore<()>,
}

impl ExponentiallyDecayingReservoir {
    /// Creates a reservoir with default configuration and the system clock.
    pub fn new() -> Self {
        Self::with_config(ReservoirConfig::default())
    }

    /// Creates a reservoir with the given configuration and the system
    /// clock. The configuration is assumed validated; see
    /// [`ReservoirConfig::validate`].
    pub fn with_config(config: ReservoirConfig) -> Self {
        Self::with_clock(config, SystemClock::shared())
    }

    /// Creates a reservoir against an explicit clock.
    pub fn with_clock(config: ReservoirConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            core: DecayingCore::new(config, clock),
        }
    }
}

impl Default for ExponentiallyDecayingReservoir {
    fn default() -> Self {
        Self::new()
    }
}

impl Reservoir for ExponentiallyDecayingReservoir {
    fn size(&self) -> usize {
        self.core.size()
    }

    fn update(&self, value: i64) {
        self.core.update_with(value, || None);
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::from_weighted(
            self.core
                .weighted_entries()
                .into_iter()
                .map(|(value, weight, _)| (value, weight))
                .collect(),
        )
    }
}
