//! Sample reservoirs backing histograms and timers.
//!
//! The workhorse is the lock-free [`ExponentiallyDecayingReservoir`];
//! [`ExemplarReservoir`] adds insertion-time metadata capture and
//! [`SlidingTimeWindowReservoir`] serves the window registry decorator.

pub mod decaying;
pub mod exemplar;
pub mod sliding;
pub mod snapshot;

pub use decaying::ExponentiallyDecayingReservoir;
pub use exemplar::{Exemplar, ExemplarProvider, ExemplarReservoir};
pub use sliding::SlidingTimeWindowReservoir;
pub use snapshot::Snapshot;

/// A statistically representative, bounded sample of observed values.
///
/// Implementations are safe to share across threads; `update` never
/// blocks.
pub trait Reservoir: Send + Sync {
    /// Number of samples currently retained.
    fn size(&self) -> usize;

    /// Records a value.
    fn update(&self, value: i64);

    /// Returns an immutable point-in-time view of the retained samples.
    fn snapshot(&self) -> Snapshot;
}
