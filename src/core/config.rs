//! Configuration for reservoir construction.

use crate::core::{MetricsError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default number of samples a decaying reservoir retains.
pub const DEFAULT_CAPACITY: usize = 1028;

/// Default exponential decay rate. Heavily biases the reservoir toward the
/// last five minutes of data.
pub const DEFAULT_ALPHA: f64 = 0.015;

/// Default interval after which sample weights are rescaled to keep the
/// decay exponent from overflowing.
pub const DEFAULT_RESCALE_THRESHOLD: Duration = Duration::from_secs(60 * 60);

/// Tunables for an exponentially decaying reservoir.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReservoirConfig {
    /// Maximum number of samples retained.
    pub capacity: usize,
    /// Exponential decay rate; larger values favor newer data more strongly.
    pub alpha: f64,
    /// How often sample weights are rescaled against a fresh landmark.
    #[serde(with = "humantime_serde")]
    pub rescale_threshold: Duration,
}

impl Default for ReservoirConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            alpha: DEFAULT_ALPHA,
            rescale_threshold: DEFAULT_RESCALE_THRESHOLD,
        }
    }
}

impl ReservoirConfig {
    /// Validates the configuration, returning it for chaining.
    pub fn validate(self) -> Result<Self> {
        if self.capacity == 0 {
            return Err(MetricsError::config("capacity must be greater than 0"));
        }
        if !self.alpha.is_finite() || self.alpha <= 0.0 {
            return Err(MetricsError::config(format!(
                "alpha must be a positive finite number, got {}",
                self.alpha
            )));
        }
        if self.rescale_threshold.is_zero() {
            return Err(MetricsError::config("rescale_threshold must be non-zero"));
        }
        Ok(self)
    }

    /// Rescale threshold in clock ticks.
    pub(crate) fn rescale_threshold_nanos(&self) -> i64 {
        self.rescale_threshold.as_nanos().min(i64::MAX as u128) as i64
    }
}
