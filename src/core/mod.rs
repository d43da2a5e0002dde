//! Core building blocks shared across the crate.
//!
//! This module contains the error type, the clock seam used by decay
//! timing, and reservoir configuration.

pub mod clock;
pub mod config;
pub mod error;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock, NANOS_PER_SECOND};
pub use config::{ReservoirConfig, DEFAULT_ALPHA, DEFAULT_CAPACITY, DEFAULT_RESCALE_THRESHOLD};
pub use error::{MetricsError, Result};
