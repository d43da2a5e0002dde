use crate::metrics::MetricKind;
use crate::name::MetricName;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetricsError {
    #[error(
        "metric '{name}' is already registered as {existing}, cannot re-register as {requested}"
    )]
    MetricKindConflict {
        name: MetricName,
        existing: MetricKind,
        requested: MetricKind,
    },

    #[error("tag key '{key}' is already present with value '{existing}', cannot add '{requested}'")]
    DuplicateTagKey {
        key: String,
        existing: String,
        requested: String,
    },

    #[error("listener '{0}' is not registered")]
    ListenerNotFound(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for metric operations
pub type Result<T> = std::result::Result<T, MetricsError>;

impl MetricsError {
    /// Creates a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Returns the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::MetricKindConflict { .. } => "kind_conflict",
            Self::DuplicateTagKey { .. } => "tags",
            Self::ListenerNotFound(_) => "listener",
            Self::Config(_) => "config",
        }
    }
}
