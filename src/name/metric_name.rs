//! Metric name: a name string plus a tag set, used as the registry key.

use crate::core::Result;
use crate::name::TagMap;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Immutable, tagged metric identifier.
///
/// Equality and ordering are structural over `(name, tags)`. The hash is
/// computed once at construction since names are hot-path map keys; it is
/// consistent with equality within a process run.
#[derive(Debug, Clone)]
pub struct MetricName {
    name: String,
    tags: TagMap,
    cached_hash: u64,
}

impl MetricName {
    /// Starts building a metric name.
    pub fn builder<S: Into<String>>(name: S) -> MetricNameBuilder {
        MetricNameBuilder {
            name: name.into(),
            tags: Vec::new(),
        }
    }

    /// Creates a name with no tags.
    pub fn of<S: Into<String>>(name: S) -> Self {
        Self::from_parts(name.into(), TagMap::new())
    }

    fn from_parts(name: String, tags: TagMap) -> Self {
        let cached_hash = {
            let mut hasher = std::collections::hash_map::DefaultHasher::new();
            name.hash(&mut hasher);
            tags.hash(&mut hasher);
            hasher.finish()
        };
        Self {
            name,
            tags,
            cached_hash,
        }
    }

    /// The name string.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The tag set.
    pub fn tags(&self) -> &TagMap {
        &self.tags
    }

    /// Returns a new name with an extra tag.
    ///
    /// Augmenting with an already-present identical tag/value is idempotent
    /// and returns a clone; a different value for an existing key fails
    /// with [`crate::MetricsError::DuplicateTagKey`].
    pub fn with_extra_tag(&self, key: &str, value: &str) -> Result<MetricName> {
        let tags = self.tags.with(key, value)?;
        Ok(Self::from_parts(self.name.clone(), tags))
    }
}

impl PartialEq for MetricName {
    fn eq(&self, other: &Self) -> bool {
        self.cached_hash == other.cached_hash
            && self.name == other.name
            && self.tags == other.tags
    }
}

impl Eq for MetricName {}

impl Hash for MetricName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.cached_hash);
    }
}

impl PartialOrd for MetricName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MetricName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| self.tags.cmp(&other.tags))
    }
}

// Renders as `name{k1=v1, k2=v2}` so conflict diagnostics carry the tags.
impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.tags.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}{}", self.name, self.tags)
        }
    }
}

/// Builder for [`MetricName`].
#[derive(Debug)]
pub struct MetricNameBuilder {
    name: String,
    tags: Vec<(String, String)>,
}

impl MetricNameBuilder {
    /// Adds a tag. Duplicate keys resolve to the last value at build time.
    pub fn tag<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.tags.push((key.into(), value.into()));
        self
    }

    /// Builds the immutable name.
    pub fn build(self) -> MetricName {
        MetricName::from_parts(self.name, self.tags.into_iter().collect())
    }
}
