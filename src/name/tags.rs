//! Compact, immutable tag set for metric names.
//!
//! Tags are stored as a sorted inline vector of key/value pairs rather
//! than a tree map: metric names carry a handful of tags at most, are
//! iterated far more often than point-queried, and live for the whole
//! registry lifetime, so contiguous storage wins on both footprint and
//! walk speed.

use crate::core::{MetricsError, Result};
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

type Entries = SmallVec<[(String, String); 3]>;

/// An ordered collection of unique string key/value pairs.
///
/// Canonical form: entries sorted by key, keys unique. Structurally equal
/// (and hash-equal) to a `BTreeMap<String, String>` holding the same
/// entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct TagMap {
    entries: Entries,
}

impl TagMap {
    /// Returns the empty tag map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tags.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no tags.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up the value for a tag key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .binary_search_by(|(k, _)| k.as_str().cmp(key))
            .ok()
            .map(|idx| self.entries[idx].1.as_str())
    }

    /// Returns true if the key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Iterates keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Entries with keys strictly less than `key`, in order.
    pub fn head(&self, key: &str) -> impl Iterator<Item = (&str, &str)> + '_ {
        let end = self.entries.partition_point(|(k, _)| k.as_str() < key);
        self.entries[..end].iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Entries with keys greater than or equal to `key`, in order.
    pub fn tail(&self, key: &str) -> impl Iterator<Item = (&str, &str)> + '_ {
        let start = self.entries.partition_point(|(k, _)| k.as_str() < key);
        self.entries[start..].iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Entries with keys in `[from, to)`, in order.
    pub fn range<'a>(&'a self, from: &str, to: &str) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        let start = self.entries.partition_point(|(k, _)| k.as_str() < from);
        let end = self.entries.partition_point(|(k, _)| k.as_str() < to);
        let end = end.max(start);
        self.entries[start..end].iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns a new tag map with `key=value` added.
    ///
    /// Adding a key that is already present with the identical value is a
    /// no-op clone; a different value is a [`MetricsError::DuplicateTagKey`].
    pub fn with(&self, key: &str, value: &str) -> Result<TagMap> {
        match self.entries.binary_search_by(|(k, _)| k.as_str().cmp(key)) {
            Ok(idx) => {
                let existing = self.entries[idx].1.as_str();
                if existing == value {
                    Ok(self.clone())
                } else {
                    Err(MetricsError::DuplicateTagKey {
                        key: key.to_string(),
                        existing: existing.to_string(),
                        requested: value.to_string(),
                    })
                }
            },
            Err(idx) => {
                let mut entries = self.entries.clone();
                entries.insert(idx, (key.to_string(), value.to_string()));
                Ok(TagMap { entries })
            },
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TagMap {
    /// Builds the canonical form from arbitrary input order. On duplicate
    /// keys the last value wins, matching ordinary map insertion.
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let sorted: BTreeMap<String, String> = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        TagMap {
            entries: sorted.into_iter().collect(),
        }
    }
}

impl From<BTreeMap<String, String>> for TagMap {
    fn from(map: BTreeMap<String, String>) -> Self {
        TagMap {
            entries: map.into_iter().collect(),
        }
    }
}

impl PartialEq<BTreeMap<String, String>> for TagMap {
    fn eq(&self, other: &BTreeMap<String, String>) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other.iter())
                .all(|((k1, v1), (k2, v2))| k1 == k2 && v1 == v2)
    }
}

// Mirrors the std BTreeMap hash layout (length prefix, then each entry in
// key order) so a TagMap and a BTreeMap with the same entries hash alike.
impl Hash for TagMap {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.entries.len());
        for entry in &self.entries {
            entry.hash(state);
        }
    }
}

impl fmt::Display for TagMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", k, v)?;
        }
        write!(f, "}}")
    }
}
