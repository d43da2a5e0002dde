//! Point-in-time statistical view over a reservoir's samples.

/// Immutable snapshot of weighted samples.
///
/// Values are sorted ascending and weights normalized at construction, so
/// quantile lookups are a binary search over the cumulative distribution.
/// An empty snapshot reports `0` for every statistic rather than NaN.
#[derive(Debug, Clone)]
pub struct Snapshot {
    values: Vec<i64>,
    norm_weights: Vec<f64>,
    // Cumulative normalized weight strictly before each value.
    quantile_starts: Vec<f64>,
}

impl Snapshot {
    /// Builds a snapshot from `(value, weight)` pairs.
    pub fn from_weighted(mut entries: Vec<(i64, f64)>) -> Self {
        entries.sort_by_key(|(value, _)| *value);

        let sum: f64 = entries.iter().map(|(_, w)| w).sum();
        let norm_weights: Vec<f64> = if sum > 0.0 {
            entries.iter().map(|(_, w)| w / sum).collect()
        } else {
            // Degenerate all-zero weights: fall back to uniform.
            let n = entries.len().max(1) as f64;
            entries.iter().map(|_| 1.0 / n).collect()
        };

        let mut quantile_starts = Vec::with_capacity(entries.len());
        let mut acc = 0.0;
        for w in &norm_weights {
            quantile_starts.push(acc);
            acc += w;
        }

        Self {
            values: entries.into_iter().map(|(value, _)| value).collect(),
            norm_weights,
            quantile_starts,
        }
    }

    /// Builds a uniformly weighted snapshot from raw values.
    pub fn from_values(values: Vec<i64>) -> Self {
        Self::from_weighted(values.into_iter().map(|v| (v, 1.0)).collect())
    }

    /// Number of samples.
    pub fn size(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the snapshot holds no samples.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Sample values, ascending.
    pub fn values(&self) -> &[i64] {
        &self.values
    }

    /// Largest sample, `0` when empty.
    pub fn max(&self) -> i64 {
        self.values.last().copied().unwrap_or(0)
    }

    /// Smallest sample, `0` when empty.
    pub fn min(&self) -> i64 {
        self.values.first().copied().unwrap_or(0)
    }

    /// Weighted arithmetic mean, `0` when empty.
    pub fn mean(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values
            .iter()
            .zip(&self.norm_weights)
            .map(|(v, w)| *v as f64 * w)
            .sum()
    }

    /// Weighted standard deviation, `0` for fewer than two samples.
    pub fn std_dev(&self) -> f64 {
        if self.values.len() <= 1 {
            return 0.0;
        }
        let mean = self.mean();
        let variance: f64 = self
            .values
            .iter()
            .zip(&self.norm_weights)
            .map(|(v, w)| {
                let diff = *v as f64 - mean;
                diff * diff * w
            })
            .sum();
        variance.sqrt()
    }

    /// Median, `0` when empty.
    pub fn median(&self) -> f64 {
        self.quantile(0.5)
    }

    /// Weighted quantile; `q` is clamped to `[0, 1]`. `0` when empty.
    pub fn quantile(&self, q: f64) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let q = if q.is_nan() { 0.0 } else { q.clamp(0.0, 1.0) };
        let pos = self.quantile_starts.partition_point(|start| *start <= q);
        let idx = pos.saturating_sub(1).min(self.values.len() - 1);
        self.values[idx] as f64
    }

    /// Alias for [`Snapshot::quantile`], e.g. `percentile(0.99)`.
    pub fn percentile(&self, p: f64) -> f64 {
        self.quantile(p)
    }
}
