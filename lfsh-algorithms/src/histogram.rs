//! Sparse integer-keyed histograms

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::{DEFAULT_ANNULI, DEFAULT_DEPTH_BINS, DEFAULT_DEVIANCE_BINS};

/// The three histogram kinds making up an LFSH descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HistogramKind {
    LocalDepth,
    NormalDeviance,
    RadialDensity,
}

impl HistogramKind {
    pub const ALL: [HistogramKind; 3] = [
        HistogramKind::LocalDepth,
        HistogramKind::NormalDeviance,
        HistogramKind::RadialDensity,
    ];

    /// Notional bucket count from the LFSH paper
    pub fn default_bins(&self) -> usize {
        match self {
            HistogramKind::LocalDepth => DEFAULT_DEPTH_BINS,
            HistogramKind::NormalDeviance => DEFAULT_DEVIANCE_BINS,
            HistogramKind::RadialDensity => DEFAULT_ANNULI,
        }
    }

    /// Half-open bucket range where values land for points inside the
    /// neighborhood sphere. Buckets outside it are still stored.
    ///
    /// Depths are measured from the tangent plane, one radius above the
    /// center, so members fall in [−2R, 0] and occupy negative buckets.
    pub fn nominal_range(&self, bins: usize) -> (i64, i64) {
        let bins = bins as i64;
        match self {
            HistogramKind::LocalDepth => (-bins, 0),
            HistogramKind::NormalDeviance | HistogramKind::RadialDensity => (0, bins),
        }
    }
}

/// Sparse histogram from bucket index to count.
///
/// Bucket indices are never clamped: values outside the nominal span keep
/// whatever index the floor division gives them, negative included. Values
/// that are NaN, infinite, or too large for an `i64` bucket are not binned;
/// they are tallied in `non_finite` instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Histogram {
    buckets: BTreeMap<i64, usize>,
    #[serde(default)]
    non_finite: usize,
}

impl Histogram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bucket for `value` given a bucket width: floor(value / width).
    ///
    /// None when the quotient is not finite or does not fit in an `i64`.
    pub fn bucket_of(value: f64, width: f64) -> Option<i64> {
        let bucket = (value / width).floor();
        if bucket.is_finite() && bucket >= i64::MIN as f64 && bucket < i64::MAX as f64 {
            Some(bucket as i64)
        } else {
            None
        }
    }

    pub fn increment(&mut self, bucket: i64) {
        *self.buckets.entry(bucket).or_insert(0) += 1;
    }

    /// Bin `value` with the given bucket width. Returns false when the value
    /// could not be binned and was counted as non-finite.
    pub fn record(&mut self, value: f64, width: f64) -> bool {
        match Self::bucket_of(value, width) {
            Some(bucket) => {
                self.increment(bucket);
                true
            }
            None => {
                self.non_finite += 1;
                false
            }
        }
    }

    /// Count stored in `bucket` (zero if absent)
    pub fn count(&self, bucket: i64) -> usize {
        self.buckets.get(&bucket).copied().unwrap_or(0)
    }

    /// Sum of all bucket counts. Skipped non-finite values are excluded.
    pub fn total(&self) -> usize {
        self.buckets.values().sum()
    }

    /// Number of values skipped because they could not be binned
    pub fn non_finite(&self) -> usize {
        self.non_finite
    }

    /// Number of non-empty buckets
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Non-empty buckets in ascending bucket order
    pub fn iter(&self) -> impl Iterator<Item = (i64, usize)> + '_ {
        self.buckets.iter().map(|(&bucket, &count)| (bucket, count))
    }

    /// Count-weighted mean bucket index, or None when empty
    pub fn weighted_mean(&self) -> Option<f64> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        let weighted: f64 = self.iter().map(|(b, c)| b as f64 * c as f64).sum();
        Some(weighted / total as f64)
    }
}

impl FromIterator<i64> for Histogram {
    fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
        let mut histogram = Histogram::new();
        for bucket in iter {
            histogram.increment(bucket);
        }
        histogram
    }
}
