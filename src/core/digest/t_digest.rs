use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use super::centroid::Centroid;

/// Merging t-digest.
///
/// Incoming values are buffered and folded into the centroid list in batches.
/// Centroid sizes are bounded by the arcsine scale function, so the tails stay
/// fine grained while the middle is compressed. A larger `compression` keeps
/// more centroids and gives tighter quantiles.
///
/// Not synchronized; callers serialize mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TDigest {
    compression: f64,

    /// Merged centroids, sorted by mean.
    processed: Vec<Centroid>,
    processed_weight: f64,

    /// Values not folded into `processed` yet.
    unprocessed: Vec<Centroid>,
    unprocessed_weight: f64,

    /// `cumulative[i]` is the weight up to the center of `processed[i]`;
    /// the trailing entry is the total weight.
    cumulative: Vec<f64>,

    min: f64,
    max: f64,
}

impl TDigest {
    pub fn new(compression: f64) -> Self {
        Self {
            compression,
            processed: Vec::new(),
            processed_weight: 0.0,
            unprocessed: Vec::new(),
            unprocessed_weight: 0.0,
            cumulative: Vec::new(),
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    fn max_processed(&self) -> usize {
        2 * self.compression.ceil() as usize
    }

    fn max_unprocessed(&self) -> usize {
        8 * self.compression.ceil() as usize
    }

    pub fn insert(&mut self, value: f64) {
        self.insert_weighted(value, 1.0);
    }

    /// NaN values and non-positive weights are ignored.
    pub fn insert_weighted(&mut self, value: f64, weight: f64) {
        if value.is_nan() || weight <= 0.0 {
            return;
        }
        if self.processed.len() > self.max_processed() || self.unprocessed.len() > self.max_unprocessed() {
            self.process();
        }
        self.unprocessed.push(Centroid::new(value, weight));
        self.unprocessed_weight += weight;
    }

    /// Fold every centroid of `other` into this digest.
    pub fn merge(&mut self, other: &TDigest) {
        for centroid in other.processed.iter().chain(other.unprocessed.iter()) {
            self.insert_weighted(centroid.mean(), centroid.weight());
        }
        if other.count() > 0.0 {
            self.min = self.min.min(other.min);
            self.max = self.max.max(other.max);
        }
    }

    /// Total weight inserted so far.
    pub fn count(&self) -> f64 {
        self.processed_weight + self.unprocessed_weight
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0.0
    }

    pub fn min(&self) -> Option<f64> {
        self.range().map(|(min, _)| min)
    }

    pub fn max(&self) -> Option<f64> {
        self.range().map(|(_, max)| max)
    }

    fn range(&self) -> Option<(f64, f64)> {
        if self.is_empty() {
            return None;
        }
        let (mut min, mut max) = (self.min, self.max);
        for centroid in &self.unprocessed {
            min = min.min(centroid.mean());
            max = max.max(centroid.mean());
        }
        Some((min, max))
    }

    /// Number of centroids once every pending value is merged.
    pub fn centroid_count(&mut self) -> usize {
        self.process();
        self.processed.len()
    }

    /// Estimated value at rank `q` in `[0, 1]`. NaN when empty or `q` is out of range.
    pub fn quantile(&mut self, q: f64) -> f64 {
        self.process();
        if !(0.0..=1.0).contains(&q) || self.processed.is_empty() {
            return f64::NAN;
        }
        if self.processed.len() == 1 {
            return self.processed[0].mean();
        }

        let count = self.processed.len();
        let index = q * self.processed_weight;

        // Left of the first centroid's center: interpolate from the minimum.
        let first = &self.processed[0];
        if index <= first.weight() / 2.0 {
            return self.min + 2.0 * index / first.weight() * (first.mean() - self.min);
        }

        // Right of the last centroid's center: interpolate up to the maximum.
        if index >= self.cumulative[count - 1] {
            let last = &self.processed[count - 1];
            let z1 = index - self.cumulative[count - 1];
            let z2 = self.cumulative[count] - index;
            return weighted_average(last.mean(), z2, self.max, z1);
        }

        let upper = self.cumulative[..count].partition_point(|&c| c < index);
        let z1 = index - self.cumulative[upper - 1];
        let z2 = self.cumulative[upper] - index;
        weighted_average(self.processed[upper - 1].mean(), z2, self.processed[upper].mean(), z1)
    }

    fn process(&mut self) {
        if self.unprocessed.is_empty() && self.processed.len() <= self.max_processed() {
            return;
        }

        let mut pending = std::mem::take(&mut self.unprocessed);
        pending.append(&mut self.processed);
        pending.sort_by(|a, b| a.mean().total_cmp(&b.mean()));

        self.processed_weight += self.unprocessed_weight;
        self.unprocessed_weight = 0.0;

        let total = self.processed_weight;
        let mut pending = pending.into_iter();
        let Some(first) = pending.next() else {
            return;
        };
        let mut merged = vec![first];
        let mut so_far = first.weight();
        let mut limit = total * self.integrated_q(1.0);

        for centroid in pending {
            let projected = so_far + centroid.weight();
            if projected <= limit {
                so_far = projected;
                if let Some(last) = merged.last_mut() {
                    last.absorb(&centroid);
                }
            } else {
                let k = self.integrated_location(so_far / total);
                limit = total * self.integrated_q(k + 1.0);
                so_far = projected;
                merged.push(centroid);
            }
        }

        if let (Some(first), Some(last)) = (merged.first(), merged.last()) {
            self.min = self.min.min(first.mean());
            self.max = self.max.max(last.mean());
        }
        self.processed = merged;
        self.update_cumulative();
    }

    fn update_cumulative(&mut self) {
        self.cumulative.clear();
        let mut previous = 0.0;
        for centroid in &self.processed {
            self.cumulative.push(previous + centroid.weight() / 2.0);
            previous += centroid.weight();
        }
        self.cumulative.push(previous);
    }

    /// Cumulative rank reached at scale position `k`.
    fn integrated_q(&self, k: f64) -> f64 {
        ((k.min(self.compression) * PI / self.compression - PI / 2.0).sin() + 1.0) / 2.0
    }

    /// Scale position of cumulative rank `q`.
    fn integrated_location(&self, q: f64) -> f64 {
        self.compression * ((2.0 * q - 1.0).asin() + PI / 2.0) / PI
    }
}

/// Weighted mean of two points, clamped to the segment between them.
fn weighted_average(x1: f64, w1: f64, x2: f64, w2: f64) -> f64 {
    let (lo, hi) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
    let total = w1 + w2;
    if total <= 0.0 {
        return (x1 + x2) / 2.0;
    }
    ((x1 * w1 + x2 * w2) / total).clamp(lo, hi)
}
