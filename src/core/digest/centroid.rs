use serde::{Deserialize, Serialize};

/// Weighted mean of a group of adjacent observations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Centroid {
    mean: f64,
    weight: f64,
}

impl Centroid {
    pub fn new(mean: f64, weight: f64) -> Self {
        Self { mean, weight }
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Fold `other` into this centroid, keeping the weighted mean.
    pub fn absorb(&mut self, other: &Centroid) {
        self.weight += other.weight;
        self.mean += other.weight * (other.mean - self.mean) / self.weight;
    }
}
