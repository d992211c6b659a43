use serde::{Deserialize, Serialize};

use super::TDigest;
use crate::common::types::ByteSize;
use crate::core::CodecKind;

/// Encoded sizes observed for one codec across the corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeDistribution {
    codec: CodecKind,
    digest: TDigest,
    total_bytes: ByteSize,
    observations: u64,
}

impl SizeDistribution {
    pub fn new(codec: CodecKind, compression: f64) -> Self {
        Self { codec, digest: TDigest::new(compression), total_bytes: 0, observations: 0 }
    }

    pub fn codec(&self) -> CodecKind {
        self.codec
    }

    /// Record the size of a newly seen posting list.
    pub fn observe(&mut self, size_bytes: ByteSize) {
        self.digest.insert(size_bytes as f64);
        self.total_bytes += size_bytes;
        self.observations += 1;
    }

    /// Swap a recorded list's contribution to the total for a replacement.
    ///
    /// The digest keeps its single observation for that list.
    pub fn replace(&mut self, previous_bytes: ByteSize, size_bytes: ByteSize) {
        self.total_bytes = self.total_bytes - previous_bytes + size_bytes;
    }

    pub fn total_bytes(&self) -> ByteSize {
        self.total_bytes
    }

    pub fn observations(&self) -> u64 {
        self.observations
    }

    pub fn quantile(&mut self, q: f64) -> f64 {
        self.digest.quantile(q)
    }

    /// Combine with a distribution of the same codec built elsewhere.
    pub fn merge(&mut self, other: &SizeDistribution) {
        debug_assert_eq!(self.codec, other.codec);
        self.digest.merge(&other.digest);
        self.total_bytes += other.total_bytes;
        self.observations += other.observations;
    }
}
