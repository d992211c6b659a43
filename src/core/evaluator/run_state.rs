use fnv::FnvHashMap;
use log::warn;
use serde::{Deserialize, Serialize};

use super::ListStats;
use crate::common::types::ByteSize;
use crate::core::{CodecKind, Fingerprint, SizeDistribution};

/// A posting list skipped under [`super::FailurePolicy::SkipAndCount`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFailure {
    pub label_name: String,
    pub label_value: String,
    pub reason: String,
}

/// Mutable state of one run. Lives behind the evaluator's lock.
#[derive(Debug)]
pub(super) struct RunState {
    table: FnvHashMap<Fingerprint, ListStats>,
    distributions: Vec<SizeDistribution>,
    duplicates: u64,
    failures: Vec<TaskFailure>,
    completed: usize,
}

impl RunState {
    pub(super) fn new(codecs: &[CodecKind], compression: f64) -> Self {
        Self {
            table: FnvHashMap::default(),
            distributions: codecs.iter().map(|&codec| SizeDistribution::new(codec, compression)).collect(),
            duplicates: 0,
            failures: Vec::new(),
            completed: 0,
        }
    }

    /// Record a measured list and return the number of completed tasks.
    ///
    /// A fingerprint seen before overwrites the older entry; totals follow
    /// the overwrite and the digests keep one observation per fingerprint.
    /// On a real collision (different lists, same fingerprint) that
    /// observation is the first writer's, so quantiles reflect the first list
    /// while totals reflect the last.
    pub(super) fn record(&mut self, fingerprint: Fingerprint, stats: ListStats) -> usize {
        let previous = self.table.insert(fingerprint, stats);
        let current = &self.table[&fingerprint];
        match previous {
            None => {
                for (distribution, result) in self.distributions.iter_mut().zip(&current.sizes) {
                    distribution.observe(result.size_bytes);
                }
            }
            Some(previous) => {
                warn!(
                    "[RunState] fingerprint {} of `{}={}` already recorded for `{}={}`, overwriting",
                    fingerprint, current.label_name, current.label_value, previous.label_name, previous.label_value
                );
                self.duplicates += 1;
                for ((distribution, old), new) in self.distributions.iter_mut().zip(&previous.sizes).zip(&current.sizes) {
                    distribution.replace(old.size_bytes, new.size_bytes);
                }
            }
        }
        self.completed += 1;
        self.completed
    }

    pub(super) fn record_failure(&mut self, failure: TaskFailure) -> usize {
        self.failures.push(failure);
        self.completed += 1;
        self.completed
    }

    pub(super) fn into_summary(self) -> RunSummary {
        RunSummary {
            table: self.table,
            distributions: self.distributions,
            duplicates: self.duplicates,
            failures: self.failures,
            completed: self.completed,
        }
    }
}

/// Everything a finished run produced.
#[derive(Debug)]
pub struct RunSummary {
    table: FnvHashMap<Fingerprint, ListStats>,
    distributions: Vec<SizeDistribution>,
    duplicates: u64,
    failures: Vec<TaskFailure>,
    completed: usize,
}

impl RunSummary {
    /// Measured lists keyed by fingerprint.
    pub fn table(&self) -> &FnvHashMap<Fingerprint, ListStats> {
        &self.table
    }

    pub fn distinct_lists(&self) -> usize {
        self.table.len()
    }

    /// Tasks whose fingerprint was already in the table.
    pub fn duplicates(&self) -> u64 {
        self.duplicates
    }

    pub fn failures(&self) -> &[TaskFailure] {
        &self.failures
    }

    /// Tasks finished, successful or skipped.
    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn codecs(&self) -> Vec<CodecKind> {
        self.distributions.iter().map(|distribution| distribution.codec()).collect()
    }

    pub fn total_bytes(&self, codec: CodecKind) -> Option<ByteSize> {
        self.distribution(codec).map(|distribution| distribution.total_bytes())
    }

    pub fn distribution(&self, codec: CodecKind) -> Option<&SizeDistribution> {
        self.distributions.iter().find(|distribution| distribution.codec() == codec)
    }

    /// Quantile queries merge buffered digest values, hence `&mut`.
    pub fn distributions_mut(&mut self) -> &mut [SizeDistribution] {
        &mut self.distributions
    }
}
