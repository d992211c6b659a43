use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::constants::REPORT_QUANTILES;
use crate::common::file_operations::{atomic_save_json, read_json, FileOperationError};
use crate::common::types::ByteSize;
use crate::core::{CodecKind, RunSummary, SizeDistribution, TaskFailure};

/// Size distribution of one codec over the distinct posting lists.
///
/// Quantiles are `None` when no list was measured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodecSummary {
    pub codec: CodecKind,
    pub p50: Option<f64>,
    pub p75: Option<f64>,
    pub p90: Option<f64>,
    pub p99: Option<f64>,
    pub total_bytes: ByteSize,
    pub observations: u64,
}

impl CodecSummary {
    pub fn from_distribution(distribution: &mut SizeDistribution) -> Self {
        let [p50, p75, p90, p99] = REPORT_QUANTILES.map(|q| Some(distribution.quantile(q)).filter(|v| !v.is_nan()));
        Self {
            codec: distribution.codec(),
            p50,
            p75,
            p90,
            p99,
            total_bytes: distribution.total_bytes(),
            observations: distribution.observations(),
        }
    }

    fn quantiles(&self) -> [(&'static str, Option<f64>); 4] {
        [("50th", self.p50), ("75th", self.p75), ("90th", self.p90), ("99th", self.p99)]
    }
}

/// Final result of a benchmark run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub distinct_lists: usize,
    pub duplicates: u64,
    pub failures: Vec<TaskFailure>,
    pub codecs: Vec<CodecSummary>,
}

impl BenchmarkReport {
    pub fn from_summary(summary: &mut RunSummary) -> Self {
        Self {
            distinct_lists: summary.distinct_lists(),
            duplicates: summary.duplicates(),
            failures: summary.failures().to_vec(),
            codecs: summary.distributions_mut().iter_mut().map(CodecSummary::from_distribution).collect(),
        }
    }

    pub fn codec(&self, codec: CodecKind) -> Option<&CodecSummary> {
        self.codecs.iter().find(|summary| summary.codec == codec)
    }

    pub fn save_json(&self, path: &Path) -> Result<(), FileOperationError> {
        atomic_save_json(path, self)
    }

    pub fn load_json(path: &Path) -> Result<Self, FileOperationError> {
        read_json(path)
    }
}

impl fmt::Display for BenchmarkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Number of label name/value pairs: {}", self.distinct_lists)?;
        if self.duplicates > 0 {
            writeln!(f, "Duplicate posting lists: {}", self.duplicates)?;
        }
        for codec in &self.codecs {
            writeln!(f, "-----{}-----", codec.codec.title())?;
            for (rank, value) in codec.quantiles() {
                match value {
                    Some(value) => writeln!(f, "{} by posting list size in bytes: {}", rank, value)?,
                    None => writeln!(f, "{} by posting list size in bytes: NaN", rank)?,
                }
            }
            writeln!(f, "Total sum {}", codec.total_bytes)?;
        }
        if !self.failures.is_empty() {
            writeln!(f, "-----Failures ({})-----", self.failures.len())?;
            for failure in &self.failures {
                writeln!(f, "{}={}: {}", failure.label_name, failure.label_value, failure.reason)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::core::{CodecSet, ConcurrentEvaluator, EvaluatorOptions, LabeledPostings};

    fn report() -> BenchmarkReport {
        let evaluator = ConcurrentEvaluator::new(CodecSet::default(), EvaluatorOptions::builder().max_concurrency(2).build()).unwrap();
        let lists = vec![
            LabeledPostings::new("job", "a", vec![1, 2, 3]),
            LabeledPostings::new("job", "b", vec![10, 20, 30, 40]),
            LabeledPostings::new("job", "c", vec![]),
        ];
        let mut summary = evaluator.evaluate_lists(lists).unwrap();
        BenchmarkReport::from_summary(&mut summary)
    }

    #[test]
    fn test_report_from_summary() {
        let report = report();
        assert_eq!(report.distinct_lists, 3);
        assert_eq!(report.codecs.len(), 4);

        let raw = report.codec(CodecKind::Raw).unwrap();
        assert_eq!(raw.total_bytes, 40);
        assert_eq!(raw.observations, 3);
        assert_eq!(raw.p50, Some(16.0));
        for summary in &report.codecs {
            assert!(summary.p50 <= summary.p75 && summary.p75 <= summary.p90 && summary.p90 <= summary.p99);
        }
    }

    #[test]
    fn test_report_display() {
        let text = report().to_string();
        assert!(text.starts_with("Number of label name/value pairs: 3\n-----RAW-----\n50th by posting list size in bytes: 16\n"));
        assert!(text.contains("Total sum 40\n-----Roaring-----\n"));
        assert!(text.contains("-----Roaring RLE-----"));
        assert!(text.contains("-----S4BP128D4-----"));
        assert!(!text.contains("Failures"));
    }

    #[test]
    fn test_empty_report_prints_nan() {
        let mut distribution = SizeDistribution::new(CodecKind::Raw, 100.0);
        let report = BenchmarkReport {
            distinct_lists: 0,
            duplicates: 0,
            failures: vec![TaskFailure { label_name: "job".into(), label_value: "a".into(), reason: "encoder exited".into() }],
            codecs: vec![CodecSummary::from_distribution(&mut distribution)],
        };
        let text = report.to_string();
        assert!(text.contains("99th by posting list size in bytes: NaN\nTotal sum 0\n"));
        assert!(text.contains("-----Failures (1)-----\njob=a: encoder exited\n"));
    }

    #[test]
    fn test_save_and_load_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.json");
        let report = report();
        report.save_json(&path).unwrap();
        assert_eq!(BenchmarkReport::load_json(&path).unwrap(), report);
    }
}
