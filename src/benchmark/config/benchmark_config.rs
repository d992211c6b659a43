use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::common::constants::{DEFAULT_DIGEST_COMPRESSION, DEFAULT_MAX_CONCURRENCY, DEFAULT_PROGRESS_INTERVAL};
use crate::common::file_operations::read_json;
use crate::core::{CodecSet, EvaluatorOptions, FailurePolicy};
use crate::BenchError;

fn default_max_concurrency() -> usize {
    DEFAULT_MAX_CONCURRENCY
}

fn default_digest_compression() -> f64 {
    DEFAULT_DIGEST_COMPRESSION
}

fn default_progress_interval() -> usize {
    DEFAULT_PROGRESS_INTERVAL
}

/// Benchmark settings, loadable from a JSON file.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "snake_case")]
pub struct BenchmarkConfig {
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    #[serde(default = "default_digest_compression")]
    pub digest_compression: f64,

    #[serde(default = "default_progress_interval")]
    pub progress_interval: usize,

    #[serde(default)]
    pub failure_policy: FailurePolicy,

    /// Encoder binary for the external block-packed codec; disabled when unset.
    #[serde(default)]
    pub external_encoder: Option<PathBuf>,

    /// Parent of the external codec's work directories, system temp when unset.
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            digest_compression: DEFAULT_DIGEST_COMPRESSION,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            failure_policy: FailurePolicy::default(),
            external_encoder: None,
            temp_dir: None,
        }
    }
}

impl BenchmarkConfig {
    pub fn load(path: &Path) -> crate::Result<Self> {
        let config: BenchmarkConfig = read_json(path)?;
        config.is_valid()?;
        Ok(config)
    }

    pub fn is_valid(&self) -> crate::Result<bool> {
        self.evaluator_options().is_valid()?;
        if let Some(temp_dir) = &self.temp_dir {
            if !temp_dir.is_dir() {
                return Err(BenchError::InvalidConfig(format!("temp dir {:?} is not a directory", temp_dir)));
            }
        }
        Ok(true)
    }

    pub fn evaluator_options(&self) -> EvaluatorOptions {
        EvaluatorOptions::builder()
            .max_concurrency(self.max_concurrency)
            .digest_compression(self.digest_compression)
            .progress_interval(self.progress_interval)
            .failure_policy(self.failure_policy)
            .build()
    }

    pub fn codec_set(&self) -> CodecSet {
        CodecSet::with_external_encoder(self.external_encoder.clone(), self.temp_dir.clone())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::common::file_operations::atomic_save_json;
    use crate::core::CodecKind;

    #[test]
    fn test_defaults_from_empty_json() {
        let config: BenchmarkConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, BenchmarkConfig::default());
        assert_eq!(config.max_concurrency, 100);
        assert_eq!(config.failure_policy, FailurePolicy::FailFast);
        assert_eq!(config.codec_set().len(), 4);
    }

    #[test]
    fn test_parse_config() {
        let json = r#"{"max_concurrency": 8, "failure_policy": "skip_and_count", "external_encoder": "/opt/bin/s4bp128d4"}"#;
        let config: BenchmarkConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.max_concurrency, 8);
        assert_eq!(config.progress_interval, 100);
        assert_eq!(config.evaluator_options().failure_policy, FailurePolicy::SkipAndCount);
        assert_eq!(config.codec_set().kinds().last(), Some(&CodecKind::ExternalBlockPacked));
    }

    #[test]
    fn test_invalid_config() {
        let config = BenchmarkConfig { max_concurrency: 0, ..Default::default() };
        assert!(matches!(config.is_valid(), Err(BenchError::InvalidConfig(_))));
        let config = BenchmarkConfig { digest_compression: 0.0, ..Default::default() };
        assert!(config.is_valid().is_err());
        let config = BenchmarkConfig { temp_dir: Some(PathBuf::from("/definitely/not/here")), ..Default::default() };
        assert!(config.is_valid().is_err());
    }

    #[test]
    fn test_load_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bench.json");
        let config = BenchmarkConfig { max_concurrency: 16, temp_dir: Some(dir.path().to_path_buf()), ..Default::default() };
        atomic_save_json(&path, &config).unwrap();
        assert_eq!(BenchmarkConfig::load(&path).unwrap(), config);

        atomic_save_json(&path, &BenchmarkConfig { progress_interval: 0, ..Default::default() }).unwrap();
        assert!(BenchmarkConfig::load(&path).is_err());
    }
}
