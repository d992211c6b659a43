//! Run wiring: config, source, evaluator and report.

mod config;

pub use config::BenchmarkConfig;
pub use crate::core::FailurePolicy;

use log::info;

use crate::core::ConcurrentEvaluator;
use crate::report::BenchmarkReport;
use crate::source::PostingsSource;

/// Measure every posting list of `source` and summarize the sizes per codec.
pub fn run_benchmark<S>(source: &S, config: &BenchmarkConfig) -> crate::Result<BenchmarkReport>
where
    S: PostingsSource + Sync + ?Sized,
{
    config.is_valid()?;
    let codecs = config.codec_set();
    info!("[Benchmark] codecs: {:?}, max concurrency: {}", codecs.kinds(), config.max_concurrency);

    let evaluator = ConcurrentEvaluator::new(codecs, config.evaluator_options())?;
    let mut summary = evaluator.evaluate_source(source)?;
    Ok(BenchmarkReport::from_summary(&mut summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CodecKind;
    use crate::source::MemorySource;

    #[test]
    fn test_run_benchmark() {
        let mut source = MemorySource::new();
        source.insert("job", "a", vec![1, 2, 3]);
        source.insert("job", "b", vec![10, 20, 30, 40]);
        source.insert("env", "prod", vec![1, 2, 3]);
        source.insert("env", "dev", vec![]);

        let config = BenchmarkConfig { max_concurrency: 4, ..Default::default() };
        let report = run_benchmark(&source, &config).unwrap();
        assert_eq!(report.distinct_lists, 3);
        assert_eq!(report.duplicates, 1);
        assert_eq!(report.codec(CodecKind::Raw).map(|c| c.total_bytes), Some(40));
        assert!(report.failures.is_empty());
    }

    #[test]
    fn test_run_benchmark_rejects_invalid_config() {
        let config = BenchmarkConfig { max_concurrency: 0, ..Default::default() };
        assert!(run_benchmark(&MemorySource::new(), &config).is_err());
    }
}
