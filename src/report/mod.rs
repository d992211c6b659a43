mod benchmark_report;

pub use benchmark_report::{BenchmarkReport, CodecSummary};
