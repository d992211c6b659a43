mod benchmark_config;

pub use benchmark_config::BenchmarkConfig;
