/// Number of posting lists evaluated at the same time.
pub const DEFAULT_MAX_CONCURRENCY: usize = 100;

/// Compression (accuracy) parameter of each per-codec t-digest.
pub const DEFAULT_DIGEST_COMPRESSION: f64 = 1000.0;

/// Emit a liveness log line every `n` completed tasks.
pub const DEFAULT_PROGRESS_INTERVAL: usize = 100;

/// Quantiles printed for every codec.
pub const REPORT_QUANTILES: [f64; 4] = [0.5, 0.75, 0.9, 0.99];

/// File name of a block's postings index inside the block directory.
pub const BLOCK_POSTINGS_FILE: &str = "postings.json";
