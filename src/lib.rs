//! Posting-list compression benchmark.
//!
//! For every `(label name, label value)` posting list supplied by a
//! [`PostingsSource`], the benchmark measures the encoded size under each
//! codec of a [`CodecSet`] and folds the sizes into per-codec distributions.
//! The result of a run is a [`BenchmarkReport`].

pub mod benchmark;
pub mod common;
pub mod core;
pub mod report;
pub mod source;

pub use crate::benchmark::{run_benchmark, BenchmarkConfig, FailurePolicy};
pub use crate::common::errors::BenchError;
pub use crate::common::types::RowId;
pub use crate::core::{
    fingerprint, CodecError, CodecKind, CodecResult, CodecSet, ConcurrentEvaluator, EvaluatorOptions, Fingerprint, GenericCodec, LabeledPostings, ListStats,
    PostingCodec, PostingList, ProgressObserver, RunSummary, SizeDistribution, TDigest, TaskFailure,
};
pub use crate::report::{BenchmarkReport, CodecSummary};
pub use crate::source::{BlockDirectorySource, MemorySource, PostingsSource, SourceError};

pub type Result<T> = std::result::Result<T, BenchError>;
