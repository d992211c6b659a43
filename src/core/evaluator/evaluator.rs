use std::sync::Arc;

use log::{debug, error, info, warn};
use measure_time::info_time;
use parking_lot::Mutex;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use super::run_state::RunState;
use super::{ListStats, ProgressObserver, RunSummary, TaskFailure};
use crate::common::constants::{DEFAULT_DIGEST_COMPRESSION, DEFAULT_MAX_CONCURRENCY, DEFAULT_PROGRESS_INTERVAL};
use crate::core::{CodecSet, LabeledPostings, PostingList};
use crate::source::{PostingsSource, SourceError};
use crate::BenchError;

/// What happens to the run when a codec fails on one posting list.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Abort the whole run on the first failure.
    #[default]
    FailFast,
    /// Record the failing list as a [`TaskFailure`] and keep going.
    SkipAndCount,
}

#[derive(Debug, Clone, Copy, PartialEq, TypedBuilder)]
pub struct EvaluatorOptions {
    /// Worker threads, i.e. posting lists measured at the same time.
    #[builder(default = DEFAULT_MAX_CONCURRENCY)]
    pub max_concurrency: usize,

    #[builder(default = DEFAULT_DIGEST_COMPRESSION)]
    pub digest_compression: f64,

    #[builder(default = DEFAULT_PROGRESS_INTERVAL)]
    pub progress_interval: usize,

    #[builder(default)]
    pub failure_policy: FailurePolicy,
}

impl Default for EvaluatorOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl EvaluatorOptions {
    pub fn is_valid(&self) -> crate::Result<bool> {
        if self.max_concurrency == 0 {
            return Err(BenchError::InvalidConfig("`max_concurrency` must be greater than 0".to_string()));
        }
        if self.progress_interval == 0 {
            return Err(BenchError::InvalidConfig("`progress_interval` must be greater than 0".to_string()));
        }
        if self.digest_compression.is_nan() || self.digest_compression <= 0.0 {
            return Err(BenchError::InvalidConfig(format!("`digest_compression` must be positive, got {}", self.digest_compression)));
        }
        Ok(true)
    }
}

/// Measures every posting list of a corpus under every codec of a [`CodecSet`].
///
/// One task per `(label name, label value)` pair runs on a fixed-size rayon
/// pool. Codec work happens outside the run lock; only the table update,
/// the digests and the counters are serialized. The `evaluate_*` calls return
/// once every scheduled task has ended.
pub struct ConcurrentEvaluator {
    codecs: CodecSet,
    options: EvaluatorOptions,
    pool: ThreadPool,
    observer: Option<Arc<dyn ProgressObserver>>,
}

impl ConcurrentEvaluator {
    pub fn new(codecs: CodecSet, options: EvaluatorOptions) -> crate::Result<Self> {
        options.is_valid()?;
        if codecs.is_empty() {
            return Err(BenchError::InvalidConfig("codec set is empty".to_string()));
        }
        let pool = ThreadPoolBuilder::new()
            .thread_name(|i| format!("codec_worker_{i}"))
            .num_threads(options.max_concurrency)
            .build()
            .map_err(|e| {
                error!("[ConcurrentEvaluator] failed to build worker pool: {}", e);
                BenchError::from(e)
            })?;
        Ok(Self { codecs, options, pool, observer: None })
    }

    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Evaluate lists that are already in memory.
    pub fn evaluate_lists(&self, lists: Vec<LabeledPostings>) -> crate::Result<RunSummary> {
        info_time!("[ConcurrentEvaluator] evaluating {} posting lists", lists.len());
        let state = self.new_state();
        self.pool.install(|| {
            lists.into_par_iter().try_for_each(|labeled| {
                let LabeledPostings { label_name, label_value, refs } = labeled;
                self.evaluate_task(&state, &label_name, &label_value, || Ok(refs))
            })
        })?;
        Ok(self.finish(state))
    }

    /// Evaluate every posting list of `source`.
    ///
    /// Pairs are enumerated up front; each list is read inside its own task.
    pub fn evaluate_source<S>(&self, source: &S) -> crate::Result<RunSummary>
    where
        S: PostingsSource + Sync + ?Sized,
    {
        let pairs = collect_label_pairs(source)?;
        info_time!("[ConcurrentEvaluator] evaluating {} label pairs", pairs.len());
        let state = self.new_state();
        self.pool.install(|| {
            pairs.into_par_iter().try_for_each(|(label_name, label_value)| {
                self.evaluate_task(&state, &label_name, &label_value, || {
                    let postings = source.postings(&label_name, &label_value)?;
                    Ok(postings.collect())
                })
            })
        })?;
        Ok(self.finish(state))
    }

    fn new_state(&self) -> Mutex<RunState> {
        Mutex::new(RunState::new(&self.codecs.kinds(), self.options.digest_compression))
    }

    fn finish(&self, state: Mutex<RunState>) -> RunSummary {
        let summary = state.into_inner().into_summary();
        info!(
            "[ConcurrentEvaluator] finished {} tasks: {} distinct lists, {} duplicates, {} failures",
            summary.completed(),
            summary.distinct_lists(),
            summary.duplicates(),
            summary.failures().len()
        );
        summary
    }

    fn evaluate_task<F>(&self, state: &Mutex<RunState>, label_name: &str, label_value: &str, materialize: F) -> crate::Result<()>
    where
        F: FnOnce() -> Result<PostingList, SourceError>,
    {
        let postings = materialize().map_err(|e| {
            error!("[ConcurrentEvaluator] failed reading postings of `{}={}`: {}", label_name, label_value, e);
            BenchError::from(e)
        })?;
        let fingerprint = postings.fingerprint();

        let completed = match self.codecs.evaluate(postings.refs()) {
            Ok(sizes) => {
                debug!("[ConcurrentEvaluator] `{}={}` ({} refs, fingerprint {}) measured", label_name, label_value, postings.len(), fingerprint);
                let stats = ListStats::new(postings.len(), sizes, label_name, label_value);
                state.lock().record(fingerprint, stats)
            }
            Err(e) => match self.options.failure_policy {
                FailurePolicy::FailFast => {
                    error!("[ConcurrentEvaluator] codec failed on `{}={}`, aborting run: {}", label_name, label_value, e);
                    return Err(BenchError::CodecEvaluation { label_name: label_name.to_string(), label_value: label_value.to_string(), source: e });
                }
                FailurePolicy::SkipAndCount => {
                    warn!("[ConcurrentEvaluator] codec failed on `{}={}`, skipping: {}", label_name, label_value, e);
                    let failure = TaskFailure { label_name: label_name.to_string(), label_value: label_value.to_string(), reason: e.to_string() };
                    state.lock().record_failure(failure)
                }
            },
        };

        if completed % self.options.progress_interval == 0 {
            info!("[ConcurrentEvaluator] {} tasks completed, last `{}={}`", completed, label_name, label_value);
            if let Some(observer) = &self.observer {
                observer.on_progress(completed, label_name, label_value);
            }
        }
        Ok(())
    }
}

fn collect_label_pairs<S>(source: &S) -> Result<Vec<(String, String)>, SourceError>
where
    S: PostingsSource + ?Sized,
{
    let mut pairs = Vec::new();
    for name in source.label_names()? {
        for value in source.label_values(&name)? {
            pairs.push((name.clone(), value));
        }
    }
    Ok(pairs)
}
