mod evaluator;
mod list_stats;
mod progress;
mod run_state;

pub use evaluator::{ConcurrentEvaluator, EvaluatorOptions, FailurePolicy};
pub use list_stats::ListStats;
pub use progress::ProgressObserver;
pub use run_state::{RunSummary, TaskFailure};
