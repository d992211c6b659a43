/// Liveness hook, called every `progress_interval` completed tasks.
///
/// Called from worker threads, outside the run lock.
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, completed: usize, label_name: &str, label_value: &str);
}
