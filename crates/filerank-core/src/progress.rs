/// Trait for reporting scan progress.
///
/// CLI implements with indicatif. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    fn on_count_start(&self) {}
    fn on_count_complete(&self, _total_files: usize) {}
    fn on_scan_progress(&self, _processed: usize, _total: usize, _current_path: &str) {}
    fn on_scan_complete(&self, _total_files: usize, _duration_secs: f64) {}
    fn on_scan_canceled(&self, _processed: usize) {}
    fn on_collect_progress(&self, _files_matched: usize, _current_path: &str) {}
    fn on_collect_complete(&self, _files_matched: usize, _duration_secs: f64) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
