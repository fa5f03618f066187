use filerank_core::ProgressReporter;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

const TICKS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// indicatif progress for scans and file collection.
///
/// - Count pass: spinner (total unknown)
/// - Classify pass: bar sized by the count pass
/// - Collect pass: spinner with a running match count
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn spinner(message: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            pb.set_style(style.tick_chars(TICKS));
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    }

    fn with_bar<F: FnOnce(&mut Option<ProgressBar>)>(&self, f: F) {
        let mut guard = self.bar.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard);
    }

    fn set_bar(&self, pb: ProgressBar) {
        self.with_bar(|slot| {
            if let Some(old) = slot.replace(pb) {
                old.finish_and_clear();
            }
        });
    }

    fn finish_bar(&self) {
        self.with_bar(|slot| {
            if let Some(pb) = slot.take() {
                pb.finish_and_clear();
            }
        });
    }
}

impl ProgressReporter for CliReporter {
    fn on_count_start(&self) {
        self.set_bar(Self::spinner("Counting files..."));
    }

    fn on_count_complete(&self, total_files: usize) {
        let pb = ProgressBar::new(total_files as u64);
        if let Ok(style) = ProgressStyle::with_template(
            "  {spinner:.cyan} Classifying [{bar:30.cyan/dim}] {pos}/{len} files ({eta} remaining)",
        ) {
            pb.set_style(style.progress_chars("━╸─").tick_chars(TICKS));
        }
        pb.enable_steady_tick(Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn on_scan_progress(&self, processed: usize, total: usize, _current_path: &str) {
        self.with_bar(|slot| {
            if let Some(pb) = slot.as_ref() {
                if pb.length() != Some(total as u64) {
                    pb.set_length(total as u64);
                }
                pb.set_position(processed as u64);
            }
        });
    }

    fn on_scan_complete(&self, total_files: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Scan complete: {} files in {:.2}s",
            total_files, duration_secs
        );
    }

    fn on_scan_canceled(&self, processed: usize) {
        self.finish_bar();
        eprintln!("  \x1b[33m✗\x1b[0m Canceled after {} files", processed);
    }

    fn on_collect_progress(&self, files_matched: usize, _current_path: &str) {
        self.with_bar(|slot| {
            let pb = slot.get_or_insert_with(|| Self::spinner("Collecting files..."));
            pb.set_message(format!("Collecting... {} files selected", files_matched));
        });
    }

    fn on_collect_complete(&self, files_matched: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Collected {} files in {:.2}s",
            files_matched, duration_secs
        );
    }
}
