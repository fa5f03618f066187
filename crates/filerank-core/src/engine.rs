use crate::config::AppConfig;
use crate::progress::ProgressReporter;
use crate::ranking::models::{ExtensionSelection, FileEntry};
use crate::scanner::{self, CancelToken, ScanAccumulator, ScanResult};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

/// Folder-level pipelines: the extension census and the file-set collection
/// for a new ranking. Both honor the cancel token and report through a
/// [`ProgressReporter`].
pub struct ScanEngine {
    config: AppConfig,
}

impl ScanEngine {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Count pass, then classify pass. `None` if canceled at any point.
    pub fn scan(
        &self,
        folder: &Path,
        token: &CancelToken,
        reporter: &dyn ProgressReporter,
    ) -> Option<ScanResult> {
        let is_canceled = || token.is_canceled();
        let ignore = &self.config.ignore_patterns;

        info!("Scanning {}", folder.display());
        let start = Instant::now();

        reporter.on_count_start();
        let total = scanner::count_files(folder, ignore, is_canceled);
        if token.is_canceled() {
            reporter.on_scan_canceled(0);
            return None;
        }
        reporter.on_count_complete(total);
        debug!("Counted {} files under {}", total, folder.display());

        let mut acc = ScanAccumulator::new(total, self.config.progress_interval());
        let walker = scanner::walk(folder, is_canceled);
        for path in walker.with_ignore_patterns(ignore) {
            let extension = scanner::extension_of(&path);
            let category = scanner::classify_path(&path, self.config.sample_bytes);
            let path_str = path.to_string_lossy();
            if let Some(progress) = acc.record(&path_str, &extension, category) {
                reporter.on_scan_progress(
                    progress.processed,
                    progress.total,
                    &progress.current_path,
                );
            }
        }

        if token.is_canceled() {
            info!(
                "Scan of {} canceled after {} files",
                folder.display(),
                acc.processed()
            );
            reporter.on_scan_canceled(acc.processed());
            return None;
        }
        if let Some(progress) = acc.pending_snapshot() {
            reporter.on_scan_progress(
                progress.processed,
                progress.total,
                &progress.current_path,
            );
        }

        let result = acc.finish();
        let elapsed = start.elapsed().as_secs_f64();
        reporter.on_scan_complete(result.total_files, elapsed);
        info!("Scanned {} files in {:.2}s", result.total_files, elapsed);
        Some(result)
    }

    /// Walk `folder` again and keep the files whose (category, extension)
    /// bucket is selected. Each kept file gets a fresh id.
    pub fn collect_files(
        &self,
        folder: &Path,
        selections: &[ExtensionSelection],
        token: &CancelToken,
        reporter: &dyn ProgressReporter,
    ) -> Option<Vec<FileEntry>> {
        let mut wanted: HashMap<&str, HashSet<scanner::Category>> = HashMap::new();
        for selection in selections {
            wanted
                .entry(selection.extension.as_str())
                .or_default()
                .insert(selection.category);
        }

        let start = Instant::now();
        let mut files = Vec::new();
        let walker = scanner::walk(folder, || token.is_canceled())
            .with_ignore_patterns(&self.config.ignore_patterns);
        for path in walker {
            let extension = scanner::extension_of(&path);
            // Only sniff content for extensions that could be kept.
            let Some(categories) = wanted.get(extension.as_str()) else {
                continue;
            };
            let category = scanner::classify_path(&path, self.config.sample_bytes);
            if !categories.contains(&category) {
                continue;
            }
            let path_str = path.to_string_lossy().into_owned();
            reporter.on_collect_progress(files.len() + 1, &path_str);
            files.push(FileEntry {
                id: Uuid::new_v4().to_string(),
                path: path_str,
            });
        }

        if token.is_canceled() {
            info!("File collection in {} canceled", folder.display());
            reporter.on_scan_canceled(files.len());
            return None;
        }

        reporter.on_collect_complete(files.len(), start.elapsed().as_secs_f64());
        debug!("Collected {} files from {}", files.len(), folder.display());
        Some(files)
    }

    /// Text preview of a file, `None` when it does not look like text.
    pub fn preview(&self, path: &Path) -> Option<String> {
        scanner::read_text_preview(path, self.config.preview_bytes)
    }
}
