use glob::Pattern;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, warn};
use walkdir::WalkDir;

/// Cooperative cancellation flag shared between a scan and whoever may stop it.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    canceled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.canceled.store(true, Ordering::SeqCst);
    }

    pub fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::SeqCst)
    }
}

/// Lazy depth-first traversal yielding absolute paths of regular files.
///
/// Symlinks are never followed nor yielded. Unreadable directories are skipped
/// along with their subtree. Once `is_canceled` returns true the walk ends.
pub struct Walk<F: Fn() -> bool> {
    inner: walkdir::IntoIter,
    is_canceled: F,
    ignore_patterns: Vec<Pattern>,
    finished: bool,
}

pub fn walk<F: Fn() -> bool>(root: &Path, is_canceled: F) -> Walk<F> {
    let root = fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());
    Walk {
        inner: WalkDir::new(root).follow_links(false).into_iter(),
        is_canceled,
        ignore_patterns: Vec::new(),
        finished: false,
    }
}

impl<F: Fn() -> bool> Walk<F> {
    /// Prune directories and skip files matching any of the given globs.
    pub fn with_ignore_patterns(mut self, ignore_globs: &[String]) -> Self {
        self.ignore_patterns = ignore_globs
            .iter()
            .filter_map(|glob| match Pattern::new(glob) {
                Ok(p) => Some(p),
                Err(e) => {
                    error!("Invalid glob pattern '{}': {}", glob, e);
                    None
                }
            })
            .collect();
        self
    }

    fn is_ignored(&self, path: &Path) -> bool {
        self.ignore_patterns
            .iter()
            .any(|pattern| pattern.matches_path(path))
    }
}

impl<F: Fn() -> bool> Iterator for Walk<F> {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        if self.finished {
            return None;
        }
        loop {
            if (self.is_canceled)() {
                self.finished = true;
                return None;
            }

            let entry = match self.inner.next() {
                Some(Ok(entry)) => entry,
                Some(Err(err)) => {
                    warn!("Skipping unreadable entry: {}", err);
                    continue;
                }
                None => {
                    self.finished = true;
                    return None;
                }
            };

            let file_type = entry.file_type();
            if file_type.is_symlink() {
                continue;
            }

            if file_type.is_dir() {
                if entry.depth() > 0 && self.is_ignored(entry.path()) {
                    self.inner.skip_current_dir();
                }
                continue;
            }

            if file_type.is_file() && !self.is_ignored(entry.path()) {
                return Some(entry.into_path());
            }
        }
    }
}

/// Drain a full walk, counting files. Used to size progress before classification.
pub fn count_files<F: Fn() -> bool>(root: &Path, ignore_globs: &[String], is_canceled: F) -> usize {
    walk(root, is_canceled)
        .with_ignore_patterns(ignore_globs)
        .count()
}
