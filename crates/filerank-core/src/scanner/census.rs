use super::classify::Category;
use crate::ranking::models::ExtensionSelection;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionCount {
    pub extension: String,
    pub count: usize,
}

/// Extension histogram of one folder, grouped by category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub total_files: usize,
    pub categories: BTreeMap<Category, Vec<ExtensionCount>>,
}

impl ScanResult {
    /// Every histogram bucket, in category order then histogram order.
    pub fn all_selections(&self) -> Vec<ExtensionSelection> {
        self.categories
            .iter()
            .flat_map(|(category, items)| {
                items.iter().map(move |item| ExtensionSelection {
                    category: *category,
                    extension: item.extension.clone(),
                })
            })
            .collect()
    }

    pub fn count_for(&self, category: Category, extension: &str) -> usize {
        self.categories
            .get(&category)
            .and_then(|items| items.iter().find(|item| item.extension == extension))
            .map(|item| item.count)
            .unwrap_or(0)
    }
}

/// Progress snapshot handed to the reporter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanProgress {
    pub processed: usize,
    pub total: usize,
    pub current_path: String,
}

/// Accumulates per-category extension counts and throttles progress snapshots.
pub struct ScanAccumulator {
    total: usize,
    processed: usize,
    interval: Duration,
    last_emit: Option<Instant>,
    last_emitted_processed: usize,
    last_path: String,
    counts: HashMap<Category, HashMap<String, usize>>,
}

impl ScanAccumulator {
    pub fn new(total: usize, interval: Duration) -> Self {
        Self {
            total,
            processed: 0,
            interval,
            last_emit: None,
            last_emitted_processed: 0,
            last_path: String::new(),
            counts: HashMap::new(),
        }
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    /// Count one file. Returns a snapshot when the throttle allows one, and
    /// always for the file that reaches `total`.
    pub fn record(
        &mut self,
        path: &str,
        extension: &str,
        category: Category,
    ) -> Option<ScanProgress> {
        self.record_at(path, extension, category, Instant::now())
    }

    fn record_at(
        &mut self,
        path: &str,
        extension: &str,
        category: Category,
        now: Instant,
    ) -> Option<ScanProgress> {
        *self
            .counts
            .entry(category)
            .or_default()
            .entry(extension.to_string())
            .or_insert(0) += 1;
        self.processed += 1;
        self.last_path.clear();
        self.last_path.push_str(path);

        let is_final = self.processed >= self.total;
        let is_due = match self.last_emit {
            Some(last) => now.duration_since(last) >= self.interval,
            None => true,
        };
        if !is_final && !is_due {
            return None;
        }
        self.last_emit = Some(now);
        Some(self.snapshot())
    }

    /// Snapshot of the last recorded file if the reporter has not seen it yet.
    /// Covers trees that shrank between the counting pass and the scan pass.
    pub fn pending_snapshot(&self) -> Option<ScanProgress> {
        if self.processed == self.last_emitted_processed {
            return None;
        }
        Some(ScanProgress {
            processed: self.processed,
            total: self.total.max(self.processed),
            current_path: self.last_path.clone(),
        })
    }

    fn snapshot(&mut self) -> ScanProgress {
        self.last_emitted_processed = self.processed;
        ScanProgress {
            processed: self.processed,
            total: self.total.max(self.processed),
            current_path: self.last_path.clone(),
        }
    }

    /// Histogram sorted by descending count, ties broken by extension name.
    pub fn finish(self) -> ScanResult {
        let mut categories: BTreeMap<Category, Vec<ExtensionCount>> =
            Category::ALL.iter().map(|c| (*c, Vec::new())).collect();

        for (category, extensions) in self.counts {
            let mut items: Vec<ExtensionCount> = extensions
                .into_iter()
                .map(|(extension, count)| ExtensionCount { extension, count })
                .collect();
            items.sort_by(|a, b| {
                b.count
                    .cmp(&a.count)
                    .then_with(|| a.extension.cmp(&b.extension))
            });
            categories.insert(category, items);
        }

        ScanResult {
            total_files: self.processed,
            categories,
        }
    }
}
