use super::models::{FileEntry, RankingRecord};
use crate::scanner::{extension_of, Category};
use crate::sort::ranked_files;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

/// Category of `path` under a record's extension map; unmapped extensions are `Other`.
pub fn resolve_category(categories: &HashMap<String, Category>, path: &str) -> Category {
    categories
        .get(&extension_of(Path::new(path)))
        .copied()
        .unwrap_or(Category::Other)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedEntry {
    /// 1-based position in the current order.
    pub rank: usize,
    pub file: FileEntry,
    pub category: Category,
}

/// One page of a ranking's current order. Partial rankings list the settled
/// prefix first, then the files not yet placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedPage {
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total_files: usize,
    pub entries: Vec<RankedEntry>,
}

impl RankedPage {
    /// `page` is 1-based and clamped into range.
    pub fn build(record: &RankingRecord, page: usize, page_size: usize) -> Self {
        let page_size = page_size.max(1);
        let ranked = ranked_files(&record.files, &record.matches);
        let total_files = ranked.len();
        let total_pages = total_files.div_ceil(page_size).max(1);
        let page = page.clamp(1, total_pages);
        let categories = record.extension_categories();

        let entries = ranked
            .into_iter()
            .enumerate()
            .skip((page - 1) * page_size)
            .take(page_size)
            .map(|(idx, file)| RankedEntry {
                rank: idx + 1,
                category: resolve_category(&categories, &file.path),
                file,
            })
            .collect();

        RankedPage {
            page,
            page_size,
            total_pages,
            total_files,
            entries,
        }
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

/// Every file of the record in its current order, with rank and category.
pub fn ranked_entries(record: &RankingRecord) -> Vec<RankedEntry> {
    let categories = record.extension_categories();
    ranked_files(&record.files, &record.matches)
        .into_iter()
        .enumerate()
        .map(|(idx, file)| RankedEntry {
            rank: idx + 1,
            category: resolve_category(&categories, &file.path),
            file,
        })
        .collect()
}
