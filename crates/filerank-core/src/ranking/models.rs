use crate::scanner::Category;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// One file taking part in a ranking. Identity is `id`, never the path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileEntry {
    pub id: String,
    pub path: String,
}

/// One histogram bucket chosen for inclusion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExtensionSelection {
    pub category: Category,
    pub extension: String,
}

impl FromStr for ExtensionSelection {
    type Err = String;

    /// Parses `category:.ext`, e.g. `image:.jpg`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (category, extension) = s
            .split_once(':')
            .ok_or_else(|| format!("expected category:extension, got '{}'", s))?;
        let extension = extension.trim();
        if extension.is_empty() {
            return Err(format!("missing extension in '{}'", s));
        }
        Ok(ExtensionSelection {
            category: category.parse()?,
            extension: extension.to_lowercase(),
        })
    }
}

impl fmt::Display for ExtensionSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.category, self.extension)
    }
}

/// One recorded comparison. `winner_id`, when present, is one of the two sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub left_id: String,
    pub right_id: String,
    pub winner_id: Option<String>,
}

impl Match {
    pub fn new(left_id: &str, right_id: &str, winner_id: Option<&str>) -> Self {
        Self {
            left_id: left_id.to_string(),
            right_id: right_id.to_string(),
            winner_id: winner_id.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RankingStatus {
    InProgress,
    Complete,
}

impl RankingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RankingStatus::InProgress => "InProgress",
            RankingStatus::Complete => "Complete",
        }
    }

    /// Status of a record with no matches: nothing to compare means complete.
    pub fn initial_for(file_count: usize) -> Self {
        if file_count <= 1 {
            RankingStatus::Complete
        } else {
            RankingStatus::InProgress
        }
    }
}

impl fmt::Display for RankingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RankingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', '_', ' '], "");
        match normalized.as_str() {
            "inprogress" | "progress" => Ok(RankingStatus::InProgress),
            "complete" => Ok(RankingStatus::Complete),
            other => Err(format!("unknown status '{}'", other)),
        }
    }
}

/// A persisted ranking: a fixed file set plus the append-only match log.
///
/// `status` is a cache of "the log fully orders `files`". The log is ground truth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingRecord {
    pub id: String,
    pub name: String,
    pub source_folder: String,
    pub extension_selections: Vec<ExtensionSelection>,
    pub files: Vec<FileEntry>,
    pub matches: Vec<Match>,
    pub status: RankingStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl RankingRecord {
    pub fn file(&self, id: &str) -> Option<&FileEntry> {
        self.files.iter().find(|f| f.id == id)
    }

    /// Reject matches that reference unknown files or name a third party as winner.
    pub fn validate_match(&self, m: &Match) -> Result<(), String> {
        if m.left_id == m.right_id {
            return Err(format!("'{}' cannot be compared with itself", m.left_id));
        }
        let ids: HashSet<&str> = self.files.iter().map(|f| f.id.as_str()).collect();
        for id in [&m.left_id, &m.right_id] {
            if !ids.contains(id.as_str()) {
                return Err(format!("file '{}' is not part of ranking '{}'", id, self.id));
            }
        }
        match &m.winner_id {
            Some(winner) if winner != &m.left_id && winner != &m.right_id => Err(format!(
                "winner '{}' is neither '{}' nor '{}'",
                winner, m.left_id, m.right_id
            )),
            _ => Ok(()),
        }
    }

    /// Extension to category map; the first selection naming an extension wins.
    pub fn extension_categories(&self) -> HashMap<String, Category> {
        let mut map = HashMap::new();
        for selection in &self.extension_selections {
            map.entry(selection.extension.clone())
                .or_insert(selection.category);
        }
        map
    }

    pub fn summary(&self) -> RankingSummary {
        RankingSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            source_folder: self.source_folder.clone(),
            status: self.status,
            updated_at: self.updated_at.clone(),
            file_count: self.files.len(),
            match_count: self.matches.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingSummary {
    pub id: String,
    pub name: String,
    pub source_folder: String,
    pub status: RankingStatus,
    pub updated_at: String,
    pub file_count: usize,
    pub match_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selection(category: Category, extension: &str) -> ExtensionSelection {
        ExtensionSelection {
            category,
            extension: extension.to_string(),
        }
    }

    fn file(id: &str) -> FileEntry {
        FileEntry {
            id: id.to_string(),
            path: format!("/tmp/{}.jpg", id),
        }
    }

    fn record() -> RankingRecord {
        RankingRecord {
            id: "r1".to_string(),
            name: "Test".to_string(),
            source_folder: "/tmp".to_string(),
            extension_selections: vec![
                selection(Category::Text, ".dat"),
                selection(Category::Other, ".dat"),
                selection(Category::Image, ".jpg"),
            ],
            files: vec![file("a"), file("b")],
            matches: Vec::new(),
            status: RankingStatus::InProgress,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_validate_match() {
        let r = record();
        assert!(r.validate_match(&Match::new("a", "b", Some("a"))).is_ok());
        assert!(r.validate_match(&Match::new("a", "b", Some("b"))).is_ok());
        assert!(r.validate_match(&Match::new("a", "b", None)).is_ok());
        assert!(r.validate_match(&Match::new("a", "c", Some("a"))).is_err());
        assert!(r.validate_match(&Match::new("a", "b", Some("c"))).is_err());
        assert!(r.validate_match(&Match::new("a", "a", Some("a"))).is_err());
    }

    #[test]
    fn test_first_selection_wins_for_category_lookup() {
        let map = record().extension_categories();
        assert_eq!(map.get(".dat"), Some(&Category::Text));
        assert_eq!(map.get(".jpg"), Some(&Category::Image));
    }

    #[test]
    fn test_parse_selection_and_status() {
        let sel: ExtensionSelection = "image:.JPG".parse().unwrap();
        assert_eq!(sel.category, Category::Image);
        assert_eq!(sel.extension, ".jpg");
        assert_eq!(sel.to_string(), "image:.jpg");
        assert!("image".parse::<ExtensionSelection>().is_err());
        assert!("movie:.mp4".parse::<ExtensionSelection>().is_err());

        let status: RankingStatus = "in-progress".parse().unwrap();
        assert_eq!(status, RankingStatus::InProgress);
        let status: RankingStatus = "Complete".parse().unwrap();
        assert_eq!(status, RankingStatus::Complete);
        assert!("done".parse::<RankingStatus>().is_err());
    }

    #[test]
    fn test_initial_status() {
        assert_eq!(RankingStatus::initial_for(0), RankingStatus::Complete);
        assert_eq!(RankingStatus::initial_for(1), RankingStatus::Complete);
        assert_eq!(RankingStatus::initial_for(2), RankingStatus::InProgress);
    }

    #[test]
    fn test_match_serializes_camel_case() {
        let json = serde_json::to_string(&Match::new("a", "b", None)).unwrap();
        assert_eq!(json, r#"{"leftId":"a","rightId":"b","winnerId":null}"#);
    }
}
