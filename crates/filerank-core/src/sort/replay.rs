use super::engine::{SortState, Winner};
use crate::ranking::models::{FileEntry, Match};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Order-independent key for a pair of file ids.
pub fn pair_key(a: &str, b: &str) -> String {
    if a < b {
        format!("{}|{}", a, b)
    } else {
        format!("{}|{}", b, a)
    }
}

/// Recorded outcome per unordered pair. A later match for the same pair
/// replaces an earlier one; `None` marks a recorded tie.
#[derive(Debug, Default, Clone)]
pub struct MatchLookup {
    outcomes: HashMap<String, Option<String>>,
}

impl MatchLookup {
    pub fn from_log(log: &[Match]) -> Self {
        let mut outcomes = HashMap::with_capacity(log.len());
        for m in log {
            outcomes.insert(pair_key(&m.left_id, &m.right_id), m.winner_id.clone());
        }
        Self { outcomes }
    }

    /// `None`: never compared. `Some(None)`: tie. `Some(Some(id))`: winner.
    pub fn outcome(&self, a: &str, b: &str) -> Option<Option<&str>> {
        self.outcomes
            .get(&pair_key(a, b))
            .map(|winner| winner.as_deref())
    }
}

impl SortState {
    /// Drive the engine with recorded answers until a pair has no usable
    /// decision (never asked, or tied). Returns the number of decisions applied.
    pub fn apply_recorded(&mut self, lookup: &MatchLookup) -> usize {
        let mut applied = 0;
        while let Some((pivot, challenger)) = self.current_pair() {
            let winner = match lookup.outcome(&pivot.id, &challenger.id) {
                Some(Some(winner)) if winner == pivot.id => Winner::Pivot,
                Some(Some(winner)) if winner == challenger.id => Winner::Challenger,
                Some(None) => {
                    debug!(
                        "Tie recorded for {} vs {}; comparison left open",
                        pivot.id, challenger.id
                    );
                    break;
                }
                _ => break,
            };
            self.resolve(winner);
            applied += 1;
        }
        applied
    }
}

/// Engine state implied by `files` and the decision log. Undo is
/// `rebuild(files, &log[..log.len() - 1])`.
pub fn rebuild(files: &[FileEntry], log: &[Match]) -> SortState {
    let mut state = SortState::new(files);
    let applied = state.apply_recorded(&MatchLookup::from_log(log));
    debug!(
        "Replayed {} of {} recorded matches over {} files",
        applied,
        log.len(),
        files.len()
    );
    state
}

/// Best-first order known so far: the settled prefix, then every file not yet
/// placed in its original order.
pub fn ranked_files(files: &[FileEntry], log: &[Match]) -> Vec<FileEntry> {
    let state = rebuild(files, log);
    if state.is_done() {
        return state.into_sorted();
    }
    let placed: HashSet<&str> = state.sorted().iter().map(|f| f.id.as_str()).collect();
    let mut ranked = state.sorted().to_vec();
    ranked.extend(files.iter().filter(|f| !placed.contains(f.id.as_str())).cloned());
    ranked
}

/// Which side the pivot is drawn on for the pair currently shown.
///
/// The side is picked at random once per pair and held while that pair stays
/// on screen. It never reaches the decision log.
#[derive(Debug, Clone, Default)]
pub struct DisplayPair {
    key: String,
    pivot_on_left: bool,
}

impl DisplayPair {
    /// Re-roll the side if the pair changed. Returns whether the pivot is on the left.
    pub fn place(&mut self, pivot_id: &str, challenger_id: &str) -> bool {
        let key = format!("{}:{}", pivot_id, challenger_id);
        if key != self.key {
            self.key = key;
            self.pivot_on_left = rand::random::<bool>();
        }
        self.pivot_on_left
    }

    /// Placement of the pair if it is the one last placed, else `None`.
    pub fn shown(&self, pivot_id: &str, challenger_id: &str) -> Option<bool> {
        let key = format!("{}:{}", pivot_id, challenger_id);
        (!self.key.is_empty() && key == self.key).then_some(self.pivot_on_left)
    }

    pub fn clear(&mut self) {
        self.key.clear();
    }
}
