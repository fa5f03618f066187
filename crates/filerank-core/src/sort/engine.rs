//! Interactive quicksort driven by human answers.
//!
//! The recursion of a normal quicksort lives in an explicit stack of
//! [`Operation`]s so the sort can stop after every comparison, be persisted
//! as a decision log, and be rebuilt from that log later.
//!
//! Each partition pass compares one fixed pivot against every remaining item
//! of its sub-list. Items preferred over the pivot go left, the rest go right,
//! and the final order is `sorted(left) ++ [pivot] ++ sorted(right)`: the
//! winner of each comparison ends up earlier.

use crate::ranking::models::FileEntry;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    /// Sort this sub-list and emit it.
    Sort(Vec<FileEntry>),
    /// Emit a single, already placed item.
    Append(FileEntry),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    pub pivot: FileEntry,
    pub items: Vec<FileEntry>,
    pub cursor: usize,
    /// Challengers that beat the pivot; emitted before it.
    pub left: Vec<FileEntry>,
    /// Challengers the pivot beat; emitted after it.
    pub right: Vec<FileEntry>,
}

impl Partition {
    pub fn challenger(&self) -> &FileEntry {
        &self.items[self.cursor]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Idle,
    AwaitingComparison,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winner {
    Pivot,
    Challenger,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    stack: Vec<Operation>,
    partition: Option<Partition>,
    sorted: Vec<FileEntry>,
    comparisons_done: usize,
    phase: Phase,
}

impl SortState {
    /// Fresh state over `files`, advanced to the first comparison (or to `Done`).
    pub fn new(files: &[FileEntry]) -> Self {
        let mut state = SortState {
            stack: vec![Operation::Sort(files.to_vec())],
            partition: None,
            sorted: Vec::with_capacity(files.len()),
            comparisons_done: 0,
            phase: Phase::Idle,
        };
        state.advance();
        state
    }

    /// Pop operations until a comparison is needed or nothing is left.
    /// No-op while a partition is active.
    pub fn advance(&mut self) {
        if self.partition.is_some() {
            return;
        }
        while let Some(operation) = self.stack.pop() {
            match operation {
                Operation::Append(item) => self.sorted.push(item),
                Operation::Sort(items) if items.len() <= 1 => self.sorted.extend(items),
                Operation::Sort(mut items) => {
                    let pivot = items.remove(0);
                    self.partition = Some(Partition {
                        pivot,
                        items,
                        cursor: 0,
                        left: Vec::new(),
                        right: Vec::new(),
                    });
                    self.phase = Phase::AwaitingComparison;
                    return;
                }
            }
        }
        self.phase = Phase::Done;
    }

    /// Apply one decision for the current (pivot, challenger) pair.
    /// Returns false when there is no comparison pending.
    pub fn resolve(&mut self, winner: Winner) -> bool {
        let Some(partition) = self.partition.as_mut() else {
            return false;
        };

        let challenger = partition.items[partition.cursor].clone();
        match winner {
            Winner::Pivot => partition.right.push(challenger),
            Winner::Challenger => partition.left.push(challenger),
        }
        partition.cursor += 1;
        self.comparisons_done += 1;

        if partition.cursor < partition.items.len() {
            return true;
        }

        if let Some(done) = self.partition.take() {
            self.stack.push(Operation::Sort(done.right));
            self.stack.push(Operation::Append(done.pivot));
            self.stack.push(Operation::Sort(done.left));
        }
        self.advance();
        true
    }

    /// The pending comparison as (pivot, challenger).
    pub fn current_pair(&self) -> Option<(&FileEntry, &FileEntry)> {
        self.partition.as_ref().map(|p| (&p.pivot, p.challenger()))
    }

    pub fn partition(&self) -> Option<&Partition> {
        self.partition.as_ref()
    }

    pub fn stack(&self) -> &[Operation] {
        &self.stack
    }

    /// Items already in their final position, best first.
    pub fn sorted(&self) -> &[FileEntry] {
        &self.sorted
    }

    pub fn comparisons_done(&self) -> usize {
        self.comparisons_done
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    pub fn into_sorted(self) -> Vec<FileEntry> {
        self.sorted
    }
}

/// Rough number of comparisons a full sort of `total_files` needs: `round(n·log2 n)`.
/// Display only; the real worst case is quadratic.
pub fn estimate_comparisons(total_files: usize) -> usize {
    if total_files <= 1 {
        return 0;
    }
    let n = total_files as f64;
    ((n * n.log2()).round() as usize).max(1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SortProgress {
    pub done: usize,
    pub estimated: usize,
    pub remaining: usize,
    pub percent: u8,
}

impl SortProgress {
    pub fn new(done: usize, total_files: usize) -> Self {
        let estimated = estimate_comparisons(total_files);
        let percent = if estimated > 0 {
            ((done as f64 / estimated as f64) * 100.0).round().min(100.0) as u8
        } else {
            0
        };
        Self {
            done,
            estimated,
            remaining: estimated.saturating_sub(done),
            percent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(ids: &[&str]) -> Vec<FileEntry> {
        ids.iter()
            .map(|id| FileEntry {
                id: id.to_string(),
                path: format!("/data/{}.txt", id),
            })
            .collect()
    }

    fn ids(entries: &[FileEntry]) -> Vec<&str> {
        entries.iter().map(|f| f.id.as_str()).collect()
    }

    fn run_with<F: Fn(&str, &str) -> Winner>(state: &mut SortState, decide: F) {
        while let Some((pivot, challenger)) = state.current_pair() {
            let winner = decide(&pivot.id, &challenger.id);
            assert!(state.resolve(winner));
        }
    }

    #[test]
    fn test_empty_and_single_need_no_comparisons() {
        let empty = SortState::new(&[]);
        assert!(empty.is_done());
        assert!(empty.sorted().is_empty());
        assert_eq!(empty.comparisons_done(), 0);

        let single = SortState::new(&files(&["a"]));
        assert!(single.is_done());
        assert_eq!(ids(single.sorted()), vec!["a"]);
    }

    #[test]
    fn test_first_partition_uses_first_file_as_pivot() {
        let state = SortState::new(&files(&["a", "b", "c"]));
        assert_eq!(state.phase(), Phase::AwaitingComparison);
        let (pivot, challenger) = state.current_pair().unwrap();
        assert_eq!(pivot.id, "a");
        assert_eq!(challenger.id, "b");
    }

    #[test]
    fn test_pivot_always_wins_keeps_input_order() {
        let mut state = SortState::new(&files(&["A", "B", "C", "D"]));
        run_with(&mut state, |_, _| Winner::Pivot);
        assert!(state.is_done());
        assert_eq!(ids(state.sorted()), vec!["A", "B", "C", "D"]);
        // Every challenger lands on one side, so each pass shrinks by one: 3 + 2 + 1.
        assert_eq!(state.comparisons_done(), 6);
    }

    #[test]
    fn test_challenger_always_wins_reverses_order() {
        let mut state = SortState::new(&files(&["A", "B", "C", "D"]));
        run_with(&mut state, |_, _| Winner::Challenger);
        assert_eq!(ids(state.sorted()), vec!["D", "C", "B", "A"]);
    }

    #[test]
    fn test_larger_id_wins_sorts_descending() {
        let input = ["m", "c", "x", "a", "q", "f", "z", "b"];
        let mut state = SortState::new(&files(&input));
        run_with(&mut state, |pivot, challenger| {
            if challenger > pivot {
                Winner::Challenger
            } else {
                Winner::Pivot
            }
        });

        let mut expected: Vec<&str> = input.to_vec();
        expected.sort_by(|a, b| b.cmp(a));
        assert_eq!(ids(state.sorted()), expected);

        let n = input.len();
        assert!(state.comparisons_done() >= n - 1);
        assert!(state.comparisons_done() <= n * (n - 1) / 2);
    }

    #[test]
    fn test_two_files_need_one_comparison() {
        let mut state = SortState::new(&files(&["a", "b"]));
        assert!(state.resolve(Winner::Challenger));
        assert!(state.is_done());
        assert_eq!(state.comparisons_done(), 1);
        assert_eq!(ids(state.sorted()), vec!["b", "a"]);
    }

    #[test]
    fn test_resolve_without_partition_is_rejected() {
        let mut state = SortState::new(&files(&["a"]));
        let before = state.clone();
        assert!(!state.resolve(Winner::Pivot));
        assert_eq!(state, before);
    }

    #[test]
    fn test_advance_is_idempotent() {
        let mut pending = SortState::new(&files(&["a", "b", "c"]));
        let before = pending.clone();
        pending.advance();
        pending.advance();
        assert_eq!(pending, before);

        let mut done = SortState::new(&files(&["a"]));
        let before = done.clone();
        done.advance();
        assert_eq!(done, before);
    }

    #[test]
    fn test_partition_stays_on_same_pivot() {
        let mut state = SortState::new(&files(&["p", "x", "y", "z"]));
        state.resolve(Winner::Pivot);
        let (pivot, challenger) = state.current_pair().unwrap();
        assert_eq!((pivot.id.as_str(), challenger.id.as_str()), ("p", "y"));
        state.resolve(Winner::Challenger);
        let partition = state.partition().unwrap();
        assert_eq!(ids(&partition.right), vec!["x"]);
        assert_eq!(ids(&partition.left), vec!["y"]);
        assert_eq!(partition.cursor, 2);
    }

    #[test]
    fn test_closing_partition_pushes_left_on_top() {
        let mut state = SortState::new(&files(&["p", "x", "y", "z"]));
        state.resolve(Winner::Challenger); // x beats p
        state.resolve(Winner::Pivot); // p beats y
        state.resolve(Winner::Challenger); // z beats p
        // Left side [x, z] is being sorted first, pivot and right wait on the stack.
        let (pivot, challenger) = state.current_pair().unwrap();
        assert_eq!((pivot.id.as_str(), challenger.id.as_str()), ("x", "z"));
        assert_eq!(
            state.stack(),
            &[
                Operation::Sort(files(&["y"])),
                Operation::Append(files(&["p"]).remove(0)),
            ]
        );
    }

    #[test]
    fn test_estimate_comparisons() {
        assert_eq!(estimate_comparisons(0), 0);
        assert_eq!(estimate_comparisons(1), 0);
        assert_eq!(estimate_comparisons(2), 2);
        assert_eq!(estimate_comparisons(4), 8);
        assert_eq!(estimate_comparisons(10), 33);
    }

    #[test]
    fn test_sort_progress() {
        let progress = SortProgress::new(4, 4);
        assert_eq!(progress.estimated, 8);
        assert_eq!(progress.remaining, 4);
        assert_eq!(progress.percent, 50);

        let over = SortProgress::new(12, 4);
        assert_eq!(over.remaining, 0);
        assert_eq!(over.percent, 100);

        assert_eq!(SortProgress::new(0, 1).percent, 0);
    }
}
