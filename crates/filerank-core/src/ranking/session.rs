use super::models::{FileEntry, Match, RankingRecord};
use crate::sort::{rebuild, DisplayPair, SortProgress, SortState, Winner};

/// Screen side chosen by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// The pending comparison as it should be drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    pub left: FileEntry,
    pub right: FileEntry,
    pub pivot_on_left: bool,
}

/// Live state of one ranking being worked on: the record, the engine state
/// replayed from its match log, and the display placement of the pending pair.
#[derive(Debug, Clone)]
pub struct RankingSession {
    record: RankingRecord,
    state: SortState,
    display: DisplayPair,
}

impl RankingSession {
    pub fn new(record: RankingRecord) -> Self {
        let state = rebuild(&record.files, &record.matches);
        Self {
            record,
            state,
            display: DisplayPair::default(),
        }
    }

    pub fn record(&self) -> &RankingRecord {
        &self.record
    }

    pub fn state(&self) -> &SortState {
        &self.state
    }

    pub fn is_done(&self) -> bool {
        self.state.is_done()
    }

    pub fn progress(&self) -> SortProgress {
        SortProgress::new(self.state.comparisons_done(), self.record.files.len())
    }

    /// Replace the record and replay its log from scratch (after undo or reset).
    pub fn reload(&mut self, record: RankingRecord) {
        self.state = rebuild(&record.files, &record.matches);
        self.record = record;
        self.display.clear();
    }

    pub fn current_comparison(&mut self) -> Option<Comparison> {
        let (pivot, challenger) = self.state.current_pair()?;
        let pivot_on_left = self.display.place(&pivot.id, &challenger.id);
        let (left, right) = if pivot_on_left {
            (pivot.clone(), challenger.clone())
        } else {
            (challenger.clone(), pivot.clone())
        };
        Some(Comparison {
            left,
            right,
            pivot_on_left,
        })
    }

    /// The match a pick of `side` would record for the comparison last
    /// returned by [`current_comparison`](Self::current_comparison), with the
    /// engine answer it implies. `None` when no comparison has been shown.
    /// The pivot is always `left_id`, whatever side it was drawn on.
    pub fn pending_match(&self, side: Side) -> Option<(Match, Winner)> {
        let (pivot, challenger) = self.state.current_pair()?;
        let pivot_on_left = self.display.shown(&pivot.id, &challenger.id)?;
        let (winner, winner_id) = if (side == Side::Left) == pivot_on_left {
            (Winner::Pivot, pivot.id.as_str())
        } else {
            (Winner::Challenger, challenger.id.as_str())
        };
        let m = Match::new(&pivot.id, &challenger.id, Some(winner_id));
        Some((m, winner))
    }

    /// Engine state after answering the pending pair with `winner`.
    pub(crate) fn resolved(&self, winner: Winner) -> SortState {
        let mut next = self.state.clone();
        next.resolve(winner);
        next
    }

    /// Take over an answer that has been persisted: `record` is the saved copy
    /// and `state` the result of [`resolved`](Self::resolved).
    pub(crate) fn commit(&mut self, record: RankingRecord, state: SortState) {
        self.record = record;
        self.state = state;
        self.display.clear();
    }

    /// Apply the user's pick to the shown pair without persisting it.
    pub fn decide(&mut self, side: Side) -> Option<Match> {
        let (m, winner) = self.pending_match(side)?;
        let state = self.resolved(winner);
        let mut record = self.record.clone();
        record.matches.push(m.clone());
        self.commit(record, state);
        Some(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::models::RankingStatus;

    fn record(ids: &[&str]) -> RankingRecord {
        RankingRecord {
            id: "r".to_string(),
            name: "Test".to_string(),
            source_folder: "/data".to_string(),
            extension_selections: Vec::new(),
            files: ids
                .iter()
                .map(|id| FileEntry {
                    id: id.to_string(),
                    path: format!("/data/{}.txt", id),
                })
                .collect(),
            matches: Vec::new(),
            status: RankingStatus::initial_for(ids.len()),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn pick(session: &mut RankingSession, wanted: &str) -> Match {
        let comparison = session.current_comparison().unwrap();
        let side = if comparison.left.id == wanted {
            Side::Left
        } else {
            Side::Right
        };
        session.decide(side).unwrap()
    }

    #[test]
    fn test_decide_records_pivot_as_left() {
        let mut session = RankingSession::new(record(&["a", "b"]));
        let m = pick(&mut session, "b");
        assert_eq!(m, Match::new("a", "b", Some("b")));
        assert!(session.is_done());
        assert_eq!(session.record().matches, vec![m]);
        assert_eq!(session.state().sorted()[0].id, "b");
    }

    #[test]
    fn test_comparison_is_stable_until_decided() {
        let mut session = RankingSession::new(record(&["a", "b", "c"]));
        let first = session.current_comparison().unwrap();
        for _ in 0..5 {
            assert_eq!(session.current_comparison().unwrap(), first);
        }
        let ids = [first.left.id.as_str(), first.right.id.as_str()];
        assert!(ids.contains(&"a") && ids.contains(&"b"));
    }

    #[test]
    fn test_reload_replays_shorter_log() {
        let mut session = RankingSession::new(record(&["a", "b", "c"]));
        pick(&mut session, "a");
        pick(&mut session, "c");
        let mut shorter = session.record().clone();
        shorter.matches.pop();
        session.reload(shorter);
        assert_eq!(session.state().comparisons_done(), 1);
        let comparison = session.current_comparison().unwrap();
        let ids = [comparison.left.id.as_str(), comparison.right.id.as_str()];
        assert!(ids.contains(&"a") && ids.contains(&"c"));
    }

    #[test]
    fn test_decide_requires_shown_comparison() {
        let mut session = RankingSession::new(record(&["a", "b"]));
        assert!(session.pending_match(Side::Left).is_none());
        assert!(session.decide(Side::Left).is_none());
        assert_eq!(session.state().comparisons_done(), 0);
        assert!(session.record().matches.is_empty());

        session.current_comparison().unwrap();
        assert!(session.decide(Side::Left).is_some());
        assert!(session.is_done());
    }

    #[test]
    fn test_pending_match_leaves_session_untouched() {
        let mut session = RankingSession::new(record(&["a", "b", "c"]));
        let comparison = session.current_comparison().unwrap();
        let (m, _) = session.pending_match(Side::Left).unwrap();
        assert_eq!(m.left_id, "a");
        assert_eq!(m.winner_id.as_deref(), Some(comparison.left.id.as_str()));
        assert_eq!(session.state().comparisons_done(), 0);
        assert_eq!(session.current_comparison().unwrap(), comparison);
    }

    #[test]
    fn test_done_session_has_no_comparison() {
        let mut session = RankingSession::new(record(&["solo"]));
        assert!(session.is_done());
        assert!(session.current_comparison().is_none());
        assert!(session.decide(Side::Left).is_none());
        assert_eq!(session.progress().estimated, 0);
    }
}
