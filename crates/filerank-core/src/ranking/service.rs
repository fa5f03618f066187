use super::models::{ExtensionSelection, Match, RankingRecord, RankingStatus};
use super::session::{RankingSession, Side};
use crate::engine::ScanEngine;
use crate::error::Error;
use crate::progress::ProgressReporter;
use crate::scanner::CancelToken;
use crate::sort::rebuild;
use crate::storage::RankingStore;
use chrono::{SecondsFormat, Utc};
use std::path::Path;
use tracing::{debug, info, warn};
use uuid::Uuid;

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Status implied by replaying the record's log.
fn derived_status(record: &RankingRecord) -> RankingStatus {
    if rebuild(&record.files, &record.matches).is_done() {
        RankingStatus::Complete
    } else {
        RankingStatus::InProgress
    }
}

/// Ranking lifecycle on top of a [`RankingStore`].
///
/// Every mutation is a read-modify-write of one whole record. Unknown ids
/// come back as `Ok(None)` or `Ok(false)`.
pub struct RankingService<S: RankingStore> {
    store: S,
    engine: ScanEngine,
}

impl<S: RankingStore> RankingService<S> {
    pub fn new(store: S, engine: ScanEngine) -> Self {
        Self { store, engine }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn engine(&self) -> &ScanEngine {
        &self.engine
    }

    /// Collect the selected files of `folder` and persist a new ranking.
    /// `Ok(None)` when the collection was canceled.
    pub fn create(
        &self,
        name: &str,
        folder: &Path,
        selections: Vec<ExtensionSelection>,
        token: &CancelToken,
        reporter: &dyn ProgressReporter,
    ) -> Result<Option<RankingRecord>, Error> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidArgument("ranking name is empty".to_string()));
        }
        if selections.is_empty() {
            return Err(Error::InvalidArgument(
                "at least one extension must be selected".to_string(),
            ));
        }

        let Some(files) = self.engine.collect_files(folder, &selections, token, reporter) else {
            return Ok(None);
        };

        let timestamp = now();
        let record = RankingRecord {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            source_folder: folder.to_string_lossy().into_owned(),
            extension_selections: selections,
            status: RankingStatus::initial_for(files.len()),
            files,
            matches: Vec::new(),
            created_at: timestamp.clone(),
            updated_at: timestamp,
        };
        self.store.save_ranking(&record)?;
        info!(
            "Created ranking '{}' ({}) with {} files",
            record.name,
            record.id,
            record.files.len()
        );
        Ok(Some(record))
    }

    /// All rankings, most recently updated first.
    pub fn list(&self) -> Result<Vec<RankingRecord>, Error> {
        let mut records = self.store.load_rankings()?;
        records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(records)
    }

    pub fn get(&self, id: &str) -> Result<Option<RankingRecord>, Error> {
        self.store.get_ranking(id)
    }

    /// Load, mutate, stamp `updated_at` and save.
    fn modify<F>(&self, id: &str, change: F) -> Result<Option<RankingRecord>, Error>
    where
        F: FnOnce(&mut RankingRecord) -> Result<(), Error>,
    {
        let Some(mut record) = self.store.get_ranking(id)? else {
            debug!("Ranking {} not found", id);
            return Ok(None);
        };
        change(&mut record)?;
        record.updated_at = now();
        self.store.save_ranking(&record)?;
        Ok(Some(record))
    }

    fn push_match(record: &mut RankingRecord, m: Match) -> Result<(), Error> {
        record.validate_match(&m).map_err(Error::InvalidMatch)?;
        record.matches.push(m);
        if record.status == RankingStatus::Complete {
            record.status = RankingStatus::InProgress;
        }
        Ok(())
    }

    /// Append one decision. A complete ranking drops back to in-progress.
    pub fn append_match(&self, id: &str, m: Match) -> Result<bool, Error> {
        Ok(self
            .modify(id, |record| Self::push_match(record, m))?
            .is_some())
    }

    /// Drop the newest decision and recompute the status from the shorter log.
    /// An empty log leaves the record untouched.
    pub fn undo_last_match(&self, id: &str) -> Result<Option<RankingRecord>, Error> {
        let Some(record) = self.store.get_ranking(id)? else {
            return Ok(None);
        };
        if record.matches.is_empty() {
            return Ok(Some(record));
        }
        self.modify(id, |record| {
            record.matches.pop();
            record.status = derived_status(record);
            Ok(())
        })
    }

    pub fn update_status(&self, id: &str, status: RankingStatus) -> Result<bool, Error> {
        Ok(self
            .modify(id, |record| {
                record.status = status;
                Ok(())
            })?
            .is_some())
    }

    pub fn rename(&self, id: &str, name: &str) -> Result<bool, Error> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidArgument("ranking name is empty".to_string()));
        }
        Ok(self
            .modify(id, |record| {
                record.name = name.to_string();
                Ok(())
            })?
            .is_some())
    }

    /// Clear every decision; status returns to what a fresh ranking would have.
    pub fn reset(&self, id: &str) -> Result<Option<RankingRecord>, Error> {
        self.modify(id, |record| {
            record.matches.clear();
            record.status = RankingStatus::initial_for(record.files.len());
            Ok(())
        })
    }

    pub fn delete(&self, id: &str) -> Result<bool, Error> {
        let deleted = self.store.delete_ranking(id)?;
        if deleted {
            info!("Deleted ranking {}", id);
        }
        Ok(deleted)
    }

    /// Open a session over a stored ranking.
    pub fn open_session(&self, id: &str) -> Result<Option<RankingSession>, Error> {
        Ok(self.store.get_ranking(id)?.map(RankingSession::new))
    }

    /// Answer the comparison the session last showed and persist it. The
    /// record is written as complete once the engine has nothing left to ask.
    /// The session only advances after the save succeeded. `Ok(None)` when no
    /// comparison was shown or the ranking no longer exists.
    pub fn decide(
        &self,
        session: &mut RankingSession,
        side: Side,
    ) -> Result<Option<Match>, Error> {
        let Some((m, winner)) = session.pending_match(side) else {
            return Ok(None);
        };
        let next = session.resolved(winner);
        let done = next.is_done();
        let saved = self.modify(&session.record().id, |record| {
            Self::push_match(record, m.clone())?;
            if done {
                record.status = RankingStatus::Complete;
            }
            Ok(())
        })?;
        let Some(record) = saved else {
            warn!("Ranking {} disappeared during the session", session.record().id);
            return Ok(None);
        };
        if done {
            info!(
                "Ranking '{}' complete after {} matches",
                record.name,
                record.matches.len()
            );
        }
        session.commit(record, next);
        Ok(Some(m))
    }

    /// Undo the newest decision of the session's ranking and replay.
    pub fn undo(&self, session: &mut RankingSession) -> Result<bool, Error> {
        if session.record().matches.is_empty() {
            return Ok(false);
        }
        match self.undo_last_match(&session.record().id)? {
            Some(record) => {
                session.reload(record);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::progress::SilentReporter;
    use crate::ranking::models::FileEntry;
    use crate::scanner::Category;
    use crate::storage::Database;

    /// Reads from an inner database, refuses every write.
    struct ReadOnlyStore(Database);

    impl RankingStore for ReadOnlyStore {
        fn load_rankings(&self) -> Result<Vec<RankingRecord>, Error> {
            self.0.load_rankings()
        }

        fn get_ranking(&self, id: &str) -> Result<Option<RankingRecord>, Error> {
            self.0.get_ranking(id)
        }

        fn save_ranking(&self, _record: &RankingRecord) -> Result<(), Error> {
            Err(Error::Other("store is read-only".to_string()))
        }

        fn delete_ranking(&self, _id: &str) -> Result<bool, Error> {
            Err(Error::Other("store is read-only".to_string()))
        }
    }

    fn service() -> RankingService<Database> {
        RankingService::new(
            Database::open_in_memory().unwrap(),
            ScanEngine::new(AppConfig::default()),
        )
    }

    fn seeded(service: &RankingService<Database>, ids: &[&str]) -> RankingRecord {
        let record = RankingRecord {
            id: Uuid::new_v4().to_string(),
            name: "Seeded".to_string(),
            source_folder: "/data".to_string(),
            extension_selections: vec![ExtensionSelection {
                category: Category::Text,
                extension: ".txt".to_string(),
            }],
            files: ids
                .iter()
                .map(|id| FileEntry {
                    id: id.to_string(),
                    path: format!("/data/{}.txt", id),
                })
                .collect(),
            matches: Vec::new(),
            status: RankingStatus::initial_for(ids.len()),
            created_at: now(),
            updated_at: now(),
        };
        service.store().save_ranking(&record).unwrap();
        record
    }

    #[test]
    fn test_create_rejects_blank_name_and_empty_selection() {
        let service = service();
        let token = CancelToken::new();
        let sel = vec![ExtensionSelection {
            category: Category::Text,
            extension: ".txt".to_string(),
        }];
        let err = service
            .create("  ", Path::new("/"), sel, &token, &SilentReporter)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        let err = service
            .create("ok", Path::new("/"), Vec::new(), &token, &SilentReporter)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_append_rejects_foreign_ids() {
        let service = service();
        let record = seeded(&service, &["a", "b"]);
        let err = service
            .append_match(&record.id, Match::new("a", "z", Some("a")))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidMatch(_)));
        assert!(service.get(&record.id).unwrap().unwrap().matches.is_empty());
    }

    #[test]
    fn test_lookup_misses() {
        let service = service();
        assert!(service.get("nope").unwrap().is_none());
        assert!(!service.append_match("nope", Match::new("a", "b", None)).unwrap());
        assert!(service.undo_last_match("nope").unwrap().is_none());
        assert!(!service.update_status("nope", RankingStatus::Complete).unwrap());
        assert!(!service.rename("nope", "x").unwrap());
        assert!(service.reset("nope").unwrap().is_none());
        assert!(!service.delete("nope").unwrap());
        assert!(service.open_session("nope").unwrap().is_none());
    }

    #[test]
    fn test_undo_on_empty_log_is_unchanged() {
        let service = service();
        let record = seeded(&service, &["a", "b"]);
        let after = service.undo_last_match(&record.id).unwrap().unwrap();
        assert_eq!(after, record);
    }

    #[test]
    fn test_undo_recomputes_status() {
        let service = service();
        let record = seeded(&service, &["a", "b"]);
        let mut session = service.open_session(&record.id).unwrap().unwrap();
        session.current_comparison().unwrap();
        service.decide(&mut session, Side::Left).unwrap().unwrap();
        assert_eq!(session.record().status, RankingStatus::Complete);

        assert!(service.undo(&mut session).unwrap());
        let stored = service.get(&record.id).unwrap().unwrap();
        assert_eq!(stored.status, RankingStatus::InProgress);
        assert!(stored.matches.is_empty());
        assert!(!session.is_done());
        assert!(!service.undo(&mut session).unwrap());
    }

    #[test]
    fn test_rename_trims_and_rejects_blank() {
        let service = service();
        let record = seeded(&service, &["a"]);
        assert!(service.rename(&record.id, "  Holiday  ").unwrap());
        assert_eq!(service.get(&record.id).unwrap().unwrap().name, "Holiday");
        assert!(matches!(
            service.rename(&record.id, "   "),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_reset_restores_initial_status() {
        let service = service();
        let record = seeded(&service, &["a", "b", "c"]);
        let mut session = service.open_session(&record.id).unwrap().unwrap();
        while session.current_comparison().is_some() {
            service.decide(&mut session, Side::Right).unwrap().unwrap();
        }
        assert_eq!(
            service.get(&record.id).unwrap().unwrap().status,
            RankingStatus::Complete
        );

        let reset = service.reset(&record.id).unwrap().unwrap();
        assert!(reset.matches.is_empty());
        assert_eq!(reset.status, RankingStatus::InProgress);
    }

    #[test]
    fn test_decide_without_shown_comparison_is_noop() {
        let service = service();
        let record = seeded(&service, &["a", "b"]);
        let mut session = service.open_session(&record.id).unwrap().unwrap();
        assert!(service.decide(&mut session, Side::Left).unwrap().is_none());
        assert!(service.get(&record.id).unwrap().unwrap().matches.is_empty());
        assert_eq!(session.state().comparisons_done(), 0);
    }

    #[test]
    fn test_decide_on_deleted_ranking_leaves_session() {
        let service = service();
        let record = seeded(&service, &["a", "b", "c"]);
        let mut session = service.open_session(&record.id).unwrap().unwrap();
        let shown = session.current_comparison().unwrap();
        assert!(service.delete(&record.id).unwrap());

        assert!(service.decide(&mut session, Side::Left).unwrap().is_none());
        assert_eq!(session.state().comparisons_done(), 0);
        assert!(session.record().matches.is_empty());
        assert_eq!(session.current_comparison().unwrap(), shown);
    }

    #[test]
    fn test_decide_save_failure_leaves_session() {
        let db = Database::open_in_memory().unwrap();
        let writer = RankingService::new(db, ScanEngine::new(AppConfig::default()));
        let record = seeded(&writer, &["a", "b"]);
        let service = RankingService::new(
            ReadOnlyStore(writer.store),
            ScanEngine::new(AppConfig::default()),
        );
        let mut session = service.open_session(&record.id).unwrap().unwrap();
        session.current_comparison().unwrap();

        let err = service.decide(&mut session, Side::Left).unwrap_err();
        assert!(matches!(err, Error::Other(_)));
        assert!(!session.is_done());
        assert!(session.record().matches.is_empty());
        assert_eq!(session.record().status, RankingStatus::InProgress);
    }
}
