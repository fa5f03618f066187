use super::sqlite::Database;
use super::RankingStore;
use crate::error::Error;
use crate::ranking::models::{ExtensionSelection, FileEntry, Match, RankingRecord, RankingStatus};
use rusqlite::params;
use tracing::debug;

struct RankingRow {
    id: String,
    name: String,
    source_folder: String,
    selections: String,
    status: String,
    created_at: String,
    updated_at: String,
}

impl Database {
    // ── Rankings ─────────────────────────────────────────────────

    fn ranking_rows(&self, id: Option<&str>) -> rusqlite::Result<Vec<RankingRow>> {
        let mut stmt = self.connection().prepare_cached(
            "SELECT id, name, source_folder, selections, status, created_at, updated_at \
             FROM ranking WHERE (?1 IS NULL OR id = ?1) \
             ORDER BY updated_at DESC, id",
        )?;
        let rows = stmt
            .query_map(params![id], |row| {
                Ok(RankingRow {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    source_folder: row.get(2)?,
                    selections: row.get(3)?,
                    status: row.get(4)?,
                    created_at: row.get(5)?,
                    updated_at: row.get(6)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn ranking_files(&self, ranking_id: &str) -> rusqlite::Result<Vec<FileEntry>> {
        let mut stmt = self.connection().prepare_cached(
            "SELECT file_id, path FROM ranking_file WHERE ranking_id = ?1 ORDER BY position",
        )?;
        let files = stmt
            .query_map(params![ranking_id], |row| {
                Ok(FileEntry {
                    id: row.get(0)?,
                    path: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(files)
    }

    fn ranking_matches(&self, ranking_id: &str) -> rusqlite::Result<Vec<Match>> {
        let mut stmt = self.connection().prepare_cached(
            "SELECT left_id, right_id, winner_id FROM ranking_match \
             WHERE ranking_id = ?1 ORDER BY seq",
        )?;
        let matches = stmt
            .query_map(params![ranking_id], |row| {
                Ok(Match {
                    left_id: row.get(0)?,
                    right_id: row.get(1)?,
                    winner_id: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(matches)
    }

    fn hydrate(&self, row: RankingRow) -> Result<RankingRecord, Error> {
        let extension_selections: Vec<ExtensionSelection> = serde_json::from_str(&row.selections)?;
        let status: RankingStatus = row.status.parse().map_err(Error::Other)?;
        let files = self.ranking_files(&row.id)?;
        let matches = self.ranking_matches(&row.id)?;
        Ok(RankingRecord {
            id: row.id,
            name: row.name,
            source_folder: row.source_folder,
            extension_selections,
            files,
            matches,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    pub fn count_rankings(&self) -> rusqlite::Result<i64> {
        self.connection()
            .query_row("SELECT COUNT(*) FROM ranking", [], |row| row.get(0))
    }
}

impl RankingStore for Database {
    fn load_rankings(&self) -> Result<Vec<RankingRecord>, Error> {
        self.ranking_rows(None)?
            .into_iter()
            .map(|row| self.hydrate(row))
            .collect()
    }

    fn get_ranking(&self, id: &str) -> Result<Option<RankingRecord>, Error> {
        match self.ranking_rows(Some(id))?.into_iter().next() {
            Some(row) => Ok(Some(self.hydrate(row)?)),
            None => Ok(None),
        }
    }

    /// Upsert the whole record in one transaction. File rows are only ever
    /// inserted; the match log is rewritten.
    fn save_ranking(&self, record: &RankingRecord) -> Result<(), Error> {
        let selections = serde_json::to_string(&record.extension_selections)?;
        let tx = self.connection().unchecked_transaction()?;
        tx.execute(
            "INSERT INTO ranking \
             (id, name, source_folder, selections, status, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) \
             ON CONFLICT(id) DO UPDATE SET \
                 name = excluded.name, \
                 source_folder = excluded.source_folder, \
                 selections = excluded.selections, \
                 status = excluded.status, \
                 updated_at = excluded.updated_at",
            params![
                record.id,
                record.name,
                record.source_folder,
                selections,
                record.status.as_str(),
                record.created_at,
                record.updated_at,
            ],
        )?;

        let existing_files: i64 = tx.query_row(
            "SELECT COUNT(*) FROM ranking_file WHERE ranking_id = ?1",
            params![record.id],
            |row| row.get(0),
        )?;
        if existing_files == 0 {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO ranking_file (ranking_id, position, file_id, path) \
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (position, file) in record.files.iter().enumerate() {
                stmt.execute(params![record.id, position as i64, file.id, file.path])?;
            }
        }

        tx.execute(
            "DELETE FROM ranking_match WHERE ranking_id = ?1",
            params![record.id],
        )?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO ranking_match (ranking_id, seq, left_id, right_id, winner_id) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for (seq, m) in record.matches.iter().enumerate() {
                let seq = seq as i64;
                stmt.execute(params![record.id, seq, m.left_id, m.right_id, m.winner_id])?;
            }
        }
        tx.commit()?;
        debug!(
            "Saved ranking {} ({} files, {} matches, {})",
            record.id,
            record.files.len(),
            record.matches.len(),
            record.status
        );
        Ok(())
    }

    fn delete_ranking(&self, id: &str) -> Result<bool, Error> {
        let deleted = self
            .connection()
            .execute("DELETE FROM ranking WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }
}

