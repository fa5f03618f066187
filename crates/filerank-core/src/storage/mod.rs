pub mod queries;
pub mod sqlite;

pub use sqlite::Database;

use crate::error::Error;
use crate::ranking::models::RankingRecord;

/// Get/put store for ranking records, keyed by ranking id.
///
/// A save replaces the whole record atomically. Writers are expected to be
/// serialized by the caller.
pub trait RankingStore {
    fn load_rankings(&self) -> Result<Vec<RankingRecord>, Error>;
    fn get_ranking(&self, id: &str) -> Result<Option<RankingRecord>, Error>;
    fn save_ranking(&self, record: &RankingRecord) -> Result<(), Error>;
    /// Returns false when no record had that id.
    fn delete_ranking(&self, id: &str) -> Result<bool, Error>;
}
