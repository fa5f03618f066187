pub mod models;
pub mod service;
pub mod session;
pub mod view;

pub use models::{
    ExtensionSelection, FileEntry, Match, RankingRecord, RankingStatus, RankingSummary,
};
pub use service::RankingService;
pub use session::{Comparison, RankingSession, Side};
pub use view::{ranked_entries, resolve_category, RankedEntry, RankedPage};
