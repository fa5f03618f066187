pub mod config;
pub mod engine;
pub mod error;
pub mod progress;
pub mod ranking;
pub mod scanner;
pub mod sort;
pub mod storage;

pub use config::AppConfig;
pub use engine::ScanEngine;
pub use error::Error;
pub use progress::{ProgressReporter, SilentReporter};
pub use ranking::{RankingRecord, RankingService, RankingSession, RankingStatus};
pub use scanner::{CancelToken, Category, ScanResult};
pub use storage::{Database, RankingStore};
