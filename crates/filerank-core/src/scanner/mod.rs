pub mod census;
pub mod classify;
pub mod session;
pub mod walk;

pub use census::{ExtensionCount, ScanAccumulator, ScanProgress, ScanResult};
pub use classify::{
    classify, classify_path, extension_of, read_text_preview, Category, NO_EXTENSION,
};
pub use session::ScanSession;
pub use walk::{count_files, walk, CancelToken, Walk};
