use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;
use tracing::trace;

/// Extension bucket for files whose name carries no usable `.suffix`.
pub const NO_EXTENSION: &str = "(none)";

pub const DEFAULT_SAMPLE_BYTES: usize = 4096;
pub const DEFAULT_PREVIEW_BYTES: usize = 8192;

/// Fraction of control bytes at or above which a sample is treated as binary.
const CONTROL_RATIO_LIMIT: f64 = 0.3;

const IMAGE_EXTENSIONS: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".gif", ".webp", ".bmp", ".tif", ".tiff", ".svg", ".ico", ".heic",
    ".heif", ".avif", ".jxl", ".raw", ".cr2", ".cr3", ".nef", ".arw", ".orf", ".rw2", ".raf",
    ".dng",
];

const VIDEO_EXTENSIONS: &[&str] = &[
    ".mp4", ".m4v", ".mov", ".avi", ".mkv", ".webm", ".wmv", ".flv", ".mpg", ".mpeg", ".3gp",
    ".mts", ".m2ts", ".ogv",
];

const AUDIO_EXTENSIONS: &[&str] = &[
    ".mp3", ".wav", ".flac", ".aac", ".m4a", ".ogg", ".oga", ".opus", ".wma", ".aiff", ".aif",
    ".mid", ".midi",
];

/// Coarse file kind used for preview rendering and extension grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Image,
    Video,
    Audio,
    Text,
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Image,
        Category::Video,
        Category::Audio,
        Category::Text,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Image => "image",
            Category::Video => "video",
            Category::Audio => "audio",
            Category::Text => "text",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "image" => Ok(Category::Image),
            "video" => Ok(Category::Video),
            "audio" => Ok(Category::Audio),
            "text" => Ok(Category::Text),
            "other" => Ok(Category::Other),
            other => Err(format!("unknown category '{}'", other)),
        }
    }
}

/// Normalized extension of a path: the last `.suffix` of the file name, lowercased,
/// including the dot. Dot-files such as `.bashrc` are their own extension.
pub fn extension_of(path: &Path) -> String {
    let name = match path.file_name() {
        Some(name) => name.to_string_lossy(),
        None => return NO_EXTENSION.to_string(),
    };
    match name.rfind('.') {
        Some(idx) if idx + 1 < name.len() => name[idx..].to_lowercase(),
        _ => NO_EXTENSION.to_string(),
    }
}

/// Category implied by the extension alone, if it is a known media type.
pub fn media_category(extension: &str) -> Option<Category> {
    if IMAGE_EXTENSIONS.contains(&extension) {
        Some(Category::Image)
    } else if VIDEO_EXTENSIONS.contains(&extension) {
        Some(Category::Video)
    } else if AUDIO_EXTENSIONS.contains(&extension) {
        Some(Category::Audio)
    } else {
        None
    }
}

/// Pure classification. `sample` is `None` when the content could not be read.
pub fn classify(extension: &str, sample: Option<&[u8]>) -> Category {
    if let Some(category) = media_category(extension) {
        return category;
    }
    match sample {
        Some(bytes) if is_likely_text(bytes) => Category::Text,
        _ => Category::Other,
    }
}

/// Any NUL byte means binary. Otherwise binary when control bytes make up
/// at least 30% of the sample. An empty sample counts as text.
pub fn is_likely_text(sample: &[u8]) -> bool {
    if sample.is_empty() {
        return true;
    }
    if sample.contains(&0) {
        return false;
    }
    let control = sample.iter().filter(|&&b| is_control_byte(b)).count();
    (control as f64) / (sample.len() as f64) < CONTROL_RATIO_LIMIT
}

fn is_control_byte(b: u8) -> bool {
    b < 7 || (b > 13 && b < 32) || b == 127
}

/// Classify a file on disk. Media extensions never touch the file; everything
/// else is sniffed. Read failures classify as `Other`.
pub fn classify_path(path: &Path, sample_bytes: usize) -> Category {
    let extension = extension_of(path);
    if let Some(category) = media_category(&extension) {
        return category;
    }
    match read_head(path, sample_bytes) {
        Ok(sample) => classify(&extension, Some(sample.as_slice())),
        Err(err) => {
            trace!("Cannot sample {}: {}", path.display(), err);
            classify(&extension, None)
        }
    }
}

/// First `preview_bytes` of a text file, NUL-stripped and trimmed.
/// `None` when the file is unreadable or does not look like text.
pub fn read_text_preview(path: &Path, preview_bytes: usize) -> Option<String> {
    let sample = match read_head(path, preview_bytes) {
        Ok(sample) => sample,
        Err(err) => {
            trace!("Cannot read preview of {}: {}", path.display(), err);
            return None;
        }
    };
    if !is_likely_text(&sample) {
        return None;
    }
    let text = String::from_utf8_lossy(&sample).replace('\0', "");
    Some(text.trim().to_string())
}

fn read_head(path: &Path, limit: usize) -> io::Result<Vec<u8>> {
    let file = File::open(path)?;
    let mut buf = Vec::with_capacity(limit.min(64 * 1024));
    file.take(limit as u64).read_to_end(&mut buf)?;
    Ok(buf)
}
