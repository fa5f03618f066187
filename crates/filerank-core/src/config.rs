use crate::scanner::classify::{DEFAULT_PREVIEW_BYTES, DEFAULT_SAMPLE_BYTES};
use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub db_path: String,
    pub ignore_patterns: Vec<String>,
    pub progress_interval_ms: u64,
    pub sample_bytes: usize,
    pub preview_bytes: usize,
    pub page_size: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: "filerank.db".to_string(),
            ignore_patterns: Vec::new(),
            progress_interval_ms: 120,
            sample_bytes: DEFAULT_SAMPLE_BYTES,
            preview_bytes: DEFAULT_PREVIEW_BYTES,
            page_size: 30,
        }
    }
}

impl AppConfig {
    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }
}

/// Defaults, overlaid by an optional `Config.*` file, overlaid by `FILERANK_*` env vars.
pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let defaults = AppConfig::default();
    let builder = Config::builder()
        .set_default("db_path", defaults.db_path)?
        .set_default("ignore_patterns", Vec::<String>::new())?
        .set_default("progress_interval_ms", defaults.progress_interval_ms)?
        .set_default("sample_bytes", defaults.sample_bytes as u64)?
        .set_default("preview_bytes", defaults.preview_bytes as u64)?
        .set_default("page_size", defaults.page_size as u64)?
        .add_source(ConfigFile::with_name("Config").required(false))
        .add_source(Environment::with_prefix("FILERANK"))
        .build()?;
    builder.try_deserialize::<AppConfig>()
}
