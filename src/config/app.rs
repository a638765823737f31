// src/config/app.rs
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::warn;

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_RETENTION_DAYS: u32 = 30;
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 3600;
pub const DEFAULT_FETCH_PAGE_SIZE: u32 = 20;
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Runtime settings read from the environment (after `.env` is loaded).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub retention_days: u32,
    /// `0` disables the background scheduler.
    pub refresh_interval_secs: u64,
    pub fetch_page_size: u32,
    pub news_api_key: String,
    pub openai_api_key: String,
    pub openai_model: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            retention_days: DEFAULT_RETENTION_DAYS,
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
            fetch_page_size: DEFAULT_FETCH_PAGE_SIZE,
            news_api_key: String::new(),
            openai_api_key: String::new(),
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let d = Self::default();
        let cfg = Self {
            data_dir: env::var("NEWS_DATA_DIR")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(d.data_dir),
            retention_days: parse_env("NEWS_RETENTION_DAYS", d.retention_days),
            refresh_interval_secs: parse_env("NEWS_REFRESH_INTERVAL_SECS", d.refresh_interval_secs),
            fetch_page_size: parse_env("NEWS_FETCH_PAGE_SIZE", d.fetch_page_size).clamp(1, 100),
            news_api_key: env::var("NEWS_API_KEY").unwrap_or_default().trim().to_string(),
            openai_api_key: env::var("OPENAI_API_KEY").unwrap_or_default().trim().to_string(),
            openai_model: env::var("OPENAI_MODEL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(d.openai_model),
        };
        // Safe diagnostics: never log key material, only lengths.
        tracing::info!(
            data_dir = %cfg.data_dir.display(),
            retention_days = cfg.retention_days,
            refresh_interval_secs = cfg.refresh_interval_secs,
            news_key_len = cfg.news_api_key.len(),
            openai_key_len = cfg.openai_api_key.len(),
            model = %cfg.openai_model,
            "config loaded"
        );
        cfg
    }
}

fn parse_env<T: FromStr + Copy>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                warn!(var = name, value = %raw, "unparsable value, using default");
                default
            }
        },
        Err(_) => default,
    }
}
