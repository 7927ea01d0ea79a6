//! Run configuration.
//!
//! Built once in `main` from the environment (after `.env` is loaded) and
//! command-line overrides, then handed to the collector. Nothing reads the
//! environment after that point.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

use crate::api::DEFAULT_BASE_URL;
use crate::pacer::{DEFAULT_MAX_DELAY, DEFAULT_MIN_DELAY};

pub const DEFAULT_LOG_FILE: &str = "logs/debug.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScraperConfig {
    /// API root; endpoint paths are appended to it.
    pub base_url: String,
    /// Root of the artifact tree. `routes.json` lives directly in it.
    pub data_dir: PathBuf,
    pub log_file: PathBuf,
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            data_dir: PathBuf::from("."),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            min_delay: DEFAULT_MIN_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

impl ScraperConfig {
    /// Reads `BMTC_API_BASE_URL`, `BMTC_DATA_DIR`, `LOG_FILE_PATH`,
    /// `BMTC_MIN_DELAY_MS` and `BMTC_MAX_DELAY_MS`, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("BMTC_API_BASE_URL") {
            config.base_url = url;
        }
        if let Some(dir) = lookup("BMTC_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(path) = lookup("LOG_FILE_PATH") {
            config.log_file = PathBuf::from(path);
        }
        if let Some(ms) = lookup("BMTC_MIN_DELAY_MS") {
            config.min_delay = parse_millis("BMTC_MIN_DELAY_MS", &ms)?;
        }
        if let Some(ms) = lookup("BMTC_MAX_DELAY_MS") {
            config.max_delay = parse_millis("BMTC_MAX_DELAY_MS", &ms)?;
        }

        Ok(config)
    }
}

fn parse_millis(key: &str, value: &str) -> Result<Duration> {
    let ms: u64 = value
        .trim()
        .parse()
        .with_context(|| format!("{key} must be a number of milliseconds, got {value:?}"))?;
    Ok(Duration::from_millis(ms))
}
