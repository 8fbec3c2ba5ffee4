/// Application settings
///
/// Loaded once at startup from, in increasing precedence:
/// - built-in defaults
/// - `<config_dir>/draw-catalog/config.toml` (optional)
/// - `DRAW_CATALOG_*` environment variables (`__` separates nested keys,
///   e.g. `DRAW_CATALOG_IMAGE__MAX_DIMENSION=1280`)

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Environment, File};
use serde::Deserialize;
use thiserror::Error;

use crate::media::CompressionOptions;

const ENV_PREFIX: &str = "DRAW_CATALOG";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the catalog backend
    pub api_url: String,
    /// Records requested per page
    pub page_size: u32,
    /// Quiet time before a search term is applied
    pub search_debounce_ms: u64,
    /// Background refresh period
    pub refresh_interval_secs: u64,
    /// Client-side request timeout; none by default
    pub request_timeout_secs: Option<u64>,
    /// Extra attempts for idempotent requests on network/5xx failures
    pub max_retries: u32,
    /// Base delay between retries, multiplied by the attempt number
    pub retry_backoff_ms: u64,
    /// Upload compression limits
    pub image: CompressionOptions,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:3002/".to_string(),
            page_size: 20,
            search_debounce_ms: 500,
            refresh_interval_secs: 300,
            request_timeout_secs: None,
            max_retries: 0,
            retry_backoff_ms: 250,
            image: CompressionOptions::default(),
        }
    }
}

impl Settings {
    /// Load settings from the default config file location and the environment
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_from(Self::default_path().as_deref())
    }

    /// Load settings from an explicit (optional) file plus the environment.
    /// A missing file is not an error; a malformed one is.
    pub fn load_from(path: Option<&Path>) -> Result<Self, SettingsError> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }

        let settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(settings)
    }

    /// `~/.config/draw-catalog/config.toml` on Linux
    pub fn default_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir().or_else(dirs::home_dir)?;
        path.push("draw-catalog");
        path.push("config.toml");
        Some(path)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}
