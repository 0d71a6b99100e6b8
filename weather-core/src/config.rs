use anyhow::{Context, Result, anyhow, ensure};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::provider::{DEFAULT_ENDPOINT, FetcherConfig};

/// Refresh interval used when neither the command line nor the config file sets one.
pub const DEFAULT_FETCH_DELAY: Duration = Duration::from_secs(30 * 60);

/// Longest accepted refresh interval (one year).
pub const MAX_FETCH_DELAY: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Optional settings stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// endpoint = "http://api.openweathermap.org/data/2.5/weather"
/// fetch_delay = "15m"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
    /// Human-readable duration, e.g. "30m" or "1h 15m".
    pub fetch_delay: Option<String>,
}

impl Config {
    /// Load config from the platform config directory, or return an empty
    /// default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load config from an explicit path, which must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-feed", "weather-feed")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Command-line values win over file values.
    pub fn with_overrides(mut self, api_key: Option<String>, endpoint: Option<String>) -> Self {
        if api_key.is_some() {
            self.api_key = api_key;
        }
        if endpoint.is_some() {
            self.endpoint = endpoint;
        }
        self
    }

    pub fn fetch_delay(&self) -> Result<Option<Duration>> {
        self.fetch_delay
            .as_deref()
            .map(|s| {
                humantime::parse_duration(s)
                    .with_context(|| format!("Invalid fetch_delay in config: '{s}'"))
            })
            .transpose()
    }

    pub fn fetcher_config(&self) -> FetcherConfig {
        FetcherConfig {
            endpoint: self.endpoint.clone().unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            api_key: self.api_key.clone(),
        }
    }
}

/// Settings fixed for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub location_id: String,
    pub fetch_delay: Duration,
    pub run_once: bool,
}

impl RunConfig {
    pub fn new(location_id: String, fetch_delay: Duration, run_once: bool) -> Result<Self> {
        ensure!(!location_id.trim().is_empty(), "Location id must not be empty");
        ensure!(!fetch_delay.is_zero(), "Fetch delay must be greater than zero");
        ensure!(
            fetch_delay <= MAX_FETCH_DELAY,
            "Fetch delay must be at most {}",
            humantime::format_duration(MAX_FETCH_DELAY)
        );

        Ok(Self { location_id, fetch_delay, run_once })
    }
}
