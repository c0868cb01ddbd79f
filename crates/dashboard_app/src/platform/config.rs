//! RON configuration for the dashboard binary.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use dashboard_core::PageKind;
use dashboard_engine::FetchSettings;
use dashboard_logging::{LogDestination, DEFAULT_LOG_FILE};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "dashboard.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub base_url: String,
    pub output_dir: PathBuf,
    pub conversations_poll_secs: u64,
    pub plugins_poll_secs: u64,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub max_response_bytes: u64,
    /// Render tick; drives re-evaluation of the "recent" filter.
    pub tick_millis: u64,
    pub log_destination: LogDestination,
    pub log_file: PathBuf,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        let fetch = FetchSettings::default();
        Self {
            base_url: fetch.base_url,
            output_dir: PathBuf::from("./dashboard"),
            conversations_poll_secs: PageKind::Conversations.default_poll_interval().as_secs(),
            plugins_poll_secs: PageKind::Plugins.default_poll_interval().as_secs(),
            connect_timeout_secs: fetch.connect_timeout.as_secs(),
            request_timeout_secs: fetch.request_timeout.as_secs(),
            max_response_bytes: fetch.max_bytes,
            tick_millis: 1_000,
            log_destination: LogDestination::Terminal,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl DashboardConfig {
    /// Reads `path`. A missing file yields `Ok(None)` so callers can fall back
    /// to defaults.
    pub fn load(path: &Path) -> Result<Option<Self>, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let config: Self = ron::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(Some(config))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("base_url is empty".into()));
        }
        if self.conversations_poll_secs == 0 || self.plugins_poll_secs == 0 {
            return Err(ConfigError::Invalid(
                "poll intervals must be at least one second".into(),
            ));
        }
        if self.tick_millis == 0 {
            return Err(ConfigError::Invalid("tick_millis must be positive".into()));
        }
        Ok(())
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            base_url: self.base_url.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            max_bytes: self.max_response_bytes,
        }
    }

    pub fn poll_interval(&self, page: PageKind) -> Duration {
        match page {
            PageKind::Conversations => Duration::from_secs(self.conversations_poll_secs),
            PageKind::Plugins => Duration::from_secs(self.plugins_poll_secs),
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }

    pub fn to_ron(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::new())
    }
}
