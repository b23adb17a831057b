use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";
pub const DEFAULT_LANGUAGE: &str = "en-US";
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const LOG_FILE_NAME: &str = "movie-space.log";

/// What to do when a later page repeats a title already in the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Append every item as received.
    #[default]
    Keep,
    /// Skip items whose id is already listed.
    DropById,
}

/// Runtime configuration. Every field has a baked default so a partial
/// `config.json` is enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_key: String,
    pub base_url: String,
    pub image_base_url: String,
    pub language: String,
    pub duplicate_policy: DuplicatePolicy,
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            duplicate_policy: DuplicatePolicy::Keep,
            request_timeout_secs: 20,
        }
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "moviespace", "movie-space")
}

/// `config.json` under the platform config directory.
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// Log file under the platform cache directory.
pub fn default_log_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.cache_dir().join(LOG_FILE_NAME))
}

impl AppConfig {
    /// Load from an explicit path (which must exist) or from the default
    /// location (which may be absent).
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                Some(path) => {
                    debug!(path = %path.display(), "no config file, using defaults");
                    Ok(Self::default())
                }
                None => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Command-line values win over the file.
    pub fn with_overrides(mut self, api_key: Option<String>, language: Option<String>) -> Self {
        if let Some(key) = api_key {
            self.api_key = key;
        }
        if let Some(language) = language {
            self.language = language;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(())
    }
}
