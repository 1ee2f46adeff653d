//! Configuration file support.
//!
//! This module reads `timetabler.toml`, which selects the timetable store and
//! tunes the editor:
//!
//! ```toml
//! [repository]
//! type = "remote"
//!
//! [remote]
//! base_url = "http://localhost:8080"
//! request_timeout_ms = 5000
//!
//! [catalog]
//! path = "catalog.json"
//!
//! [workbench]
//! section_ordering = "kind-first"
//! timeslot_ordering = "minute-only"
//! request_timeout_ms = 10000
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use super::factory::RepositoryType;
use super::repository::RepositoryError;
use crate::models::OrderingRules;

/// Configuration file name searched by [`RepositoryConfig::from_default_location`].
pub const CONFIG_FILE_NAME: &str = "timetabler.toml";

/// Default timeout for a single store request.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Full configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepositoryConfig {
    #[serde(default)]
    pub repository: RepositorySettings,
    #[serde(default)]
    pub remote: RemoteSettings,
    #[serde(default)]
    pub catalog: CatalogSettings,
    #[serde(default)]
    pub workbench: WorkbenchSettings,
}

/// Repository type settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySettings {
    #[serde(rename = "type")]
    pub repo_type: String,
}

impl Default for RepositorySettings {
    fn default() -> Self {
        Self {
            repo_type: "local".to_string(),
        }
    }
}

/// Remote store connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteSettings {
    #[serde(default)]
    pub base_url: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

/// Campus catalog used to seed a local store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSettings {
    /// JSON catalog file; the built-in campus is used when unset.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Editor behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkbenchSettings {
    #[serde(flatten)]
    pub ordering: OrderingRules,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for WorkbenchSettings {
    fn default() -> Self {
        Self {
            ordering: OrderingRules::default(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl WorkbenchSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

impl RepositoryConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(RepositoryConfig)` if successful
    /// * `Err(RepositoryError)` if file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            RepositoryError::configuration(format!("Failed to read config file: {}", e))
        })?;

        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, RepositoryError> {
        let config: RepositoryConfig = toml::from_str(content).map_err(|e| {
            RepositoryError::configuration(format!("Failed to parse config file: {}", e))
        })?;
        config.repository_type()?;
        Ok(config)
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `timetabler.toml` in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> Result<Self, RepositoryError> {
        let search_paths = [
            PathBuf::from(CONFIG_FILE_NAME),
            PathBuf::from("backend").join(CONFIG_FILE_NAME),
            PathBuf::from("..").join(CONFIG_FILE_NAME),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(RepositoryError::configuration(format!(
            "No {} found in standard locations",
            CONFIG_FILE_NAME
        )))
    }

    /// Apply `REPOSITORY_TYPE` and `TIMETABLE_STORE_URL` on top of the file values.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = env::var("TIMETABLE_STORE_URL") {
            self.remote.base_url = url;
            self.repository.repo_type = "remote".to_string();
        }
        if let Ok(repo_type) = env::var("REPOSITORY_TYPE") {
            self.repository.repo_type = repo_type;
        }
        self
    }

    /// Get the repository type from configuration.
    pub fn repository_type(&self) -> Result<RepositoryType, RepositoryError> {
        RepositoryType::from_str(&self.repository.repo_type).map_err(|e| {
            RepositoryError::configuration(format!("Invalid repository type: {}", e))
        })
    }

    /// Remote base URL, required when the repository type is remote.
    pub fn remote_base_url(&self) -> Result<&str, RepositoryError> {
        if self.remote.base_url.trim().is_empty() {
            return Err(RepositoryError::configuration(
                "Remote repository requires 'remote.base_url' setting",
            ));
        }
        Ok(&self.remote.base_url)
    }

    pub fn remote_timeout(&self) -> Duration {
        Duration::from_millis(self.remote.request_timeout_ms)
    }
}
