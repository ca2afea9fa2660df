// SPDX-License-Identifier: AGPL-3.0
// Course Finder Core - Configuration
//
// Read from config.json in the platform config directory. A missing or
// unreadable file falls back to defaults.

use crate::auth_api::DEFAULT_AUTH_ENDPOINT;
use crate::types::AppError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that overrides the data directory
pub const DATA_DIR_ENV: &str = "COURSE_FINDER_DATA_DIR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Where the key-value store keeps its files (default: platform data dir)
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default = "default_auth_endpoint")]
    pub auth_endpoint: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Simulated latency of a course search
    #[serde(default = "default_catalog_delay_ms")]
    pub catalog_delay_ms: u64,
    /// Search used when the query is blank
    #[serde(default = "default_query")]
    pub default_query: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_auth_endpoint() -> String {
    DEFAULT_AUTH_ENDPOINT.to_string()
}

fn default_request_timeout_secs() -> u64 {
    15
}

fn default_catalog_delay_ms() -> u64 {
    500
}

fn default_query() -> String {
    "computer science".to_string()
}

fn default_page_size() -> usize {
    20
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            auth_endpoint: default_auth_endpoint(),
            request_timeout_secs: default_request_timeout_secs(),
            catalog_delay_ms: default_catalog_delay_ms(),
            default_query: default_query(),
            page_size: default_page_size(),
        }
    }
}

impl AppConfig {
    /// Load config.json from the platform config directory
    pub fn load() -> Result<Self, AppError> {
        let dirs = project_dirs()?;
        let mut config = Self::load_from(&dirs.config_dir().join("config.json"))?;
        config.apply_env(std::env::var(DATA_DIR_ENV).ok());
        Ok(config)
    }

    /// Load a specific file. Missing ⇒ defaults, unparsable ⇒ defaults with a warning.
    pub fn load_from(path: &Path) -> Result<Self, AppError> {
        if !path.exists() {
            tracing::info!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        tracing::info!("Loading config from {:?}", path);
        let content = fs::read_to_string(path)
            .map_err(|e| AppError::FileIo(format!("Failed to read config: {}", e)))?;

        let config = serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!("Failed to parse config, using defaults: {}", e);
            Self::default()
        });
        Ok(config)
    }

    fn apply_env(&mut self, data_dir: Option<String>) {
        if let Some(dir) = data_dir.filter(|d| !d.trim().is_empty()) {
            tracing::info!("{} overrides data dir: {}", DATA_DIR_ENV, dir);
            self.data_dir = Some(PathBuf::from(dir));
        }
    }

    /// Resolved directory for persisted state
    pub fn data_dir(&self) -> Result<PathBuf, AppError> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(project_dirs()?.data_dir().to_path_buf()),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn catalog_delay(&self) -> Duration {
        Duration::from_millis(self.catalog_delay_ms)
    }

    /// Check values that would make the app unusable
    pub fn validate(&self) -> Result<(), AppError> {
        if self.auth_endpoint.trim().is_empty() {
            return Err(AppError::InvalidConfig("authEndpoint is empty".to_string()));
        }
        if self.page_size == 0 {
            return Err(AppError::InvalidConfig("pageSize must be at least 1".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(AppError::InvalidConfig(
                "requestTimeoutSecs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn project_dirs() -> Result<directories::ProjectDirs, AppError> {
    directories::ProjectDirs::from("com", "uom", "course-finder")
        .ok_or_else(|| AppError::FileIo("Could not determine config directory".to_string()))
}
