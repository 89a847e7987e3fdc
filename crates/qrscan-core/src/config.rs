//! Application configuration and persistence utilities.
//!
//! Stores the scanner preferences as pretty JSON in the platform config
//! directory. Every field has a default so older or hand-edited files keep
//! loading.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::scanner::ScannerOptions;
use crate::types::Facing;

/// Shortest sample interval accepted from configuration.
pub const MIN_SAMPLE_INTERVAL_MS: u64 = 50;

/// Configuration error type.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Other configuration error.
    #[error("{0}")]
    Other(String),
}

/// Theme configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ThemeConfig {
    /// Follow the terminal background.
    #[default]
    System,
    /// Force light theme.
    Light,
    /// Force dark theme.
    Dark,
}

impl ThemeConfig {
    /// Get display label.
    pub fn label(&self) -> &'static str {
        match self {
            ThemeConfig::System => "System",
            ThemeConfig::Light => "Light",
            ThemeConfig::Dark => "Dark",
        }
    }
}

/// Camera device index for each facing mode.
///
/// Desktop cameras do not report which way they face, so the mapping is
/// configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraIndices {
    #[serde(default)]
    pub environment: u32,
    #[serde(default = "default_user_index")]
    pub user: u32,
}

fn default_user_index() -> u32 {
    1
}

impl Default for CameraIndices {
    fn default() -> Self {
        Self {
            environment: 0,
            user: default_user_index(),
        }
    }
}

impl CameraIndices {
    pub fn for_facing(&self, facing: Facing) -> u32 {
        match facing {
            Facing::Environment => self.environment,
            Facing::User => self.user,
        }
    }

    pub fn set(&mut self, facing: Facing, index: u32) {
        match facing {
            Facing::Environment => self.environment = index,
            Facing::User => self.user = index,
        }
    }
}

/// Persisted scanner preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Camera requested on start; updated on exit with the last one used.
    #[serde(default)]
    pub facing: Facing,
    /// Milliseconds between capture-and-decode attempts.
    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,
    /// Milliseconds to wait between closing one camera and opening the other.
    #[serde(default = "default_switch_delay_ms")]
    pub switch_delay_ms: u64,
    /// Device index per facing mode.
    #[serde(default)]
    pub cameras: CameraIndices,
    /// Theme preference.
    #[serde(default)]
    pub theme: ThemeConfig,
}

fn default_sample_interval_ms() -> u64 {
    500
}

fn default_switch_delay_ms() -> u64 {
    100
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            facing: Facing::Environment,
            sample_interval_ms: default_sample_interval_ms(),
            switch_delay_ms: default_switch_delay_ms(),
            cameras: CameraIndices::default(),
            theme: ThemeConfig::System,
        }
    }
}

impl AppConfig {
    /// Options for building a [`crate::Scanner`].
    pub fn scanner_options(&self) -> ScannerOptions {
        ScannerOptions {
            facing: self.facing,
            sample_interval: Duration::from_millis(
                self.sample_interval_ms.max(MIN_SAMPLE_INTERVAL_MS),
            ),
            switch_delay: Duration::from_millis(self.switch_delay_ms),
        }
    }
}

// ==================== Path Utilities ====================

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "qrscan", "qrscan")
}

/// Get the config directory.
pub fn get_config_dir() -> Result<PathBuf, ConfigError> {
    project_dirs()
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| ConfigError::Other("Could not determine config directory".to_string()))
}

/// Get the config file path.
pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    get_config_dir().map(|dir| dir.join("config.json"))
}

// ==================== Config I/O ====================

/// Load configuration from disk.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&get_config_path()?)
}

/// Save configuration to disk.
pub fn save_config(config: &AppConfig) -> Result<(), ConfigError> {
    save_config_to(config, &get_config_path()?)
}

/// Load configuration from a specific file. A missing file yields defaults.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }

    let content = fs::read_to_string(path)?;
    let config = serde_json::from_str(&content)?;
    Ok(config)
}

/// Save configuration to a specific file, creating parent directories.
pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let content = serde_json::to_string_pretty(config)?;
    fs::write(path, content)?;
    Ok(())
}

/// Backup a corrupted config file for debugging. Returns the backup path.
pub fn backup_corrupted_config(path: &Path) -> Result<PathBuf, ConfigError> {
    let parent = path
        .parent()
        .ok_or_else(|| ConfigError::Other("Config path has no parent directory".to_string()))?;
    let backup_path = parent.join(format!(
        "config.backup.{}",
        chrono::Utc::now().format("%Y%m%d_%H%M%S")
    ));
    fs::copy(path, &backup_path)?;
    Ok(backup_path)
}
