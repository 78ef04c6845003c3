//! Configuration management for clip-recorder.
//!
//! Handles loading and saving TOML configuration files with cross-platform
//! paths and atomic write operations.

use crate::{
    AppError, AppResult,
    config::{
        ConflictConfig, NotificationConfig, PlatformConfig, PreviewConfig, RecordingConfig,
        StorageConfig,
    },
};

use clip_recorder_core::{SessionConfig, StorageLayout};

use std::{
    fs,
    io::Write,
    panic::Location,
    path::{Path, PathBuf},
    time::Duration,
};

use directories::ProjectDirs;
use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Main configuration struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Recorder settings.
    #[serde(default)]
    pub recording: RecordingConfig,
    /// Preview player settings.
    #[serde(default)]
    pub preview: PreviewConfig,
    /// Conflict detection settings.
    #[serde(default)]
    pub conflict: ConflictConfig,
    /// Recording directories.
    pub storage: StorageConfig,
    /// Platform policy.
    #[serde(default)]
    pub platform: PlatformConfig,
    /// Notification settings.
    #[serde(default)]
    pub notifications: NotificationConfig,
}

impl Config {
    /// Load configuration from disk, creating default if not found.
    #[track_caller]
    #[instrument]
    pub fn load() -> AppResult<Self> {
        let proj_dirs = Self::project_dirs()?;
        let config_path = Self::config_path(&proj_dirs)?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            info!("No config found, creating default");
            let config = Self::defaults_in(proj_dirs.cache_dir(), proj_dirs.data_dir());
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    /// Read and parse the configuration at `config_path`.
    #[track_caller]
    pub fn load_from(config_path: &Path) -> AppResult<Self> {
        let contents = fs::read_to_string(config_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to read config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to parse config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(config_path = ?config_path, "Configuration loaded");

        Ok(config)
    }

    /// Default configuration keeping temp recordings under `cache_dir` and
    /// saved ones under `data_dir`.
    pub fn defaults_in(cache_dir: &Path, data_dir: &Path) -> Self {
        Self {
            recording: RecordingConfig::default(),
            preview: PreviewConfig::default(),
            conflict: ConflictConfig::default(),
            storage: StorageConfig {
                temp_dir: cache_dir.join("takes"),
                saved_dir: data_dir.join("recordings"),
            },
            platform: PlatformConfig::default(),
            notifications: NotificationConfig::default(),
        }
    }

    /// Save configuration to disk using atomic write pattern.
    ///
    /// Writes to a temporary file first, then renames to prevent corruption
    /// if the process crashes during the write.
    #[track_caller]
    pub fn save_to(&self, config_path: &Path) -> AppResult<()> {
        let contents = toml::to_string_pretty(self).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to serialize config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        // Atomic write: write to temp file then rename
        let temp_path = config_path.with_extension("toml.tmp");

        let mut temp_file = fs::File::create(&temp_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to create temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        temp_file
            .write_all(contents.as_bytes())
            .map_err(|e| AppError::ConfigError {
                reason: format!("Failed to write temp config file: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        temp_file.sync_all().map_err(|e| AppError::ConfigError {
            reason: format!("Failed to sync temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        fs::rename(&temp_path, config_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to rename temp config to final: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(config_path = ?config_path, "Configuration saved (atomic write)");

        Ok(())
    }

    /// Session settings derived from this configuration.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            platform: self.platform.host_platform(),
            storage: StorageLayout {
                temp_dir: self.storage.temp_dir.clone(),
                saved_dir: self.storage.saved_dir.clone(),
            },
            extension: self.recording.extension.clone(),
            tick_interval: Duration::from_millis(self.recording.tick_interval_ms.max(1)),
            progress_interval: Duration::from_millis(self.preview.progress_interval_ms.max(1)),
            fallback_grace: Duration::from_millis(self.conflict.fallback_grace_ms),
        }
    }

    /// Create the temp recording directory. The saved directory is left to
    /// the session, which creates it on first save where the platform
    /// requires it.
    #[track_caller]
    pub fn prepare_storage(&self) -> AppResult<()> {
        if !self.storage.temp_dir.exists() {
            fs::create_dir_all(&self.storage.temp_dir)?;
            debug!(temp_dir = ?self.storage.temp_dir, "Created temp recording directory");
        }
        Ok(())
    }

    /// Directory for log files.
    #[track_caller]
    pub fn log_dir() -> AppResult<PathBuf> {
        Ok(Self::project_dirs()?.data_dir().join("logs"))
    }

    #[track_caller]
    fn project_dirs() -> AppResult<ProjectDirs> {
        ProjectDirs::from("com", "clip-recorder", "Clip-Recorder").ok_or_else(|| {
            AppError::ConfigError {
                reason: "Failed to get project directories".to_string(),
                location: ErrorLocation::from(Location::caller()),
            }
        })
    }

    #[track_caller]
    fn config_path(proj_dirs: &ProjectDirs) -> AppResult<PathBuf> {
        let config_dir = proj_dirs.config_dir();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
            debug!(config_dir = ?config_dir, "Created config directory");
        }

        Ok(config_dir.join("config.toml"))
    }
}
