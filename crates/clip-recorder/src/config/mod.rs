mod conflict_config;
#[allow(clippy::module_inception)]
mod config;
mod notification_config;
mod platform_config;
mod preview_config;
mod recording_config;
mod storage_config;

pub(crate) use {
    config::Config,
    conflict_config::ConflictConfig,
    notification_config::NotificationConfig,
    platform_config::{PlatformConfig, PlatformKind},
    preview_config::PreviewConfig,
    recording_config::RecordingConfig,
    storage_config::StorageConfig,
};

/// The desktop engine writes WAV.
pub(crate) const DEFAULT_EXTENSION: &str = "wav";
pub(crate) const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;
pub(crate) const DEFAULT_PROGRESS_INTERVAL_MS: u64 = 100;
pub(crate) const DEFAULT_FALLBACK_GRACE_MS: u64 = 1000;
pub(crate) const DEFAULT_ANDROID_API_LEVEL: u32 = 33;
pub(crate) const DEFAULT_DESKTOP_NOTIFICATIONS: bool = true;

pub(crate) fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

pub(crate) fn default_tick_interval_ms() -> u64 {
    DEFAULT_TICK_INTERVAL_MS
}

pub(crate) fn default_progress_interval_ms() -> u64 {
    DEFAULT_PROGRESS_INTERVAL_MS
}

pub(crate) fn default_fallback_grace_ms() -> u64 {
    DEFAULT_FALLBACK_GRACE_MS
}

pub(crate) fn default_android_api_level() -> u32 {
    DEFAULT_ANDROID_API_LEVEL
}

pub(crate) fn default_desktop_notifications() -> bool {
    DEFAULT_DESKTOP_NOTIFICATIONS
}
