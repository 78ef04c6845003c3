//! Host platform policy: which permissions a recording needs, how their
//! individual results combine, and where recordings live on disk.

use std::path::{Path, PathBuf};

/// Android API level from which media access replaced external storage
/// access.
const ANDROID_MEDIA_PERMISSIONS_API: u32 = 33;

/// Platform the session is hosted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostPlatform {
    /// iOS: app-private documents directory, single microphone permission.
    Ios,
    /// Android: public downloads directory, API-level dependent permissions.
    Android {
        /// `Build.VERSION.SDK_INT` of the device.
        api_level: u32,
    },
    /// Desktop host: app data directory, microphone only.
    Desktop,
}

/// A single runtime permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    /// Record audio from the microphone.
    Microphone,
    /// Write shared external storage (Android 12 and below).
    WriteExternalStorage,
    /// Read shared external storage (Android 12 and below).
    ReadExternalStorage,
    /// Read audio media (Android 13 and above).
    ReadMediaAudio,
}

/// Result of asking for one permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionGrant {
    /// Granted.
    Granted,
    /// Denied, the platform may prompt again.
    Denied,
    /// Denied and the platform will not prompt again.
    Blocked,
}

/// Combined answer to "may this session record?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessStatus {
    /// Every required permission was granted.
    Granted,
    /// Refused, can be asked again.
    Denied,
    /// Refused for good; the user has to enable it in system settings.
    DeniedPermanently,
}

/// Directories recordings are written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLayout {
    /// Where in-progress and not-yet-committed recordings live.
    pub temp_dir: PathBuf,
    /// Where saved recordings are committed.
    pub saved_dir: PathBuf,
}

impl HostPlatform {
    /// Permissions that must all be granted before recording.
    pub fn required_permissions(&self) -> Vec<Permission> {
        match self {
            HostPlatform::Ios | HostPlatform::Desktop => vec![Permission::Microphone],
            HostPlatform::Android { api_level } if *api_level < ANDROID_MEDIA_PERMISSIONS_API => {
                vec![
                    Permission::Microphone,
                    Permission::WriteExternalStorage,
                    Permission::ReadExternalStorage,
                ]
            }
            HostPlatform::Android { .. } => {
                vec![Permission::Microphone, Permission::ReadMediaAudio]
            }
        }
    }

    /// Combine per-permission results for the permissions this platform
    /// requires. A required permission missing from `grants` counts as
    /// denied.
    pub fn resolve_access(&self, grants: &[(Permission, PermissionGrant)]) -> AccessStatus {
        let required = self.required_permissions();
        let grant_for = |permission: Permission| {
            grants
                .iter()
                .find(|(p, _)| *p == permission)
                .map(|(_, g)| *g)
                .unwrap_or(PermissionGrant::Denied)
        };

        let results: Vec<PermissionGrant> = required.into_iter().map(grant_for).collect();

        if results.iter().all(|g| *g == PermissionGrant::Granted) {
            return AccessStatus::Granted;
        }

        match self {
            // iOS never re-prompts once the user has answered.
            HostPlatform::Ios => AccessStatus::DeniedPermanently,
            _ if results.contains(&PermissionGrant::Blocked) => AccessStatus::DeniedPermanently,
            _ => AccessStatus::Denied,
        }
    }

    /// Whether the saved-recordings directory may be missing and has to be
    /// created before the first save.
    pub fn creates_saved_dir(&self) -> bool {
        !matches!(self, HostPlatform::Ios)
    }

    /// Path for a new in-progress recording.
    pub fn temp_recording_path(&self, layout: &StorageLayout, now_ms: u64, extension: &str) -> PathBuf {
        recording_path(&layout.temp_dir, "temp_audio", now_ms, extension)
    }

    /// Path a recording is committed to on save.
    pub fn saved_recording_path(&self, layout: &StorageLayout, now_ms: u64, extension: &str) -> PathBuf {
        recording_path(&layout.saved_dir, "audio", now_ms, extension)
    }
}

fn recording_path(dir: &Path, prefix: &str, now_ms: u64, extension: &str) -> PathBuf {
    dir.join(format!("{prefix}_{now_ms}.{extension}"))
}
