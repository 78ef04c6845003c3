use crate::config::default_android_api_level;

use clip_recorder_core::HostPlatform;

use serde::{Deserialize, Serialize};

/// Platform policy the session applies.
///
/// Normally `desktop`; `ios` and `android` reproduce the mobile permission
/// and storage rules, e.g. for trying them out against the desktop engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformKind {
    /// Desktop host.
    #[default]
    Desktop,
    /// iOS rules.
    Ios,
    /// Android rules at `android_api_level`.
    Android,
}

/// Host platform settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Which platform policy to apply.
    #[serde(default)]
    pub kind: PlatformKind,

    /// API level used when `kind` is `android`.
    #[serde(default = "default_android_api_level")]
    pub android_api_level: u32,
}

impl PlatformConfig {
    /// Core platform policy for these settings.
    pub fn host_platform(&self) -> HostPlatform {
        match self.kind {
            PlatformKind::Desktop => HostPlatform::Desktop,
            PlatformKind::Ios => HostPlatform::Ios,
            PlatformKind::Android => HostPlatform::Android {
                api_level: self.android_api_level,
            },
        }
    }
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            kind: PlatformKind::default(),
            android_api_level: default_android_api_level(),
        }
    }
}
