use crate::config::{default_extension, default_tick_interval_ms};

use serde::{Deserialize, Serialize};

/// Recorder settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingConfig {
    /// File extension for new recordings, without the dot.
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Elapsed display refresh period.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            extension: default_extension(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}
