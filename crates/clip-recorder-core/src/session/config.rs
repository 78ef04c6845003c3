use crate::platform::{HostPlatform, StorageLayout};

use std::time::Duration;

/// Default container extension for new recordings.
pub const DEFAULT_EXTENSION: &str = "m4a";
/// Display refresh period while recording.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);
/// Preview progress reporting period.
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(100);
/// How long the app must stay backgrounded while recording before the
/// fallback heuristic treats it as a microphone conflict.
pub const DEFAULT_FALLBACK_GRACE: Duration = Duration::from_millis(1000);

/// Static settings for a [`RecordingSession`](crate::RecordingSession).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Host platform policy.
    pub platform: HostPlatform,
    /// Where temp and saved recordings live.
    pub storage: StorageLayout,
    /// File extension for new recordings (without the dot).
    pub extension: String,
    /// Display refresh period while recording.
    pub tick_interval: Duration,
    /// Preview progress reporting period.
    pub progress_interval: Duration,
    /// Grace delay of the backgrounding conflict heuristic.
    pub fallback_grace: Duration,
}

impl SessionConfig {
    /// Configuration with default timings.
    pub fn new(platform: HostPlatform, storage: StorageLayout) -> Self {
        Self {
            platform,
            storage,
            extension: DEFAULT_EXTENSION.to_string(),
            tick_interval: DEFAULT_TICK_INTERVAL,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            fallback_grace: DEFAULT_FALLBACK_GRACE,
        }
    }
}
