use crate::config::default_fallback_grace_ms;

use serde::{Deserialize, Serialize};

/// Microphone conflict detection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictConfig {
    /// How long the app may stay in the background while recording before
    /// the take is stopped as a conflict. Only used when the engine cannot
    /// report interruptions.
    #[serde(default = "default_fallback_grace_ms")]
    pub fallback_grace_ms: u64,
}

impl Default for ConflictConfig {
    fn default() -> Self {
        Self {
            fallback_grace_ms: default_fallback_grace_ms(),
        }
    }
}
