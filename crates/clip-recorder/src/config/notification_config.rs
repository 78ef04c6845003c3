use crate::config::default_desktop_notifications;

use serde::{Deserialize, Serialize};

/// User notification settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Show notices as desktop notifications in addition to the log.
    #[serde(default = "default_desktop_notifications")]
    pub desktop: bool,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            desktop: default_desktop_notifications(),
        }
    }
}
