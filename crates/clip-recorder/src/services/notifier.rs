use clip_recorder_core::{Notice, Notifier};

use tokio::runtime::Handle;
use tracing::{info, warn};

const APP_NAME: &str = "Clip Recorder";

/// Logs every notice and, when enabled, also shows it as a desktop
/// notification.
#[derive(Debug, Clone)]
pub(crate) struct DesktopNotifier {
    desktop: bool,
}

impl DesktopNotifier {
    pub(crate) fn new(desktop: bool) -> Self {
        Self { desktop }
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&self, notice: &Notice) {
        info!(title = notice.title(), message = %notice.message(), "Notice");

        if !self.desktop {
            return;
        }

        // Showing a notification can block on the session bus.
        let Ok(runtime) = Handle::try_current() else {
            return;
        };

        let title = notice.title().to_string();
        let body = notice.message();
        let _ = runtime.spawn_blocking(move || {
            let shown = notify_rust::Notification::new()
                .appname(APP_NAME)
                .summary(&title)
                .body(&body)
                .show();
            if let Err(e) = shown {
                warn!(title = %title, error = %e, "Desktop notification failed");
            }
        });
    }
}
