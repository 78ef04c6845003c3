use std::fmt;

use tracing::debug;

/// RAII guard for an engine event subscription.
///
/// The engine hands one back for every listener it registers. Dropping the
/// guard removes the listener, so a subscription can never outlive the
/// session (or the preview) that owns it.
pub struct ListenerGuard {
    label: &'static str,
    release: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl ListenerGuard {
    /// Wrap `release`, which unregisters the listener when called.
    pub fn new(label: &'static str, release: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            label,
            release: Some(Box::new(release)),
        }
    }

    /// Guard for a subscription that needs no explicit removal.
    pub fn noop(label: &'static str) -> Self {
        Self {
            label,
            release: None,
        }
    }

    /// What this guard is subscribed to.
    pub fn label(&self) -> &'static str {
        self.label
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
            debug!(listener = self.label, "Listener removed");
        }
    }
}

impl fmt::Debug for ListenerGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerGuard")
            .field("label", &self.label)
            .field("armed", &self.release.is_some())
            .finish()
    }
}
