mod notifier;
mod permission;

pub(crate) use {notifier::DesktopNotifier, permission::DesktopPermissionGate};
