mod engine;
mod file_store;
mod notifier;
mod permission;

pub use {
    engine::{
        AudioEngine, AudioFocusChange, AudioSessionInterruption, InterruptionSignal,
        MicAvailability,
    },
    file_store::{FileStore, LocalFileStore},
    notifier::{Notice, Notifier},
    permission::PermissionGate,
};
