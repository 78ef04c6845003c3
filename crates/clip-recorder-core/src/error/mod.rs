use std::{panic::Location, path::PathBuf};

use error_location::ErrorLocation;
use thiserror::Error;

/// Failure reported by one of the native services (engine, file store,
/// permission gate).
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Audio engine call failed.
    #[error("Audio engine {operation} failed: {reason} {location}")]
    Engine {
        /// Engine operation that failed (e.g. `start_recorder`).
        operation: &'static str,
        /// Description of the failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// File store call failed.
    #[error("File store {operation} failed for {path:?}: {reason} {location}")]
    FileStore {
        /// File operation that failed (e.g. `copy`).
        operation: &'static str,
        /// Path the operation targeted.
        path: PathBuf,
        /// Description of the failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Permission request could not be completed.
    #[error("Permission request failed: {reason} {location}")]
    Permission {
        /// Description of the failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The service does not provide this capability on this host.
    #[error("Capability not supported: {capability} {location}")]
    Unsupported {
        /// Name of the missing capability.
        capability: &'static str,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

impl ServiceError {
    /// Engine failure at the caller's location.
    #[track_caller]
    pub fn engine(operation: &'static str, reason: impl Into<String>) -> Self {
        ServiceError::Engine {
            operation,
            reason: reason.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// File store failure at the caller's location.
    #[track_caller]
    pub fn file_store(
        operation: &'static str,
        path: impl Into<PathBuf>,
        reason: impl Into<String>,
    ) -> Self {
        ServiceError::FileStore {
            operation,
            path: path.into(),
            reason: reason.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

/// Session-level errors. Every variant is returned only after the user has
/// been notified and the session state has been corrected.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Microphone (or storage) access was not granted.
    #[error("Permission denied (permanent: {permanent}) {location}")]
    PermissionDenied {
        /// True when the platform will not prompt again and the user must
        /// go to system settings.
        permanent: bool,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The recorder could not be started; the session stayed Idle.
    #[error("Recorder failed to start: {source} {location}")]
    EngineStartFailure {
        /// Underlying engine error.
        #[source]
        source: ServiceError,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The recorder did not stop cleanly; the partial file was kept.
    #[error("Recorder failed to stop cleanly: {source} {location}")]
    EngineStopFailure {
        /// Underlying engine error.
        #[source]
        source: ServiceError,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Any other engine call (pause, resume, playback) failed.
    #[error("Audio engine error: {source} {location}")]
    EngineOperation {
        /// Underlying engine error.
        #[source]
        source: ServiceError,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The temp recording vanished before it could be saved.
    #[error("Recording file missing: {path:?} {location}")]
    FileMissing {
        /// Path that was expected to exist.
        path: PathBuf,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Save or discard could not complete its file operations.
    #[error("File operation failed: {source} {location}")]
    FileOperationFailure {
        /// Underlying file store error.
        #[source]
        source: ServiceError,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

/// Result type alias using [`SessionError`].
pub type Result<T> = std::result::Result<T, SessionError>;

/// Result type alias for native service calls.
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
