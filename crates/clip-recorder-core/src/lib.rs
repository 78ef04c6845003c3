//! Clip Recorder Core Library
//!
//! Recording session controller: microphone capture with pause/resume,
//! wall-clock elapsed time that survives backgrounding, microphone-conflict
//! handling, preview of the temp recording, and save/discard. Audio, file,
//! permission and notification services are injected as traits.
//!
//! # Example
//!
//! ```no_run
//! use clip_recorder_core::{
//!     CoreResult, HostPlatform, RecordingSession, SessionCommand, SessionConfig, SessionDeps,
//!     SessionEvent, StorageLayout,
//! };
//!
//! async fn record_and_save(deps: SessionDeps) -> CoreResult<()> {
//!     let storage = StorageLayout {
//!         temp_dir: "/tmp".into(),
//!         saved_dir: "recordings".into(),
//!     };
//!     let config = SessionConfig::new(HostPlatform::Desktop, storage);
//!     let (mut session, mut events) = RecordingSession::mount(deps, config);
//!
//!     session.handle_command(SessionCommand::StartRecording).await?;
//!     while let Some(event) = events.recv().await {
//!         let done = event == SessionEvent::Tick && session.elapsed_display() == "0:05";
//!         session.handle_event(event).await?;
//!         if done {
//!             break;
//!         }
//!     }
//!
//!     session.handle_command(SessionCommand::Stop).await?;
//!     session.handle_command(SessionCommand::Save).await?;
//!     session.unmount().await;
//!     Ok(())
//! }
//! ```

mod clock;
mod error;
mod handle;
mod platform;
mod services;
mod session;

pub use {
    clock::{Clock, ManualClock, SystemClock},
    error::{Result as CoreResult, ServiceError, ServiceResult, SessionError},
    handle::ListenerGuard,
    platform::{AccessStatus, HostPlatform, Permission, PermissionGrant, StorageLayout},
    services::{
        AudioEngine, AudioFocusChange, AudioSessionInterruption, FileStore, InterruptionSignal,
        LocalFileStore, MicAvailability, Notice, Notifier, PermissionGate,
    },
    session::{
        AppLifecycle, ConflictDetection, DEFAULT_EXTENSION, DEFAULT_FALLBACK_GRACE,
        DEFAULT_PROGRESS_INTERVAL, DEFAULT_TICK_INTERVAL, EventSender, InterruptionSink,
        PlaybackSink, PlaybackState, PreviewSnapshot, RecordingClock, RecordingSession,
        SessionCommand, SessionConfig, SessionDeps, SessionEvent, SessionEvents, SessionPhase,
        SessionSnapshot, TakeSummary, TempPreview, format_elapsed, format_millis,
    },
};
