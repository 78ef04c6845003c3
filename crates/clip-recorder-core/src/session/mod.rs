mod command;
mod config;
mod controller;
mod elapsed;
mod event;
mod lifecycle;
mod preview;
mod snapshot;
mod state;

pub(crate) use state::SessionState;

pub use {
    command::SessionCommand,
    config::{
        DEFAULT_EXTENSION, DEFAULT_FALLBACK_GRACE, DEFAULT_PROGRESS_INTERVAL,
        DEFAULT_TICK_INTERVAL, SessionConfig,
    },
    controller::{ConflictDetection, RecordingSession, SessionDeps},
    elapsed::{RecordingClock, format_elapsed, format_millis},
    event::{
        AppLifecycle, EventSender, InterruptionSink, PlaybackSink, SessionEvent, SessionEvents,
    },
    preview::{PlaybackState, TempPreview},
    snapshot::{PreviewSnapshot, SessionSnapshot},
    state::{SessionPhase, TakeSummary},
};
