use crate::session::TempPreview;

use std::path::PathBuf;

use uuid::Uuid;

/// Which state of the recording state machine holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Nothing recorded.
    Idle,
    /// Microphone capture is running.
    Recording,
    /// Capture paused; the microphone is released.
    Paused,
    /// Capture stopped; a temp recording awaits preview, save or discard.
    Previewing,
}

/// How the finished take looked when recording stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TakeSummary {
    /// Elapsed recording time at stop, in seconds.
    pub recorded_secs: u64,
    /// Seconds spent backgrounded while actively recording.
    pub background_secs: u64,
    /// True when a microphone conflict ended the take.
    pub interrupted: bool,
}

/// Session state, with each variant carrying exactly the data valid in it.
#[derive(Debug)]
pub(crate) enum SessionState {
    Idle,
    Recording {
        session_id: Uuid,
        target: PathBuf,
    },
    Paused {
        session_id: Uuid,
        target: PathBuf,
        paused_secs: u64,
    },
    Previewing {
        session_id: Uuid,
        temp_path: PathBuf,
        take: TakeSummary,
        preview: TempPreview,
    },
}

impl SessionState {
    pub(crate) fn phase(&self) -> SessionPhase {
        match self {
            SessionState::Idle => SessionPhase::Idle,
            SessionState::Recording { .. } => SessionPhase::Recording,
            SessionState::Paused { .. } => SessionPhase::Paused,
            SessionState::Previewing { .. } => SessionPhase::Previewing,
        }
    }

    pub(crate) fn session_id(&self) -> Option<Uuid> {
        match self {
            SessionState::Idle => None,
            SessionState::Recording { session_id, .. }
            | SessionState::Paused { session_id, .. }
            | SessionState::Previewing { session_id, .. } => Some(*session_id),
        }
    }
}
