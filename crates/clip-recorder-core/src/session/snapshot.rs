use crate::session::{
    ConflictDetection, PlaybackState, RecordingSession, SessionPhase, TakeSummary, format_elapsed,
    format_millis,
};

use std::{fmt, path::PathBuf};

/// Preview player view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewSnapshot {
    /// Playback state.
    pub playback: PlaybackState,
    /// Current position.
    pub position_ms: u64,
    /// Total length, 0 while unknown.
    pub duration_ms: u64,
}

/// Read-only view of a session for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Current state.
    pub phase: SessionPhase,
    /// Elapsed recording time (`m:ss`).
    pub elapsed_display: String,
    /// A conflict stopped the last take and the microphone is still taken.
    pub mic_conflict_active: bool,
    /// Recording awaiting save or discard.
    pub temp_file_path: Option<PathBuf>,
    /// Whether a take is ready for preview.
    pub is_previewable: bool,
    /// Preview player, while previewing.
    pub preview: Option<PreviewSnapshot>,
    /// Summary of the take awaiting save or discard.
    pub take: Option<TakeSummary>,
    /// Whether the display tick timer is running.
    pub timer_active: bool,
    /// How conflicts are detected.
    pub conflict_detection: ConflictDetection,
}

impl SessionSnapshot {
    pub(crate) fn capture(session: &RecordingSession) -> Self {
        Self {
            phase: session.phase(),
            elapsed_display: session.elapsed_display().to_string(),
            mic_conflict_active: session.mic_conflict_active(),
            temp_file_path: session.temp_file_path().map(|p| p.to_path_buf()),
            is_previewable: session.is_previewable(),
            preview: session.preview().map(|p| PreviewSnapshot {
                playback: p.playback(),
                position_ms: p.position_ms(),
                duration_ms: p.duration_ms(),
            }),
            take: session.take(),
            timer_active: session.timer_active(),
            conflict_detection: session.conflict_detection(),
        }
    }
}

impl fmt::Display for SessionSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.phase {
            SessionPhase::Idle => write!(f, "idle {}", self.elapsed_display),
            SessionPhase::Recording => write!(f, "recording {}", self.elapsed_display),
            SessionPhase::Paused => write!(f, "paused {}", self.elapsed_display),
            SessionPhase::Previewing => {
                let heading = if self.mic_conflict_active {
                    "partial recording (microphone conflict)"
                } else {
                    "preview"
                };
                write!(f, "{heading}")?;

                if let Some(take) = &self.take {
                    write!(f, " [{}]", format_elapsed(take.recorded_secs))?;
                }
                if let Some(preview) = &self.preview {
                    write!(
                        f,
                        " {:?} {} / {}",
                        preview.playback,
                        format_millis(preview.position_ms),
                        format_millis(preview.duration_ms)
                    )?;
                }
                if let Some(path) = &self.temp_file_path {
                    write!(f, " {}", path.display())?;
                }
                Ok(())
            }
        }
    }
}
