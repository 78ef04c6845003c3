use std::{fmt, path::PathBuf};

/// User-facing notifications raised by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Microphone access was refused; asking again is possible.
    PermissionDenied,
    /// Access was refused for good; the user has to enable it in settings.
    PermissionsRequired,
    /// The recorder could not start.
    RecorderStartFailed,
    /// The recorder did not stop cleanly; whatever was captured was kept.
    RecorderStopFailed,
    /// Pause or resume of the recorder failed.
    RecorderControlFailed,
    /// Recording was cut short by a microphone conflict; the partial take
    /// is ready for preview.
    PartialRecordingPreserved,
    /// The microphone is free again after a conflict.
    MicrophoneAvailable,
    /// Save or discard was requested with no recording to act on.
    NoRecording,
    /// The temp recording vanished before it could be saved.
    RecordingFileMissing,
    /// The recording was committed to `path`.
    Saved {
        /// Final location of the recording.
        path: PathBuf,
    },
    /// Committing the recording failed.
    SaveFailed,
    /// The recording was discarded.
    Discarded,
    /// There is no playable temp file for the preview.
    PreviewUnavailable,
    /// Preview playback failed.
    PlaybackFailed,
}

impl Notice {
    /// Short heading.
    pub fn title(&self) -> &'static str {
        match self {
            Notice::PermissionDenied => "Permission Denied",
            Notice::PermissionsRequired => "Permissions Required",
            Notice::RecorderStartFailed
            | Notice::RecorderStopFailed
            | Notice::RecorderControlFailed => "Recording Error",
            Notice::PartialRecordingPreserved => "Recording Stopped",
            Notice::MicrophoneAvailable => "Microphone Available",
            Notice::NoRecording => "No Recording",
            Notice::RecordingFileMissing => "File Not Found",
            Notice::Saved { .. } => "Audio Saved",
            Notice::SaveFailed => "Save Error",
            Notice::Discarded => "Audio Discarded",
            Notice::PreviewUnavailable => "No Audio",
            Notice::PlaybackFailed => "Playback Error",
        }
    }

    /// Body text.
    pub fn message(&self) -> String {
        match self {
            Notice::PermissionDenied => "Microphone permission is required to record audio.".into(),
            Notice::PermissionsRequired => {
                "Microphone access is blocked. Use the `settings` command to open system settings and enable microphone and media access.".into()
            }
            Notice::RecorderStartFailed => "Could not start the microphone recording.".into(),
            Notice::RecorderStopFailed => {
                "The recording did not stop cleanly. Whatever was captured has been kept.".into()
            }
            Notice::RecorderControlFailed => "Could not pause or resume the recording.".into(),
            Notice::PartialRecordingPreserved => "Another app or a call took the microphone. \
                 Your partial recording was kept and is ready to play."
                .into(),
            Notice::MicrophoneAvailable => {
                "The microphone is free again. You can start a new recording.".into()
            }
            Notice::NoRecording => "There is no recording to act on.".into(),
            Notice::RecordingFileMissing => "The temporary recording could not be found.".into(),
            Notice::Saved { path } => format!("Audio saved to: {}", path.display()),
            Notice::SaveFailed => "Failed to save the recording.".into(),
            Notice::Discarded => "The recording has been discarded.".into(),
            Notice::PreviewUnavailable => "There is no recording to play yet.".into(),
            Notice::PlaybackFailed => "Could not play the recording.".into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title(), self.message())
    }
}

/// Presents [`Notice`]s to the user.
pub trait Notifier: Send + Sync {
    /// Show `notice`. Must not block the event loop.
    fn notify(&self, notice: &Notice);
}
