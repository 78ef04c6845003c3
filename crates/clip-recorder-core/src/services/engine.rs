use crate::{
    error::ServiceResult,
    handle::ListenerGuard,
    session::{InterruptionSink, PlaybackSink},
};

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use async_trait::async_trait;

/// Native audio capture and playback capability.
///
/// One implementation exists per host (the desktop binary ships a cpal
/// backend; mobile hosts wrap their platform recorder). The session only
/// ever talks to this trait, so it runs unchanged against a fake in tests.
///
/// Every call may fail; failures are reported as [`ServiceError`], never as
/// a silent no-op.
///
/// [`ServiceError`]: crate::ServiceError
#[async_trait]
pub trait AudioEngine: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Begin recording into `path`.
    async fn start_recorder(&self, path: &Path) -> ServiceResult<()>;

    /// Pause the active recording, releasing the microphone.
    async fn pause_recorder(&self) -> ServiceResult<()>;

    /// Continue a paused recording into the same file.
    async fn resume_recorder(&self) -> ServiceResult<()>;

    /// Finish the recording and return the path of the written file.
    async fn stop_recorder(&self) -> ServiceResult<PathBuf>;

    /// Play `path` from the beginning.
    async fn start_player(&self, path: &Path) -> ServiceResult<()>;

    /// Pause playback, keeping the position.
    async fn pause_player(&self) -> ServiceResult<()>;

    /// Continue paused playback.
    async fn resume_player(&self) -> ServiceResult<()>;

    /// Stop playback and rewind.
    async fn stop_player(&self) -> ServiceResult<()>;

    /// Report playback position to `sink` every `interval` while playing.
    fn subscribe_progress(&self, interval: Duration, sink: PlaybackSink)
    -> ServiceResult<ListenerGuard>;

    /// Report end of playback to `sink`.
    fn subscribe_completion(&self, sink: PlaybackSink) -> ServiceResult<ListenerGuard>;

    /// Report audio-session interruptions / focus changes to `sink`.
    ///
    /// Returns [`ServiceError::Unsupported`] when the host cannot observe
    /// them; the session then falls back to a backgrounding heuristic.
    ///
    /// [`ServiceError::Unsupported`]: crate::ServiceError::Unsupported
    fn subscribe_interruptions(&self, sink: InterruptionSink) -> ServiceResult<ListenerGuard>;

    /// Length of a finished recording in milliseconds, if the backend can
    /// tell without playing it.
    async fn probe_duration(&self, _path: &Path) -> ServiceResult<Option<u64>> {
        Ok(None)
    }
}

/// Platform-specific interruption signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptionSignal {
    /// iOS-style audio session interruption.
    AudioSession(AudioSessionInterruption),
    /// Android-style audio focus change.
    AudioFocus(AudioFocusChange),
}

/// Phase of an audio session interruption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioSessionInterruption {
    /// Another process took the audio session (call, other recorder).
    Began,
    /// The interruption is over.
    Ended,
}

/// Audio focus change reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFocusChange {
    /// Focus regained.
    Gain,
    /// Focus lost indefinitely.
    Loss,
    /// Focus lost for a short time.
    LossTransient,
    /// Another app plays briefly and asks us to lower volume.
    LossTransientCanDuck,
}

/// What an interruption means for microphone ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MicAvailability {
    /// Another process owns the microphone.
    Lost,
    /// The microphone can be used again.
    Available,
}

impl InterruptionSignal {
    /// Map the platform signal onto microphone ownership. Signals that do
    /// not affect recording map to `None`.
    pub fn availability(&self) -> Option<MicAvailability> {
        match self {
            InterruptionSignal::AudioSession(AudioSessionInterruption::Began) => {
                Some(MicAvailability::Lost)
            }
            InterruptionSignal::AudioSession(AudioSessionInterruption::Ended) => {
                Some(MicAvailability::Available)
            }
            InterruptionSignal::AudioFocus(
                AudioFocusChange::Loss | AudioFocusChange::LossTransient,
            ) => Some(MicAvailability::Lost),
            InterruptionSignal::AudioFocus(AudioFocusChange::Gain) => {
                Some(MicAvailability::Available)
            }
            InterruptionSignal::AudioFocus(AudioFocusChange::LossTransientCanDuck) => None,
        }
    }
}
