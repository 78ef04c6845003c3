use crate::services::InterruptionSignal;

use tokio::sync::mpsc;

/// Sending half of the session event channel.
pub type EventSender = mpsc::UnboundedSender<SessionEvent>;

/// Receiving half of the session event channel, drained by the host's
/// event loop and fed back into [`RecordingSession::handle_event`].
///
/// [`RecordingSession::handle_event`]: crate::RecordingSession::handle_event
pub type SessionEvents = mpsc::UnboundedReceiver<SessionEvent>;

/// Foreground state of the host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppLifecycle {
    /// In the foreground and receiving input.
    Active,
    /// Transitioning (e.g. system dialog on top); treated as foreground.
    Inactive,
    /// Moved to the background; timers may be suspended.
    Background,
}

/// Asynchronous input to the session from timers, the platform and the
/// audio engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// One-second display tick.
    Tick,
    /// The host app changed foreground state.
    AppState(AppLifecycle),
    /// Native audio-session interruption or focus change.
    Interruption(InterruptionSignal),
    /// Preview playback position update.
    PlaybackProgress {
        /// Subscription the update belongs to.
        epoch: u64,
        /// Current position.
        position_ms: u64,
        /// Total length of the file being played.
        duration_ms: u64,
    },
    /// Preview playback reached the end of the file.
    PlaybackComplete {
        /// Subscription the completion belongs to.
        epoch: u64,
    },
    /// Grace delay of the background conflict heuristic ran out.
    ConflictGraceElapsed,
}

/// Handle the engine uses to report preview playback events.
///
/// Each sink is stamped with the playback epoch it was created for; the
/// session drops events from any other epoch.
#[derive(Debug, Clone)]
pub struct PlaybackSink {
    events: EventSender,
    epoch: u64,
}

impl PlaybackSink {
    pub(crate) fn new(events: EventSender, epoch: u64) -> Self {
        Self { events, epoch }
    }

    /// Epoch this sink reports for.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Report playback progress. Returns `false` once the session is gone.
    pub fn progress(&self, position_ms: u64, duration_ms: u64) -> bool {
        self.events
            .send(SessionEvent::PlaybackProgress {
                epoch: self.epoch,
                position_ms,
                duration_ms,
            })
            .is_ok()
    }

    /// Report end of playback. Returns `false` once the session is gone.
    pub fn complete(&self) -> bool {
        self.events
            .send(SessionEvent::PlaybackComplete { epoch: self.epoch })
            .is_ok()
    }
}

/// Handle the engine uses to report microphone interruptions.
#[derive(Debug, Clone)]
pub struct InterruptionSink {
    events: EventSender,
}

impl InterruptionSink {
    pub(crate) fn new(events: EventSender) -> Self {
        Self { events }
    }

    /// Report a platform interruption signal. Returns `false` once the
    /// session is gone.
    pub fn signal(&self, signal: InterruptionSignal) -> bool {
        self.events.send(SessionEvent::Interruption(signal)).is_ok()
    }
}
