//! Background/foreground reconciliation and microphone-conflict handling.

use crate::{
    CoreResult,
    handle::spawn_delayed,
    services::{InterruptionSignal, MicAvailability, Notice},
    session::{AppLifecycle, ConflictDetection, RecordingSession, SessionEvent, SessionState},
};

use tracing::{debug, info, instrument, warn};

impl RecordingSession {
    /// Track the host app moving between foreground and background.
    ///
    /// Background time only accrues while actively recording; a paused
    /// take is frozen and unaffected.
    #[instrument(skip(self))]
    pub(super) fn on_app_state(&mut self, lifecycle: AppLifecycle) {
        let background = match lifecycle {
            AppLifecycle::Background => true,
            AppLifecycle::Active => false,
            AppLifecycle::Inactive => return,
        };

        let was_background = std::mem::replace(&mut self.in_background, background);
        if was_background == background {
            return;
        }

        if !background {
            self.conflict_grace = None;
        }

        if !matches!(self.state, SessionState::Recording { .. }) {
            return;
        }

        let now = self.deps.clock.now_ms();

        if background {
            self.timing.enter_background(now);
            debug!(session_id = ?self.session_id(), "App backgrounded while recording");
            self.arm_conflict_grace();
        } else {
            if let Some(delta_secs) = self.timing.enter_foreground(now) {
                debug!(
                    session_id = ?self.session_id(),
                    delta_secs,
                    total_background_secs = self.timing.accumulated_background_secs(),
                    "App returned to foreground while recording"
                );
            }
            self.refresh_display();
        }
    }

    /// Start the background grace delay on hosts that infer conflicts from
    /// backgrounding. Replaces any pending delay.
    pub(super) fn arm_conflict_grace(&mut self) {
        if self.conflict_detection == ConflictDetection::BackgroundHeuristic {
            self.conflict_grace = Some(spawn_delayed(
                "conflict-grace",
                self.config.fallback_grace,
                SessionEvent::ConflictGraceElapsed,
                self.events.clone(),
            ));
        }
    }

    /// React to a native interruption or focus change.
    #[instrument(skip(self))]
    pub(super) async fn on_interruption(&mut self, signal: InterruptionSignal) -> CoreResult<()> {
        match signal.availability() {
            Some(MicAvailability::Lost) => {
                if matches!(self.state, SessionState::Recording { .. }) {
                    self.on_microphone_lost().await
                } else {
                    // A paused take already released the microphone.
                    debug!(phase = ?self.phase(), "Microphone conflict ignored: not recording");
                    Ok(())
                }
            }
            Some(MicAvailability::Available) => {
                if self.mic_conflict_active {
                    self.mic_conflict_active = false;
                    info!("Microphone available again");
                    self.notify(Notice::MicrophoneAvailable);
                }
                Ok(())
            }
            None => {
                debug!("Interruption signal does not affect recording");
                Ok(())
            }
        }
    }

    /// The background grace delay ran out. Still backgrounded and still
    /// recording is taken as a conflict.
    #[instrument(skip(self))]
    pub(super) async fn on_conflict_grace_elapsed(&mut self) -> CoreResult<()> {
        self.conflict_grace = None;

        if !self.in_background || !matches!(self.state, SessionState::Recording { .. }) {
            debug!("Conflict check dropped: back in foreground or not recording");
            return Ok(());
        }

        warn!(
            session_id = ?self.session_id(),
            "Still backgrounded while recording, assuming microphone conflict (heuristic)"
        );
        self.on_microphone_lost().await
    }

    async fn on_microphone_lost(&mut self) -> CoreResult<()> {
        warn!(session_id = ?self.session_id(), "Microphone conflict, stopping recording");

        let result = self.finish_take(true).await;

        if self.is_previewable() {
            self.mic_conflict_active = true;
        }
        self.notify(Notice::PartialRecordingPreserved);

        result
    }
}
