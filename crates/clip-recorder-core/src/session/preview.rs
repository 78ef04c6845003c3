//! Temp recording preview: a small playback state machine layered on the
//! session's audio engine, alive only while the session is previewing.

use crate::{
    CoreResult,
    error::{ServiceResult, SessionError},
    handle::ListenerGuard,
    services::{AudioEngine, Notice},
    session::{EventSender, PlaybackSink, RecordingSession, SessionState},
};

use std::{panic::Location, path::Path, time::Duration};

use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument, warn};

/// Preview playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// Not playing, position at zero.
    Stopped,
    /// Playing.
    Playing,
    /// Paused, position kept.
    Paused,
}

#[derive(Debug)]
struct PlaybackListeners {
    _progress: ListenerGuard,
    _completion: ListenerGuard,
}

/// Preview player for the not-yet-committed recording.
#[derive(Debug)]
pub struct TempPreview {
    playback: PlaybackState,
    position_ms: u64,
    duration_ms: u64,
    epoch: u64,
    listeners: Option<PlaybackListeners>,
    /// The engine holds a player for this preview, even after playback
    /// ran to the end.
    player_loaded: bool,
}

impl TempPreview {
    pub(crate) fn new(duration_ms: Option<u64>) -> Self {
        Self {
            playback: PlaybackState::Stopped,
            position_ms: 0,
            duration_ms: duration_ms.unwrap_or(0),
            epoch: 0,
            listeners: None,
            player_loaded: false,
        }
    }

    /// Current playback state.
    pub fn playback(&self) -> PlaybackState {
        self.playback
    }

    /// Last reported position.
    pub fn position_ms(&self) -> u64 {
        self.position_ms
    }

    /// Length of the recording, once known.
    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    /// Whether engine listeners are currently registered.
    pub fn is_listening(&self) -> bool {
        self.listeners.is_some()
    }

    async fn play(
        &mut self,
        engine: &dyn AudioEngine,
        path: &Path,
        events: &EventSender,
        epoch: u64,
        interval: Duration,
    ) -> ServiceResult<()> {
        match self.playback {
            PlaybackState::Playing => Ok(()),
            PlaybackState::Paused => {
                engine.resume_player().await?;
                self.playback = PlaybackState::Playing;
                Ok(())
            }
            PlaybackState::Stopped => {
                self.listeners = None;

                // Listeners go in before playback starts so no early
                // progress or a very short file's completion is missed.
                let sink = PlaybackSink::new(events.clone(), epoch);
                let progress = engine.subscribe_progress(interval, sink.clone())?;
                let completion = engine.subscribe_completion(sink)?;

                self.epoch = epoch;
                self.listeners = Some(PlaybackListeners {
                    _progress: progress,
                    _completion: completion,
                });

                if let Err(e) = engine.start_player(path).await {
                    self.listeners = None;
                    return Err(e);
                }

                self.player_loaded = true;
                self.position_ms = 0;
                self.playback = PlaybackState::Playing;
                Ok(())
            }
        }
    }

    async fn pause(&mut self, engine: &dyn AudioEngine) -> ServiceResult<()> {
        if self.playback != PlaybackState::Playing {
            return Ok(());
        }

        engine.pause_player().await?;
        self.playback = PlaybackState::Paused;
        Ok(())
    }

    /// Stop playback and drop every listener. Listener cleanup and the
    /// position reset happen even when the engine call fails.
    pub(crate) async fn stop(&mut self, engine: &dyn AudioEngine) -> ServiceResult<()> {
        let result = if self.playback == PlaybackState::Stopped && !self.player_loaded {
            Ok(())
        } else {
            engine.stop_player().await
        };

        self.player_loaded = false;
        self.listeners = None;
        self.playback = PlaybackState::Stopped;
        self.position_ms = 0;

        result
    }

    fn on_progress(&mut self, epoch: u64, position_ms: u64, duration_ms: u64) -> bool {
        if epoch != self.epoch || self.listeners.is_none() {
            return false;
        }

        self.position_ms = position_ms;
        self.duration_ms = duration_ms;
        true
    }

    fn on_complete(&mut self, epoch: u64) -> bool {
        if epoch != self.epoch || self.listeners.is_none() {
            return false;
        }

        self.listeners = None;
        self.playback = PlaybackState::Stopped;
        self.position_ms = 0;
        true
    }
}

impl RecordingSession {
    /// Play (or resume) the temp recording.
    #[instrument(skip(self))]
    pub async fn play_preview(&mut self) -> CoreResult<()> {
        let SessionState::Previewing {
            temp_path, preview, ..
        } = &mut self.state
        else {
            self.notify(Notice::PreviewUnavailable);
            return Ok(());
        };

        match self.deps.files.exists(temp_path).await {
            Ok(true) => {}
            Ok(false) => {
                warn!(path = ?temp_path, "Temp recording missing, nothing to play");
                self.deps.notifier.notify(&Notice::PreviewUnavailable);
                return Ok(());
            }
            Err(e) => {
                warn!(error = ?e, "Could not check temp recording");
                self.deps.notifier.notify(&Notice::PreviewUnavailable);
                return Ok(());
            }
        }

        if preview.playback() == PlaybackState::Stopped {
            self.playback_epoch += 1;
        }

        let result = preview
            .play(
                self.deps.engine.as_ref(),
                temp_path,
                &self.events,
                self.playback_epoch,
                self.config.progress_interval,
            )
            .await;

        if let Err(source) = result {
            error!(error = ?source, "Preview playback failed");
            self.notify(Notice::PlaybackFailed);
            return Err(SessionError::EngineOperation {
                source,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        info!(epoch = self.playback_epoch, "Preview playing");
        Ok(())
    }

    /// Pause preview playback, keeping the position.
    #[instrument(skip(self))]
    pub async fn pause_preview(&mut self) -> CoreResult<()> {
        let SessionState::Previewing { preview, .. } = &mut self.state else {
            debug!("Preview pause ignored: nothing to preview");
            return Ok(());
        };

        if let Err(source) = preview.pause(self.deps.engine.as_ref()).await {
            error!(error = ?source, "Failed to pause preview");
            self.notify(Notice::PlaybackFailed);
            return Err(SessionError::EngineOperation {
                source,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(())
    }

    /// Stop preview playback, release its listeners and rewind.
    #[instrument(skip(self))]
    pub async fn stop_preview(&mut self) -> CoreResult<()> {
        let SessionState::Previewing { preview, .. } = &mut self.state else {
            debug!("Preview stop ignored: nothing to preview");
            return Ok(());
        };

        if let Err(source) = preview.stop(self.deps.engine.as_ref()).await {
            error!(error = ?source, "Failed to stop preview");
            return Err(SessionError::EngineOperation {
                source,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(())
    }

    pub(super) fn on_playback_progress(&mut self, epoch: u64, position_ms: u64, duration_ms: u64) {
        let applied = match &mut self.state {
            SessionState::Previewing { preview, .. } => {
                preview.on_progress(epoch, position_ms, duration_ms)
            }
            _ => false,
        };

        if !applied {
            debug!(epoch, "Stale playback progress dropped");
        }
    }

    pub(super) fn on_playback_complete(&mut self, epoch: u64) {
        let applied = match &mut self.state {
            SessionState::Previewing { preview, .. } => preview.on_complete(epoch),
            _ => false,
        };

        if applied {
            info!(epoch, "Preview finished");
        } else {
            debug!(epoch, "Stale playback completion dropped");
        }
    }

    /// Stop any preview playback ahead of save, discard or unmount.
    pub(super) async fn release_preview(&mut self) {
        if let SessionState::Previewing { preview, .. } = &mut self.state {
            if let Err(e) = preview.stop(self.deps.engine.as_ref()).await {
                warn!(error = ?e, "Failed to stop preview playback, listeners released anyway");
            }
        }
    }
}
