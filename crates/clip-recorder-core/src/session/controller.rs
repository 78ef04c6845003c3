//! Recording session state machine.
//!
//! One session lives per screen. It is driven from a single event loop:
//! user intents arrive through [`RecordingSession::handle_command`], timer,
//! platform and engine events through [`RecordingSession::handle_event`].
//! Every transition checks its source state first, so an intent that is no
//! longer valid (double pause, resume while recording, stop while idle) is
//! dropped instead of queued.

use crate::{
    CoreResult,
    clock::Clock,
    error::{ServiceError, SessionError},
    handle::{ListenerGuard, TaskHandle, spawn_ticker},
    platform::AccessStatus,
    services::{AudioEngine, FileStore, Notice, Notifier, PermissionGate},
    session::{
        EventSender, InterruptionSink, RecordingClock, SessionCommand, SessionConfig,
        SessionEvent, SessionEvents, SessionPhase, SessionSnapshot, SessionState, TakeSummary,
        TempPreview, format_elapsed,
    },
};

use std::{panic::Location, path::Path, sync::Arc};

use error_location::ErrorLocation;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// External services a session is built on.
#[derive(Clone)]
pub struct SessionDeps {
    /// Native capture/playback.
    pub engine: Arc<dyn AudioEngine>,
    /// Local file operations.
    pub files: Arc<dyn FileStore>,
    /// Permission prompt.
    pub permissions: Arc<dyn PermissionGate>,
    /// User notifications.
    pub notifier: Arc<dyn Notifier>,
    /// Wall clock.
    pub clock: Arc<dyn Clock>,
}

/// How microphone conflicts are detected on this host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictDetection {
    /// The engine reports interruptions / focus changes.
    Native,
    /// Backgrounding while recording for longer than the grace delay is
    /// treated as a conflict. A heuristic: an unrelated trip to the
    /// background also trips it.
    BackgroundHeuristic,
}

/// The recording session controller.
pub struct RecordingSession {
    pub(super) deps: SessionDeps,
    pub(super) config: SessionConfig,
    pub(super) events: EventSender,
    pub(super) state: SessionState,
    pub(super) timing: RecordingClock,
    pub(super) elapsed_display: String,
    pub(super) mic_conflict_active: bool,
    pub(super) conflict_detection: ConflictDetection,
    pub(super) in_background: bool,
    pub(super) ticker: Option<TaskHandle>,
    pub(super) conflict_grace: Option<TaskHandle>,
    pub(super) interruption_listener: Option<ListenerGuard>,
    pub(super) playback_epoch: u64,
}

impl RecordingSession {
    /// Create an Idle session and subscribe to microphone interruptions.
    ///
    /// Returns the session together with the receiving end of its event
    /// channel; the host's event loop must feed every received event back
    /// into [`handle_event`](Self::handle_event).
    #[instrument(skip_all, fields(engine = deps.engine.name()))]
    pub fn mount(deps: SessionDeps, config: SessionConfig) -> (Self, SessionEvents) {
        let (events, events_rx) = mpsc::unbounded_channel();

        let interruptions = deps
            .engine
            .subscribe_interruptions(InterruptionSink::new(events.clone()));

        let (interruption_listener, conflict_detection) = match interruptions {
            Ok(guard) => (Some(guard), ConflictDetection::Native),
            Err(ServiceError::Unsupported { .. }) => {
                info!("Engine has no interruption events, using background heuristic");
                (None, ConflictDetection::BackgroundHeuristic)
            }
            Err(e) => {
                warn!(error = ?e, "Interruption listener unavailable, using background heuristic");
                (None, ConflictDetection::BackgroundHeuristic)
            }
        };

        info!(
            platform = ?config.platform,
            detection = ?conflict_detection,
            "Recording session mounted"
        );

        let session = Self {
            deps,
            config,
            events,
            state: SessionState::Idle,
            timing: RecordingClock::default(),
            elapsed_display: format_elapsed(0),
            mic_conflict_active: false,
            conflict_detection,
            in_background: false,
            ticker: None,
            conflict_grace: None,
            interruption_listener,
            playback_epoch: 0,
        };

        (session, events_rx)
    }

    /// Dispatch a user intent.
    pub async fn handle_command(&mut self, command: SessionCommand) -> CoreResult<()> {
        match command {
            SessionCommand::StartRecording => self.start_recording().await,
            SessionCommand::Pause => self.pause().await,
            SessionCommand::Resume => self.resume().await,
            SessionCommand::Stop => self.stop().await,
            SessionCommand::Save => self.save().await,
            SessionCommand::Discard => self.discard().await,
            SessionCommand::PlayPreview => self.play_preview().await,
            SessionCommand::PausePreview => self.pause_preview().await,
            SessionCommand::StopPreview => self.stop_preview().await,
            SessionCommand::OpenPermissionSettings => self.open_permission_settings().await,
        }
    }

    /// Dispatch a timer, platform or engine event.
    pub async fn handle_event(&mut self, event: SessionEvent) -> CoreResult<()> {
        match event {
            SessionEvent::Tick => {
                self.on_tick();
                Ok(())
            }
            SessionEvent::AppState(lifecycle) => {
                self.on_app_state(lifecycle);
                Ok(())
            }
            SessionEvent::Interruption(signal) => self.on_interruption(signal).await,
            SessionEvent::PlaybackProgress {
                epoch,
                position_ms,
                duration_ms,
            } => {
                self.on_playback_progress(epoch, position_ms, duration_ms);
                Ok(())
            }
            SessionEvent::PlaybackComplete { epoch } => {
                self.on_playback_complete(epoch);
                Ok(())
            }
            SessionEvent::ConflictGraceElapsed => self.on_conflict_grace_elapsed().await,
        }
    }

    /// Ask for microphone access and, when granted, start recording into a
    /// fresh temp file.
    #[instrument(skip(self))]
    pub async fn start_recording(&mut self) -> CoreResult<()> {
        if !matches!(self.state, SessionState::Idle) {
            debug!(phase = ?self.phase(), "Start ignored: session not idle");
            return Ok(());
        }

        match self.request_microphone_access().await {
            AccessStatus::Granted => {}
            AccessStatus::Denied => {
                self.notify(Notice::PermissionDenied);
                return Err(SessionError::PermissionDenied {
                    permanent: false,
                    location: ErrorLocation::from(Location::caller()),
                });
            }
            AccessStatus::DeniedPermanently => {
                self.notify(Notice::PermissionsRequired);
                return Err(SessionError::PermissionDenied {
                    permanent: true,
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        }

        let now = self.deps.clock.now_ms();
        let target =
            self.config
                .platform
                .temp_recording_path(&self.config.storage, now, &self.config.extension);

        if let Err(source) = self.deps.engine.start_recorder(&target).await {
            error!(error = ?source, path = ?target, "Failed to start recorder");
            self.notify(Notice::RecorderStartFailed);
            return Err(SessionError::EngineStartFailure {
                source,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let session_id = Uuid::new_v4();

        self.timing.start(now);
        if self.in_background {
            self.timing.enter_background(now);
        }
        self.elapsed_display = format_elapsed(0);
        self.mic_conflict_active = false;
        self.state = SessionState::Recording {
            session_id,
            target: target.clone(),
        };
        self.start_ticker();
        if self.in_background {
            self.arm_conflict_grace();
        }

        info!(session_id = %session_id, path = ?target, "Recording started");

        Ok(())
    }

    /// Pause an active recording. No-op unless recording.
    #[instrument(skip(self))]
    pub async fn pause(&mut self) -> CoreResult<()> {
        let SessionState::Recording { session_id, target } = &self.state else {
            debug!(phase = ?self.phase(), "Pause ignored: not recording");
            return Ok(());
        };
        let (session_id, target) = (*session_id, target.clone());

        if let Err(source) = self.deps.engine.pause_recorder().await {
            error!(session_id = %session_id, error = ?source, "Failed to pause recorder");
            self.notify(Notice::RecorderControlFailed);
            return Err(SessionError::EngineOperation {
                source,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        self.ticker = None;
        self.conflict_grace = None;

        let paused_secs = self.timing.pause(self.deps.clock.now_ms());
        self.elapsed_display = format_elapsed(paused_secs);
        self.state = SessionState::Paused {
            session_id,
            target,
            paused_secs,
        };

        info!(session_id = %session_id, paused_secs, "Recording paused");

        Ok(())
    }

    /// Continue a paused recording from the paused elapsed value. No-op
    /// unless paused.
    #[instrument(skip(self))]
    pub async fn resume(&mut self) -> CoreResult<()> {
        let SessionState::Paused {
            session_id,
            target,
            paused_secs,
        } = &self.state
        else {
            debug!(phase = ?self.phase(), "Resume ignored: not paused");
            return Ok(());
        };
        let (session_id, target, paused_secs) = (*session_id, target.clone(), *paused_secs);

        if let Err(source) = self.deps.engine.resume_recorder().await {
            error!(session_id = %session_id, error = ?source, "Failed to resume recorder");
            self.notify(Notice::RecorderControlFailed);
            return Err(SessionError::EngineOperation {
                source,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let now = self.deps.clock.now_ms();
        self.timing.resume(now, paused_secs);
        if self.in_background {
            self.timing.enter_background(now);
        }
        self.elapsed_display = format_elapsed(paused_secs);
        self.state = SessionState::Recording { session_id, target };
        self.start_ticker();
        if self.in_background {
            self.arm_conflict_grace();
        }

        info!(session_id = %session_id, paused_secs, "Recording resumed");

        Ok(())
    }

    /// Stop recording and move the take into preview. No-op unless
    /// recording or paused.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> CoreResult<()> {
        self.finish_take(false).await
    }

    /// Commit the previewed recording to its permanent location.
    #[instrument(skip(self))]
    pub async fn save(&mut self) -> CoreResult<()> {
        let SessionState::Previewing {
            session_id,
            temp_path,
            ..
        } = &self.state
        else {
            self.notify(Notice::NoRecording);
            return Ok(());
        };
        let (session_id, temp_path) = (*session_id, temp_path.clone());

        self.release_preview().await;

        match self.deps.files.exists(&temp_path).await {
            Ok(true) => {}
            Ok(false) => {
                warn!(session_id = %session_id, path = ?temp_path, "Temp recording vanished before save");
                self.reset_to_idle();
                self.notify(Notice::RecordingFileMissing);
                return Err(SessionError::FileMissing {
                    path: temp_path,
                    location: ErrorLocation::from(Location::caller()),
                });
            }
            Err(source) => {
                error!(session_id = %session_id, error = ?source, "Could not check temp recording");
                self.notify(Notice::SaveFailed);
                return Err(SessionError::FileOperationFailure {
                    source,
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        }

        let extension = temp_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or(self.config.extension.as_str())
            .to_string();
        let saved_path = self.config.platform.saved_recording_path(
            &self.config.storage,
            self.deps.clock.now_ms(),
            &extension,
        );

        if let Err(source) = self.commit(&temp_path, &saved_path).await {
            error!(session_id = %session_id, error = ?source, "Failed to save recording");
            self.notify(Notice::SaveFailed);
            return Err(SessionError::FileOperationFailure {
                source,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if let Err(e) = self.deps.files.delete(&temp_path).await {
            warn!(session_id = %session_id, error = ?e, path = ?temp_path, "Saved, but temp recording was not removed");
        }

        self.reset_to_idle();
        info!(session_id = %session_id, path = ?saved_path, "Recording saved");
        self.notify(Notice::Saved { path: saved_path });

        Ok(())
    }

    /// Throw the previewed recording away. The session always ends up Idle,
    /// even when the file could not be deleted.
    #[instrument(skip(self))]
    pub async fn discard(&mut self) -> CoreResult<()> {
        let SessionState::Previewing {
            session_id,
            temp_path,
            ..
        } = &self.state
        else {
            self.notify(Notice::NoRecording);
            return Ok(());
        };
        let (session_id, temp_path) = (*session_id, temp_path.clone());

        self.release_preview().await;

        let removed = match self.deps.files.exists(&temp_path).await {
            Ok(true) => self.deps.files.delete(&temp_path).await,
            Ok(false) => {
                debug!(path = ?temp_path, "Temp recording already gone");
                Ok(())
            }
            Err(e) => Err(e),
        };

        self.reset_to_idle();
        self.notify(Notice::Discarded);

        match removed {
            Ok(()) => {
                info!(session_id = %session_id, "Recording discarded");
                Ok(())
            }
            Err(source) => {
                warn!(session_id = %session_id, error = ?source, "Recording discarded, but temp file could not be deleted");
                Err(SessionError::FileOperationFailure {
                    source,
                    location: ErrorLocation::from(Location::caller()),
                })
            }
        }
    }

    /// Send the user to the system settings page after a permanent denial.
    #[instrument(skip(self))]
    pub async fn open_permission_settings(&mut self) -> CoreResult<()> {
        if let Err(e) = self.deps.permissions.open_settings().await {
            warn!(error = ?e, "Could not open system settings");
        }
        Ok(())
    }

    /// Tear the session down: stop any capture or playback, release every
    /// listener and timer, and return to Idle.
    #[instrument(skip(self))]
    pub async fn unmount(&mut self) {
        self.ticker = None;
        self.conflict_grace = None;

        match &self.state {
            SessionState::Recording { target, .. } | SessionState::Paused { target, .. } => {
                let target = target.clone();
                match self.deps.engine.stop_recorder().await {
                    Ok(path) => warn!(path = ?path, "Unmounted mid-recording, take left on disk"),
                    Err(e) => warn!(error = ?e, path = ?target, "Recorder did not stop on unmount"),
                }
            }
            SessionState::Previewing { temp_path, .. } => {
                warn!(path = ?temp_path, "Unmounted with an unsaved recording");
                self.release_preview().await;
            }
            SessionState::Idle => {}
        }

        self.interruption_listener = None;
        self.reset_to_idle();

        info!("Recording session unmounted");
    }

    /// Current state.
    pub fn phase(&self) -> SessionPhase {
        self.state.phase()
    }

    /// Elapsed time as shown to the user (`m:ss`).
    pub fn elapsed_display(&self) -> &str {
        &self.elapsed_display
    }

    /// True after a microphone conflict stopped recording, until the
    /// microphone is reported available again.
    pub fn mic_conflict_active(&self) -> bool {
        self.mic_conflict_active
    }

    /// Path of the recording awaiting save or discard.
    pub fn temp_file_path(&self) -> Option<&Path> {
        match &self.state {
            SessionState::Previewing { temp_path, .. } => Some(temp_path),
            _ => None,
        }
    }

    /// Whether a stopped take is ready for preview.
    pub fn is_previewable(&self) -> bool {
        matches!(self.state, SessionState::Previewing { .. })
    }

    /// Preview player, while previewing.
    pub fn preview(&self) -> Option<&TempPreview> {
        match &self.state {
            SessionState::Previewing { preview, .. } => Some(preview),
            _ => None,
        }
    }

    /// Summary of the take awaiting save or discard.
    pub fn take(&self) -> Option<TakeSummary> {
        match &self.state {
            SessionState::Previewing { take, .. } => Some(*take),
            _ => None,
        }
    }

    /// Elapsed-time counters of the current take.
    pub fn recording_clock(&self) -> &RecordingClock {
        &self.timing
    }

    /// Whether the display tick timer is running.
    pub fn timer_active(&self) -> bool {
        self.ticker.is_some()
    }

    /// Whether the background conflict check is pending.
    pub fn conflict_check_pending(&self) -> bool {
        self.conflict_grace.is_some()
    }

    /// How conflicts are detected on this host.
    pub fn conflict_detection(&self) -> ConflictDetection {
        self.conflict_detection
    }

    /// Whether the engine interruption listener is registered.
    pub fn listening_for_interruptions(&self) -> bool {
        self.interruption_listener.is_some()
    }

    /// Read-only view for the presentation layer.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::capture(self)
    }

    pub(super) fn session_id(&self) -> Option<Uuid> {
        self.state.session_id()
    }

    /// Stop capture and move to preview, keeping whatever file the engine
    /// produced. `interrupted` marks a take cut short by a conflict.
    pub(super) async fn finish_take(&mut self, interrupted: bool) -> CoreResult<()> {
        let (session_id, target, paused_secs) = match &self.state {
            SessionState::Recording { session_id, target } => (*session_id, target.clone(), None),
            SessionState::Paused {
                session_id,
                target,
                paused_secs,
            } => (*session_id, target.clone(), Some(*paused_secs)),
            _ => {
                debug!(phase = ?self.phase(), "Stop ignored: not recording");
                return Ok(());
            }
        };

        self.ticker = None;
        self.conflict_grace = None;

        let now = self.deps.clock.now_ms();
        self.timing.enter_foreground(now);
        let take = TakeSummary {
            recorded_secs: paused_secs.unwrap_or_else(|| self.timing.elapsed_secs(now)),
            background_secs: self.timing.accumulated_background_secs(),
            interrupted,
        };
        self.timing.reset();
        self.elapsed_display = format_elapsed(0);
        self.mic_conflict_active = false;

        let (temp_path, stop_error) = match self.deps.engine.stop_recorder().await {
            Ok(path) if path.as_os_str().is_empty() => (target, None),
            Ok(path) => (path, None),
            Err(e) => {
                // Keep the partial take: the file the recorder was writing
                // is the best reference available.
                error!(session_id = %session_id, error = ?e, path = ?target, "Recorder did not stop cleanly");
                self.notify(Notice::RecorderStopFailed);
                (target, Some(e))
            }
        };

        let duration_ms = match self.deps.engine.probe_duration(&temp_path).await {
            Ok(duration) => duration,
            Err(e) => {
                debug!(error = ?e, "Duration probe failed");
                None
            }
        };

        info!(
            session_id = %session_id,
            path = ?temp_path,
            recorded_secs = take.recorded_secs,
            background_secs = take.background_secs,
            interrupted,
            "Recording stopped"
        );

        self.state = SessionState::Previewing {
            session_id,
            temp_path,
            take,
            preview: TempPreview::new(duration_ms),
        };

        match stop_error {
            Some(source) => Err(SessionError::EngineStopFailure {
                source,
                location: ErrorLocation::from(Location::caller()),
            }),
            None => Ok(()),
        }
    }

    pub(super) fn refresh_display(&mut self) {
        if matches!(self.state, SessionState::Recording { .. }) {
            let secs = self.timing.elapsed_secs(self.deps.clock.now_ms());
            self.elapsed_display = format_elapsed(secs);
        }
    }

    pub(super) fn notify(&self, notice: Notice) {
        info!(notice = ?notice, "Notifying user");
        self.deps.notifier.notify(&notice);
    }

    fn on_tick(&mut self) {
        if matches!(self.state, SessionState::Recording { .. }) {
            self.refresh_display();
        } else {
            debug!("Stale tick dropped");
        }
    }

    fn start_ticker(&mut self) {
        // Old handle goes first: never two tickers at once.
        self.ticker = None;
        self.ticker = Some(spawn_ticker(self.config.tick_interval, self.events.clone()));
    }

    fn reset_to_idle(&mut self) {
        self.ticker = None;
        self.conflict_grace = None;
        self.state = SessionState::Idle;
        self.timing.reset();
        self.elapsed_display = format_elapsed(0);
        self.mic_conflict_active = false;
    }

    async fn request_microphone_access(&self) -> AccessStatus {
        let platform = self.config.platform;
        let required = platform.required_permissions();

        match self.deps.permissions.request(&required).await {
            Ok(grants) => {
                let status = platform.resolve_access(&grants);
                debug!(?grants, ?status, "Permission request answered");
                status
            }
            Err(e) => {
                error!(error = ?e, "Permission request failed");
                AccessStatus::Denied
            }
        }
    }

    async fn commit(&self, temp_path: &Path, saved_path: &Path) -> Result<(), ServiceError> {
        if self.config.platform.creates_saved_dir() {
            let dir = &self.config.storage.saved_dir;
            if !self.deps.files.exists(dir).await? {
                self.deps.files.mkdir(dir).await?;
                debug!(dir = ?dir, "Created saved recordings directory");
            }
        }

        self.deps.files.copy(temp_path, saved_path).await
    }
}
