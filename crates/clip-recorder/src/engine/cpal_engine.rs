use crate::{
    AppError, AppResult,
    engine::{
        player::{PlaybackCursor, Player},
        recorder::Recorder,
        wav::probe_duration_ms,
    },
};

use clip_recorder_core::{
    AudioEngine, DEFAULT_PROGRESS_INTERVAL, InterruptionSink, ListenerGuard, PlaybackSink,
    ServiceError, ServiceResult,
};

use std::{
    panic::Location,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard, mpsc},
    time::Duration,
};

use async_trait::async_trait;
use error_location::ErrorLocation;
use tokio::{sync::oneshot, task::JoinHandle};
use tracing::{debug, info, instrument, warn};

type Reply<T> = oneshot::Sender<ServiceResult<T>>;

/// Work for the engine thread. Each request carries its own reply channel.
enum Request {
    StartRecorder { path: PathBuf, reply: Reply<()> },
    PauseRecorder { reply: Reply<()> },
    ResumeRecorder { reply: Reply<()> },
    StopRecorder { reply: Reply<PathBuf> },
    StartPlayer { path: PathBuf, reply: Reply<Arc<PlaybackCursor>> },
    PausePlayer { reply: Reply<()> },
    ResumePlayer { reply: Reply<()> },
    StopPlayer { reply: Reply<()> },
    /// Drop the player whose clip ran out, unless a newer one replaced it.
    ReleaseFinished { cursor: Arc<PlaybackCursor> },
}

struct ProgressListener {
    id: u64,
    interval: Duration,
    sink: PlaybackSink,
}

struct CompletionListener {
    id: u64,
    sink: PlaybackSink,
}

/// Currently registered playback listeners. One of each at most; a new
/// subscription replaces the old one.
#[derive(Default)]
struct PlaybackListeners {
    next_id: u64,
    progress: Option<ProgressListener>,
    completion: Option<CompletionListener>,
}

impl PlaybackListeners {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Desktop [`AudioEngine`] on cpal.
///
/// cpal streams are not `Send` on every host, so recorder and player live
/// on one dedicated thread; async callers post a [`Request`] and await the
/// reply. Playback progress is polled from a tokio task that reads the
/// shared cursor.
pub(crate) struct CpalEngine {
    requests: mpsc::Sender<Request>,
    listeners: Arc<Mutex<PlaybackListeners>>,
    monitor: Mutex<Option<JoinHandle<()>>>,
}

impl CpalEngine {
    /// Start the engine thread.
    #[track_caller]
    pub(crate) fn new() -> AppResult<Self> {
        let (requests, requests_rx) = mpsc::channel();

        std::thread::Builder::new()
            .name("audio-engine".to_string())
            .spawn(move || EngineThread::default().run(requests_rx))
            .map_err(|e| AppError::AudioDevice {
                reason: format!("Failed to start audio engine thread: {e}"),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!("Audio engine started");

        Ok(Self {
            requests,
            listeners: Arc::new(Mutex::new(PlaybackListeners::default())),
            monitor: Mutex::new(None),
        })
    }

    async fn call<T>(
        &self,
        operation: &'static str,
        build: impl FnOnce(Reply<T>) -> Request,
    ) -> ServiceResult<T> {
        let (reply, response) = oneshot::channel();

        self.requests
            .send(build(reply))
            .map_err(|_| ServiceError::engine(operation, "Audio engine thread stopped"))?;

        response
            .await
            .map_err(|_| ServiceError::engine(operation, "Audio engine dropped the request"))?
    }

    fn stop_monitor(&self) {
        if let Some(task) = lock(&self.monitor).take() {
            task.abort();
        }
    }
}

impl Drop for CpalEngine {
    fn drop(&mut self) {
        self.stop_monitor();
    }
}

#[async_trait]
impl AudioEngine for CpalEngine {
    fn name(&self) -> &str {
        "cpal"
    }

    async fn start_recorder(&self, path: &Path) -> ServiceResult<()> {
        let path = path.to_path_buf();
        self.call("start_recorder", |reply| Request::StartRecorder { path, reply })
            .await
    }

    async fn pause_recorder(&self) -> ServiceResult<()> {
        self.call("pause_recorder", |reply| Request::PauseRecorder { reply })
            .await
    }

    async fn resume_recorder(&self) -> ServiceResult<()> {
        self.call("resume_recorder", |reply| Request::ResumeRecorder { reply })
            .await
    }

    async fn stop_recorder(&self) -> ServiceResult<PathBuf> {
        self.call("stop_recorder", |reply| Request::StopRecorder { reply })
            .await
    }

    #[instrument(skip(self))]
    async fn start_player(&self, path: &Path) -> ServiceResult<()> {
        let path = path.to_path_buf();
        let cursor = self
            .call("start_player", |reply| Request::StartPlayer { path, reply })
            .await?;

        let task = tokio::spawn(monitor_playback(
            cursor,
            Arc::clone(&self.listeners),
            self.requests.clone(),
        ));
        if let Some(previous) = lock(&self.monitor).replace(task) {
            previous.abort();
        }

        Ok(())
    }

    async fn pause_player(&self) -> ServiceResult<()> {
        self.call("pause_player", |reply| Request::PausePlayer { reply })
            .await
    }

    async fn resume_player(&self) -> ServiceResult<()> {
        self.call("resume_player", |reply| Request::ResumePlayer { reply })
            .await
    }

    async fn stop_player(&self) -> ServiceResult<()> {
        self.stop_monitor();
        self.call("stop_player", |reply| Request::StopPlayer { reply })
            .await
    }

    fn subscribe_progress(
        &self,
        interval: Duration,
        sink: PlaybackSink,
    ) -> ServiceResult<ListenerGuard> {
        let id = {
            let mut listeners = lock(&self.listeners);
            let id = listeners.allocate_id();
            listeners.progress = Some(ProgressListener { id, interval, sink });
            id
        };

        let listeners = Arc::clone(&self.listeners);
        Ok(ListenerGuard::new("playback_progress", move || {
            let mut listeners = lock(&listeners);
            if listeners.progress.as_ref().is_some_and(|l| l.id == id) {
                listeners.progress = None;
            }
        }))
    }

    fn subscribe_completion(&self, sink: PlaybackSink) -> ServiceResult<ListenerGuard> {
        let id = {
            let mut listeners = lock(&self.listeners);
            let id = listeners.allocate_id();
            listeners.completion = Some(CompletionListener { id, sink });
            id
        };

        let listeners = Arc::clone(&self.listeners);
        Ok(ListenerGuard::new("playback_completion", move || {
            let mut listeners = lock(&listeners);
            if listeners.completion.as_ref().is_some_and(|l| l.id == id) {
                listeners.completion = None;
            }
        }))
    }

    #[track_caller]
    fn subscribe_interruptions(&self, _sink: InterruptionSink) -> ServiceResult<ListenerGuard> {
        Err(ServiceError::Unsupported {
            capability: "interruptions",
            location: ErrorLocation::from(Location::caller()),
        })
    }

    async fn probe_duration(&self, path: &Path) -> ServiceResult<Option<u64>> {
        let is_wav = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"));
        if !is_wav {
            return Ok(None);
        }

        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || probe_duration_ms(&path))
            .await
            .map_err(|e| ServiceError::engine("probe_duration", format!("Probe task failed: {e}")))?
            .map(Some)
    }
}

/// Report position to the progress listener until the cursor runs out,
/// then fire the completion listener once and hand the player back to the
/// engine thread for release.
async fn monitor_playback(
    cursor: Arc<PlaybackCursor>,
    listeners: Arc<Mutex<PlaybackListeners>>,
    requests: mpsc::Sender<Request>,
) {
    loop {
        let period = lock(&listeners)
            .progress
            .as_ref()
            .map(|l| l.interval)
            .unwrap_or(DEFAULT_PROGRESS_INTERVAL);
        tokio::time::sleep(period).await;

        let (progress, completion) = {
            let listeners = lock(&listeners);
            (
                listeners.progress.as_ref().map(|l| l.sink.clone()),
                listeners.completion.as_ref().map(|l| l.sink.clone()),
            )
        };

        if !cursor.is_paused() {
            if let Some(sink) = progress {
                sink.progress(cursor.position_ms(), cursor.duration_ms());
            }
        }

        if cursor.is_finished() {
            if let Some(sink) = completion {
                sink.complete();
            }
            debug!(duration_ms = cursor.duration_ms(), "Preview playback finished");
            // A stopped engine thread has nothing left to release.
            let _ = requests.send(Request::ReleaseFinished { cursor });
            break;
        }
    }
}

/// State owned by the engine thread.
#[derive(Default)]
struct EngineThread {
    recorder: Option<Recorder>,
    player: Option<Player>,
}

impl EngineThread {
    fn run(mut self, requests: mpsc::Receiver<Request>) {
        while let Ok(request) = requests.recv() {
            self.handle(request);
        }

        if self.recorder.is_some() {
            warn!("Audio engine shut down with an active recording");
        }
        debug!("Audio engine thread stopped");
    }

    fn handle(&mut self, request: Request) {
        // A dropped reply means the caller gave up; the work is done anyway.
        match request {
            Request::StartRecorder { path, reply } => {
                let _ = reply.send(self.start_recorder(&path));
            }
            Request::PauseRecorder { reply } => {
                let _ = reply.send(self.recorder("pause_recorder").and_then(Recorder::pause));
            }
            Request::ResumeRecorder { reply } => {
                let _ = reply.send(self.recorder("resume_recorder").and_then(Recorder::resume));
            }
            Request::StopRecorder { reply } => {
                let _ = reply.send(self.stop_recorder());
            }
            Request::StartPlayer { path, reply } => {
                let _ = reply.send(self.start_player(&path));
            }
            Request::PausePlayer { reply } => {
                let _ = reply.send(self.player("pause_player").and_then(Player::pause));
            }
            Request::ResumePlayer { reply } => {
                let _ = reply.send(self.player("resume_player").and_then(Player::resume));
            }
            Request::StopPlayer { reply } => {
                if self.player.take().is_some() {
                    debug!("Preview playback stopped");
                }
                let _ = reply.send(Ok(()));
            }
            Request::ReleaseFinished { cursor } => self.release_finished(&cursor),
        }
    }

    fn start_recorder(&mut self, path: &Path) -> ServiceResult<()> {
        if self.recorder.is_some() {
            return Err(ServiceError::engine(
                "start_recorder",
                "A recording is already in progress",
            ));
        }
        self.recorder = Some(Recorder::start(path)?);
        Ok(())
    }

    fn stop_recorder(&mut self) -> ServiceResult<PathBuf> {
        self.recorder
            .take()
            .ok_or_else(|| ServiceError::engine("stop_recorder", "No recording in progress"))?
            .finish()
    }

    fn start_player(&mut self, path: &Path) -> ServiceResult<Arc<PlaybackCursor>> {
        // Only one preview plays at a time.
        self.player = None;
        let player = Player::start(path)?;
        let cursor = player.cursor();
        self.player = Some(player);
        Ok(cursor)
    }

    fn release_finished(&mut self, cursor: &Arc<PlaybackCursor>) {
        let current = self
            .player
            .as_ref()
            .is_some_and(|player| Arc::ptr_eq(&player.cursor(), cursor));
        if current {
            self.player = None;
            debug!("Finished preview player released");
        }
    }

    fn recorder(&self, operation: &'static str) -> ServiceResult<&Recorder> {
        self.recorder
            .as_ref()
            .ok_or_else(|| ServiceError::engine(operation, "No recording in progress"))
    }

    fn player(&self, operation: &'static str) -> ServiceResult<&Player> {
        self.player
            .as_ref()
            .ok_or_else(|| ServiceError::engine(operation, "Nothing is playing"))
    }
}
