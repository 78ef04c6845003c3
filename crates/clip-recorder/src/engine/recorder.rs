use crate::engine::wav::{downmix, spawn_writer};

use clip_recorder_core::{ServiceError, ServiceResult};

use std::{
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread::JoinHandle,
};

use cpal::{
    Stream,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use tracing::{debug, error, info, instrument, warn};

/// Microphone capture into a WAV file.
///
/// The input callback downmixes each buffer to mono and hands it to the
/// writer thread; nothing is held in memory beyond the channel backlog.
/// Lives on the engine thread because `Stream` is not `Send` on every host.
pub(crate) struct Recorder {
    stream: Option<Stream>,
    path: PathBuf,
    /// Callback drops samples while set (paused, or shutting down).
    muted: Arc<AtomicBool>,
    writer: Option<JoinHandle<ServiceResult<u64>>>,
    sample_rate: u32,
}

impl Recorder {
    /// Open the default input device and start writing to `path`.
    #[instrument]
    pub(crate) fn start(path: &Path) -> ServiceResult<Self> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .ok_or_else(|| ServiceError::engine("start_recorder", "No microphone found"))?;

        let supported = device.default_input_config().map_err(|e| {
            ServiceError::engine("start_recorder", format!("Failed to get config: {e}"))
        })?;
        let sample_rate = supported.sample_rate();
        let channels = usize::from(supported.channels().max(1));
        let config: cpal::StreamConfig = supported.into();

        let (chunks, writer) = spawn_writer(path, sample_rate)?;
        let muted = Arc::new(AtomicBool::new(false));
        let callback_muted = Arc::clone(&muted);

        let stream = device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if callback_muted.load(Ordering::Acquire) {
                        return;
                    }
                    let mono: Vec<f32> = data.chunks(channels).map(downmix).collect();
                    // Writer gone means the take is already being finalized.
                    let _ = chunks.send(mono);
                },
                |err| {
                    error!("Audio input stream error: {}", err);
                },
                None,
            )
            .map_err(|e| {
                ServiceError::engine("start_recorder", format!("Failed to build stream: {e}"))
            })?;

        stream.play().map_err(|e| {
            ServiceError::engine("start_recorder", format!("Failed to start stream: {e}"))
        })?;

        info!(
            device_id = ?device.id(),
            sample_rate,
            channels,
            path = ?path,
            "Audio capture started"
        );

        Ok(Self {
            stream: Some(stream),
            path: path.to_path_buf(),
            muted,
            writer: Some(writer),
            sample_rate,
        })
    }

    /// Stop taking samples and release the device where the host allows it.
    pub(crate) fn pause(&self) -> ServiceResult<()> {
        self.muted.store(true, Ordering::Release);

        if let Some(stream) = &self.stream {
            if let Err(e) = stream.pause() {
                // Muting alone still keeps the take correct.
                warn!(error = %e, "Input stream cannot pause, samples are dropped instead");
            }
        }

        debug!("Audio capture paused");
        Ok(())
    }

    /// Take samples again.
    pub(crate) fn resume(&self) -> ServiceResult<()> {
        if let Some(stream) = &self.stream {
            stream.play().map_err(|e| {
                ServiceError::engine("resume_recorder", format!("Failed to restart stream: {e}"))
            })?;
        }

        self.muted.store(false, Ordering::Release);
        debug!("Audio capture resumed");
        Ok(())
    }

    /// Close the stream, finalize the file and return its path.
    #[instrument(skip(self), fields(path = ?self.path))]
    pub(crate) fn finish(mut self) -> ServiceResult<PathBuf> {
        self.muted.store(true, Ordering::Release);
        // Dropping the stream drops the callback's sender, which ends the
        // writer loop.
        drop(self.stream.take());

        let frames = match self.writer.take() {
            Some(writer) => writer.join().map_err(|_| {
                ServiceError::engine("stop_recorder", "WAV writer thread panicked")
            })??,
            None => 0,
        };

        info!(
            frames,
            sample_rate = self.sample_rate,
            "Audio capture stopped"
        );

        Ok(std::mem::take(&mut self.path))
    }
}
