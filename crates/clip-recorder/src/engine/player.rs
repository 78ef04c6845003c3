use crate::engine::wav::{WavClip, read_clip};

use clip_recorder_core::{ServiceError, ServiceResult};

use std::{
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
};

use cpal::{
    Stream,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use tracing::{error, info, instrument};

/// Shared read position of a playing clip.
///
/// The output callback advances it one device frame at a time and maps
/// device frames onto clip frames (nearest neighbour), so a clip recorded
/// at another rate still plays at the right speed.
#[derive(Debug)]
pub(crate) struct PlaybackCursor {
    clip: WavClip,
    device_rate: u32,
    played_frames: AtomicU64,
    paused: AtomicBool,
    finished: AtomicBool,
}

impl PlaybackCursor {
    pub(crate) fn new(clip: WavClip, device_rate: u32) -> Self {
        Self {
            clip,
            device_rate: device_rate.max(1),
            played_frames: AtomicU64::new(0),
            paused: AtomicBool::new(false),
            finished: AtomicBool::new(false),
        }
    }

    /// Next mono sample, or `None` once the clip is exhausted.
    pub(crate) fn next_sample(&self) -> Option<f32> {
        let played = self.played_frames.fetch_add(1, Ordering::Relaxed);
        let sample = self.clip.samples.get(self.clip_frame(played)).copied();
        if sample.is_none() {
            self.finished.store(true, Ordering::Release);
        }
        sample
    }

    pub(crate) fn position_ms(&self) -> u64 {
        let frame = self.clip_frame(self.played_frames.load(Ordering::Relaxed)) as u64;
        (frame * 1000 / u64::from(self.clip.sample_rate.max(1))).min(self.duration_ms())
    }

    pub(crate) fn duration_ms(&self) -> u64 {
        self.clip.duration_ms()
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    pub(crate) fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::Release);
    }

    fn clip_frame(&self, device_frame: u64) -> usize {
        (device_frame * u64::from(self.clip.sample_rate) / u64::from(self.device_rate)) as usize
    }
}

/// A clip playing on the default output device.
pub(crate) struct Player {
    stream: Stream,
    cursor: Arc<PlaybackCursor>,
}

impl Player {
    /// Decode `path` and start playing it from the beginning.
    #[instrument]
    pub(crate) fn start(path: &Path) -> ServiceResult<Self> {
        let clip = read_clip(path)?;

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| ServiceError::engine("start_player", "No output device available"))?;

        let supported = device.default_output_config().map_err(|e| {
            ServiceError::engine("start_player", format!("Failed to get output config: {e}"))
        })?;
        let channels = usize::from(supported.channels().max(1));
        let device_rate = supported.sample_rate();
        let config: cpal::StreamConfig = supported.into();

        let cursor = Arc::new(PlaybackCursor::new(clip, device_rate));
        let callback_cursor = Arc::clone(&cursor);

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    if callback_cursor.is_paused() || callback_cursor.is_finished() {
                        data.fill(0.0);
                        return;
                    }
                    for frame in data.chunks_mut(channels) {
                        frame.fill(callback_cursor.next_sample().unwrap_or(0.0));
                    }
                },
                |err| {
                    error!("Audio output stream error: {}", err);
                },
                None,
            )
            .map_err(|e| {
                ServiceError::engine("start_player", format!("Failed to build output stream: {e}"))
            })?;

        stream.play().map_err(|e| {
            ServiceError::engine("start_player", format!("Failed to start output stream: {e}"))
        })?;

        info!(
            duration_ms = cursor.duration_ms(),
            device_rate,
            "Preview playback started"
        );

        Ok(Self { stream, cursor })
    }

    pub(crate) fn cursor(&self) -> Arc<PlaybackCursor> {
        Arc::clone(&self.cursor)
    }

    pub(crate) fn pause(&self) -> ServiceResult<()> {
        self.cursor.set_paused(true);
        // A stream that cannot pause keeps running and plays silence.
        let _ = self.stream.pause();
        Ok(())
    }

    pub(crate) fn resume(&self) -> ServiceResult<()> {
        self.stream.play().map_err(|e| {
            ServiceError::engine("resume_player", format!("Failed to restart output stream: {e}"))
        })?;
        self.cursor.set_paused(false);
        Ok(())
    }
}
