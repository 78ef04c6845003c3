//! WAV encoding for the desktop recorder and decoding for the preview
//! player. Recordings are mono 16-bit PCM at the input device rate.

use clip_recorder_core::{ServiceError, ServiceResult};

use std::{
    fs::File,
    io::BufWriter,
    path::Path,
    sync::mpsc,
    thread::JoinHandle,
};

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use tracing::{debug, warn};

/// Decoded recording ready for playback.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct WavClip {
    /// Mono samples in `[-1.0, 1.0]`.
    pub(crate) samples: Vec<f32>,
    /// Frames per second.
    pub(crate) sample_rate: u32,
}

impl WavClip {
    pub(crate) fn duration_ms(&self) -> u64 {
        frames_to_ms(self.samples.len() as u64, self.sample_rate)
    }
}

/// Format of every file the recorder writes.
pub(crate) fn recording_spec(sample_rate: u32) -> WavSpec {
    WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    }
}

/// Average one interleaved frame down to a single sample.
pub(crate) fn downmix(frame: &[f32]) -> f32 {
    if frame.is_empty() {
        return 0.0;
    }
    frame.iter().sum::<f32>() / frame.len() as f32
}

/// Convert a float sample to 16-bit PCM, clipping out-of-range input.
pub(crate) fn to_pcm16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

pub(crate) fn frames_to_ms(frames: u64, sample_rate: u32) -> u64 {
    frames * 1000 / u64::from(sample_rate.max(1))
}

/// Start a writer thread that appends every received chunk of mono samples
/// to a WAV file at `path`. The file is finalized once every sender has
/// been dropped; the join handle yields the number of frames written.
pub(crate) fn spawn_writer(
    path: &Path,
    sample_rate: u32,
) -> ServiceResult<(mpsc::Sender<Vec<f32>>, JoinHandle<ServiceResult<u64>>)> {
    let mut writer = WavWriter::create(path, recording_spec(sample_rate))
        .map_err(|e| ServiceError::engine("start_recorder", format!("Failed to create WAV: {e}")))?;

    let (chunks_tx, chunks_rx) = mpsc::channel::<Vec<f32>>();
    let path = path.to_path_buf();

    let handle = std::thread::Builder::new()
        .name("wav-writer".to_string())
        .spawn(move || -> ServiceResult<u64> {
            // Finalize even after a failed write so the partial take stays
            // readable.
            let written = write_chunks(&mut writer, &chunks_rx, &path);
            writer.finalize().map_err(|e| {
                ServiceError::engine("stop_recorder", format!("Failed to finalize WAV: {e}"))
            })?;
            let frames = written?;
            debug!(frames, path = ?path, "WAV finalized");
            Ok(frames)
        })
        .map_err(|e| ServiceError::engine("start_recorder", format!("Failed to spawn writer: {e}")))?;

    Ok((chunks_tx, handle))
}

fn write_chunks(
    writer: &mut WavWriter<BufWriter<File>>,
    chunks: &mpsc::Receiver<Vec<f32>>,
    path: &Path,
) -> ServiceResult<u64> {
    let mut frames = 0u64;

    while let Ok(chunk) = chunks.recv() {
        for sample in chunk {
            writer.write_sample(to_pcm16(sample)).map_err(|e| {
                warn!(path = ?path, error = %e, "WAV write failed");
                ServiceError::engine("stop_recorder", format!("Failed to write WAV: {e}"))
            })?;
            frames += 1;
        }
    }

    Ok(frames)
}

/// Decode a WAV file to mono floats.
pub(crate) fn read_clip(path: &Path) -> ServiceResult<WavClip> {
    let mut reader = WavReader::open(path)
        .map_err(|e| ServiceError::engine("start_player", format!("Failed to open WAV: {e}")))?;
    let spec = reader.spec();
    let channels = usize::from(spec.channels.max(1));

    let interleaved: Result<Vec<f32>, hound::Error> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, _) => reader.samples::<f32>().collect(),
        (SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .map(|s| s.map(|v| v as f32 / i16::MAX as f32))
            .collect(),
        (SampleFormat::Int, bits) if (1..=32).contains(&bits) => {
            let scale = (1i64 << (bits - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect()
        }
        (SampleFormat::Int, bits) => {
            return Err(ServiceError::engine(
                "start_player",
                format!("Unsupported bit depth: {bits}"),
            ));
        }
    };

    let interleaved = interleaved
        .map_err(|e| ServiceError::engine("start_player", format!("Failed to decode WAV: {e}")))?;

    Ok(WavClip {
        samples: interleaved.chunks(channels).map(downmix).collect(),
        sample_rate: spec.sample_rate,
    })
}

/// Length of a WAV file from its header.
pub(crate) fn probe_duration_ms(path: &Path) -> ServiceResult<u64> {
    let reader = WavReader::open(path)
        .map_err(|e| ServiceError::engine("probe_duration", format!("Failed to open WAV: {e}")))?;
    Ok(frames_to_ms(
        u64::from(reader.duration()),
        reader.spec().sample_rate,
    ))
}
