// src/core/decoder.rs
//
// WAV replay: decode a recording with hound and run it through a fresh
// detector, the way the live capture loop would.

use std::path::Path;

use hound::{SampleFormat, WavReader};

use super::analyzer::WhistleDetector;
use super::sink::EventLog;
use crate::config::DetectorConfig;
use crate::detection::WhistleEvent;
use crate::error::{Result, WhistleError};

/// Decoded WAV contents as interleaved 16-bit PCM
#[derive(Debug, Clone)]
pub struct PcmAudio {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
    pub channels: usize,
}

impl PcmAudio {
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.samples.len() / self.channels
        }
    }

    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / self.sample_rate.max(1) as f64
    }
}

/// Decode a WAV file, converting any integer or float encoding to i16
pub fn read_wav(path: &Path) -> Result<PcmAudio> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();

    if spec.channels == 0 {
        return Err(WhistleError::InvalidChunk(format!(
            "{} reports 0 audio channels",
            path.display()
        )));
    }

    let samples: Vec<i16> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Int, 16) => reader.samples::<i16>().collect::<std::result::Result<_, _>>()?,
        (SampleFormat::Int, bits) if bits <= 32 => {
            let shift = bits as i32 - 16;
            reader
                .samples::<i32>()
                .map(|s| {
                    s.map(|v| {
                        if shift >= 0 {
                            (v >> shift) as i16
                        } else {
                            (v << -shift) as i16
                        }
                    })
                })
                .collect::<std::result::Result<_, _>>()?
        }
        (SampleFormat::Float, _) => reader
            .samples::<f32>()
            .map(|s| s.map(|v| (v.clamp(-1.0, 1.0) * 32767.0) as i16))
            .collect::<std::result::Result<_, _>>()?,
        (_, bits) => {
            return Err(WhistleError::InvalidChunk(format!(
                "unsupported WAV bit depth: {}",
                bits
            )))
        }
    };

    Ok(PcmAudio {
        samples,
        sample_rate: spec.sample_rate,
        channels: spec.channels as usize,
    })
}

/// Result of replaying one recording
#[derive(Debug, Clone)]
pub struct ReplayOutcome {
    /// First whistle heard, if any
    pub event: Option<WhistleEvent>,
    /// Windows analysed before stopping
    pub windows: u64,
    pub duration_secs: f64,
}

impl ReplayOutcome {
    pub fn detected(&self) -> bool {
        self.event.is_some()
    }
}

/// Replay decoded audio through a new detector, stopping at the first whistle
pub fn detect_in_audio(audio: &PcmAudio, config: &DetectorConfig) -> Result<ReplayOutcome> {
    if audio.sample_rate != config.sample_rate() {
        log::warn!(
            "Audio is {} Hz but detector expects {} Hz; band edges will be off",
            audio.sample_rate,
            config.sample_rate()
        );
    }

    let mut detector = WhistleDetector::new(config.clone());
    let mut log = EventLog::new();

    // Feed one window's worth of frames per chunk, like the capture period
    let chunk_len = config.window_size() * audio.channels;
    for chunk in audio.samples.chunks(chunk_len) {
        detector.process_chunk(chunk, audio.channels, None, &mut log)?;
        if !log.is_empty() {
            break;
        }
    }

    Ok(ReplayOutcome {
        event: log.events.into_iter().next(),
        windows: detector.windows_processed(),
        duration_secs: audio.duration_secs(),
    })
}

/// Decode `path` and replay it through a new detector
pub fn detect_in_wav(path: &Path, config: &DetectorConfig) -> Result<ReplayOutcome> {
    let audio = read_wav(path)?;
    log::debug!(
        "Replaying {} ({} Hz, {} ch, {:.2}s)",
        path.display(),
        audio.sample_rate,
        audio.channels,
        audio.duration_secs()
    );
    detect_in_audio(&audio, config)
}
