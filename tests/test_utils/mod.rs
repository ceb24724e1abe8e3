// tests/test_utils/mod.rs
//
// Shared helpers for the integration suites: synthetic signals, chunked
// feeding, and throwaway directories.

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use uuid::Uuid;
use whistlewatch::testgen::{SignalSpec, ToneSpec};
use whistlewatch::{EventLog, Timestamp, WhistleDetector};

pub const SAMPLE_RATE: u32 = 48_000;
pub const WHISTLE_HZ: f64 = 3000.0;
pub const TONE_AMPLITUDE: f64 = 10_000.0;
pub const NOISE_STD_DEV: f64 = 1000.0;

/// Base capture time used for timestamped feeds (2023-11-14 22:13:20 UTC)
pub const BASE_EPOCH_SECS: i64 = 1_700_000_000;

/// Fresh directory under the system temp dir; removed on drop
pub struct TempDir {
    pub path: PathBuf,
}

impl TempDir {
    pub fn new(prefix: &str) -> Self {
        let path = std::env::temp_dir().join(format!("{}-{}", prefix, Uuid::new_v4()));
        fs::create_dir_all(&path).expect("create temp dir");
        Self { path }
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

pub fn noise(seconds: f64) -> SignalSpec {
    SignalSpec::noise(SAMPLE_RATE, seconds, NOISE_STD_DEV)
}

/// White noise with a whistle switched on at `start` (and off at `end`)
pub fn whistle(seconds: f64, start: f64, end: Option<f64>) -> SignalSpec {
    let mut tone = ToneSpec::new(WHISTLE_HZ, TONE_AMPLITUDE).starting_at(start);
    if let Some(end) = end {
        tone = tone.ending_at(end);
    }
    noise(seconds).with_tone(tone)
}

/// Capture timestamp for a chunk beginning at `frame`
pub fn timestamp_at(frame: usize) -> Timestamp {
    let micros = frame as i64 * 1_000_000 / SAMPLE_RATE as i64;
    Timestamp::new(BASE_EPOCH_SECS + micros / 1_000_000, (micros % 1_000_000) as u32)
}

/// Feed mono samples in chunks of `chunk_frames`, collecting every event
pub fn feed_in_chunks(detector: &mut WhistleDetector, samples: &[i16], chunk_frames: usize) -> EventLog {
    let mut log = EventLog::new();
    for chunk in samples.chunks(chunk_frames) {
        detector
            .process_chunk(chunk, 1, None, &mut log)
            .expect("process chunk");
    }
    log
}

/// Interleave two equally long mono signals
pub fn interleave(left: &[i16], right: &[i16]) -> Vec<i16> {
    left.iter()
        .zip(right)
        .flat_map(|(&l, &r)| [l, r])
        .collect()
}

/// White noise with a whistle during each `(start, end)` interval
pub fn whistles(seconds: f64, intervals: &[(f64, f64)]) -> Vec<i16> {
    let mut samples = noise(seconds).generate();
    for &(start, end) in intervals {
        let tone = SignalSpec::noise(SAMPLE_RATE, seconds, 0.0)
            .with_tone(ToneSpec::new(WHISTLE_HZ, TONE_AMPLITUDE).starting_at(start).ending_at(end))
            .generate();
        for (s, t) in samples.iter_mut().zip(tone) {
            *s = s.saturating_add(t);
        }
    }
    samples
}
