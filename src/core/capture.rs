// src/core/capture.rs
//
// Blocking capture loop over a raw interleaved s16le PCM byte stream (for
// example `arecord -t raw -f S16_LE` piped to stdin).

use std::io::{ErrorKind, Read};

use super::analyzer::WhistleDetector;
use super::recorder::{StreamRecorder, WhistleRecorder};
use crate::detection::Timestamp;
use crate::error::Result;

/// Buffers shorter than this are glitches from the capture device
const MIN_BUFFER_BYTES: usize = 100;

/// Reads period-sized buffers of interleaved 16-bit little-endian PCM
pub struct PcmSource<R> {
    reader: R,
    channels: usize,
    frame_bytes: usize,
    period_bytes: usize,
    leftover: Vec<u8>,
}

impl<R: Read> PcmSource<R> {
    pub fn new(reader: R, channels: usize, period_frames: usize) -> Self {
        let frame_bytes = channels.max(1) * 2;
        Self {
            reader,
            channels,
            frame_bytes,
            period_bytes: period_frames.max(1) * frame_bytes,
            leftover: Vec::with_capacity(frame_bytes),
        }
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Next buffer of whole frames; `None` at end of stream
    ///
    /// Short reads are returned as-is. A trailing partial frame is held back
    /// and prepended to the following read, including across skipped reads.
    pub fn next_buffer(&mut self) -> Result<Option<Vec<i16>>> {
        loop {
            let mut bytes = Vec::with_capacity(self.period_bytes + self.frame_bytes);
            bytes.append(&mut self.leftover);

            let mut chunk = vec![0u8; self.period_bytes];
            let n = loop {
                match self.reader.read(&mut chunk) {
                    Ok(n) => break n,
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e.into()),
                }
            };
            if n == 0 {
                return Ok(None);
            }
            bytes.extend_from_slice(&chunk[..n]);

            let whole = bytes.len() - bytes.len() % self.frame_bytes;
            self.leftover.extend_from_slice(&bytes[whole..]);
            bytes.truncate(whole);

            if bytes.len() < MIN_BUFFER_BYTES {
                log::warn!("Skipping short capture buffer of {} bytes", bytes.len());
                continue;
            }

            let samples = bytes
                .chunks_exact(2)
                .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
                .collect();
            return Ok(Some(samples));
        }
    }
}

/// Counters reported when the capture stream ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureStats {
    pub buffers: u64,
    pub windows: u64,
    pub whistles: u64,
}

/// Read-and-process until the source is exhausted
///
/// Each buffer is stamped with the wall clock, remembered by the recorder,
/// optionally appended to `record_all`, then analysed to completion before
/// the next read.
pub fn run_capture<R: Read>(
    source: &mut PcmSource<R>,
    detector: &mut WhistleDetector,
    recorder: &mut WhistleRecorder,
    mut record_all: Option<&mut StreamRecorder>,
) -> Result<CaptureStats> {
    let mut stats = CaptureStats::default();

    while let Some(buffer) = source.next_buffer()? {
        let timestamp = Timestamp::now();
        stats.buffers += 1;

        recorder.remember(&buffer);
        if let Some(out) = record_all.as_deref_mut() {
            out.write(&buffer)?;
        }

        let report = detector.process_chunk(&buffer, source.channels(), Some(timestamp), recorder)?;
        stats.windows += report.windows as u64;
        stats.whistles += report.detected as u64;
    }

    log::info!(
        "Capture ended after {} buffers, {} windows, {} whistles",
        stats.buffers,
        stats.windows,
        stats.whistles
    );
    Ok(stats)
}
