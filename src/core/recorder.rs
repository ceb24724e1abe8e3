// src/core/recorder.rs
//
// Whistle persistence: keep the last couple of seconds of capture audio and
// save it as a timestamped WAV whenever a whistle is confirmed. The file names
// double as the record other processes query with `whistle_heard`.

use std::collections::VecDeque;
use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};
use hound::{SampleFormat, WavSpec, WavWriter};

use super::sink::WhistleSink;
use crate::detection::{Timestamp, WhistleEvent};
use crate::error::Result;

/// strftime pattern for saved whistle files (UTC)
pub const WHISTLE_FILE_FORMAT: &str = "whistle_%Y_%m_%d_%H%M%S.wav";

/// Default directory for saved whistles: `$HOME/whistle`
pub fn default_whistle_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("whistle")
}

fn pcm_spec(channels: usize, sample_rate: u32) -> WavSpec {
    WavSpec {
        channels: channels as u16,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    }
}

/// Write interleaved 16-bit PCM to a new WAV file
pub fn write_pcm_wav(path: &Path, samples: &[i16], channels: usize, sample_rate: u32) -> Result<()> {
    let mut writer = WavWriter::create(path, pcm_spec(channels, sample_rate))?;
    for &s in samples {
        writer.write_sample(s)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Trailing window of raw capture buffers
#[derive(Debug, Clone)]
pub struct AudioHistory {
    buffers: VecDeque<Vec<i16>>,
    samples: usize,
    keep_samples: usize,
}

impl AudioHistory {
    pub fn new(keep_secs: f64, sample_rate: u32, channels: usize) -> Self {
        Self {
            buffers: VecDeque::new(),
            samples: 0,
            keep_samples: (keep_secs * sample_rate as f64) as usize * channels,
        }
    }

    /// Append a buffer, dropping the oldest ones no longer needed to cover the window
    pub fn push(&mut self, buffer: &[i16]) {
        self.buffers.push_back(buffer.to_vec());
        self.samples += buffer.len();
        while let Some(front) = self.buffers.front() {
            if self.samples - front.len() < self.keep_samples {
                break;
            }
            self.samples -= front.len();
            self.buffers.pop_front();
        }
    }

    pub fn len_samples(&self) -> usize {
        self.samples
    }

    pub fn iter(&self) -> impl Iterator<Item = &i16> {
        self.buffers.iter().flatten()
    }

    pub fn clear(&mut self) {
        self.buffers.clear();
        self.samples = 0;
    }
}

/// Sink that saves the trailing audio of each confirmed whistle
pub struct WhistleRecorder {
    dir: PathBuf,
    keep_files: usize,
    min_interval_secs: i64,
    save: bool,
    channels: usize,
    sample_rate: u32,
    history: AudioHistory,
    last_saved: Option<Timestamp>,
    saved: Vec<PathBuf>,
}

impl WhistleRecorder {
    pub fn new(dir: impl Into<PathBuf>, channels: usize, sample_rate: u32) -> Self {
        Self {
            dir: dir.into(),
            keep_files: 20,
            min_interval_secs: 5,
            save: true,
            channels,
            sample_rate,
            history: AudioHistory::new(2.0, sample_rate, channels),
            last_saved: None,
            saved: Vec::new(),
        }
    }

    /// Maximum whistle files left in the directory; 0 disables pruning
    pub fn keep_files(mut self, n: usize) -> Self {
        self.keep_files = n;
        self
    }

    /// Minimum spacing between saved files
    pub fn min_interval_secs(mut self, secs: i64) -> Self {
        self.min_interval_secs = secs;
        self
    }

    /// Seconds of audio written per whistle
    pub fn keep_secs(mut self, secs: f64) -> Self {
        self.history = AudioHistory::new(secs, self.sample_rate, self.channels);
        self
    }

    /// With saving off, events are still rate-limited and pruning still runs
    pub fn save(mut self, enabled: bool) -> Self {
        self.save = enabled;
        self
    }

    /// Record a capture buffer; call before handing the same buffer to the detector
    pub fn remember(&mut self, buffer: &[i16]) {
        self.history.push(buffer);
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Files written so far by this recorder
    pub fn saved(&self) -> &[PathBuf] {
        &self.saved
    }

    fn rate_limited(&self, ts: &Timestamp) -> bool {
        match &self.last_saved {
            Some(last) => ts.secs - self.min_interval_secs < last.secs,
            None => false,
        }
    }

    /// Remove the oldest whistle files so one more fits under the limit
    fn prune(&self) -> Result<()> {
        if self.keep_files == 0 {
            return Ok(());
        }

        let mut files: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && is_whistle_file(p))
            .collect();
        // Names sort chronologically
        files.sort();

        let excess = (files.len() + 1).saturating_sub(self.keep_files);
        for old in files.iter().take(excess) {
            log::debug!("Removing file: {}", old.display());
            fs::remove_file(old)?;
        }
        Ok(())
    }

    fn write_history(&self, path: &Path) -> Result<()> {
        let file = BufWriter::new(fs::File::create(path)?);
        let mut writer = WavWriter::new(file, pcm_spec(self.channels, self.sample_rate))?;
        for &s in self.history.iter() {
            writer.write_sample(s)?;
        }
        writer.finalize()?;
        Ok(())
    }
}

impl WhistleSink for WhistleRecorder {
    fn whistle_detected(&mut self, event: &WhistleEvent) -> Result<()> {
        let Some(ts) = event.timestamp else {
            log::debug!("Not saving whistle without a capture timestamp");
            return Ok(());
        };
        if self.rate_limited(&ts) {
            log::debug!("Whistle at {} within {}s of last save, skipping", ts, self.min_interval_secs);
            return Ok(());
        }
        self.last_saved = Some(ts);

        fs::create_dir_all(&self.dir)?;
        self.prune()?;

        if !self.save {
            return Ok(());
        }

        let name = match ts.to_datetime() {
            Some(dt) => dt.format(WHISTLE_FILE_FORMAT).to_string(),
            None => format!("whistle_{}.wav", ts.secs),
        };
        let path = self.dir.join(name);
        log::info!("Saving whistle as: {}", path.display());
        self.write_history(&path)?;
        self.saved.push(path);
        Ok(())
    }
}

/// Appends every capture buffer to one WAV file
pub struct StreamRecorder {
    writer: WavWriter<BufWriter<fs::File>>,
}

impl StreamRecorder {
    pub fn create(path: &Path, channels: usize, sample_rate: u32) -> Result<Self> {
        log::info!("Writing sound to '{}'", path.display());
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(Self {
            writer: WavWriter::create(path, pcm_spec(channels, sample_rate))?,
        })
    }

    pub fn write(&mut self, buffer: &[i16]) -> Result<()> {
        for &s in buffer {
            self.writer.write_sample(s)?;
        }
        Ok(())
    }

    pub fn finalize(self) -> Result<()> {
        self.writer.finalize()?;
        Ok(())
    }
}

fn is_whistle_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with("whistle_") && n.ends_with(".wav"))
        .unwrap_or(false)
}

/// True if a whistle file in `dir` was stamped within `seconds` of `now`
pub fn whistle_heard_at(dir: &Path, seconds: f64, now: DateTime<Utc>) -> Result<bool> {
    if !dir.exists() {
        return Ok(false);
    }

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        let Ok(stamp) = NaiveDateTime::parse_from_str(name, WHISTLE_FILE_FORMAT) else {
            continue;
        };

        let delta = (now.naive_utc() - stamp).num_milliseconds() as f64 / 1000.0;
        // Both sides, so a clock step backwards still counts as recent
        if delta.abs() < seconds {
            return Ok(true);
        }
    }
    Ok(false)
}

/// `whistle_heard_at` against the current time
pub fn whistle_heard(dir: &Path, seconds: f64) -> Result<bool> {
    whistle_heard_at(dir, seconds, Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_history_keeps_trailing_window() {
        let mut history = AudioHistory::new(1.0, 10, 1);
        for i in 0..5 {
            history.push(&[i as i16; 4]);
        }
        // 10 samples requested: the oldest buffer kept must be needed to reach 10
        assert_eq!(history.len_samples(), 12);
        let samples: Vec<i16> = history.iter().copied().collect();
        assert_eq!(samples[0], 2);
        assert_eq!(*samples.last().unwrap(), 4);
    }

    #[test]
    fn test_file_name_format() {
        let dt = Utc.with_ymd_and_hms(2019, 7, 4, 9, 5, 30).unwrap();
        assert_eq!(dt.format(WHISTLE_FILE_FORMAT).to_string(), "whistle_2019_07_04_090530.wav");
    }

    #[test]
    fn test_rate_limit() {
        let mut recorder = WhistleRecorder::new(std::env::temp_dir(), 1, 48_000);
        assert!(!recorder.rate_limited(&Timestamp::new(100, 0)));
        recorder.last_saved = Some(Timestamp::new(100, 0));
        assert!(recorder.rate_limited(&Timestamp::new(104, 999_999)));
        assert!(!recorder.rate_limited(&Timestamp::new(105, 0)));
    }

    #[test]
    fn test_heard_in_missing_dir() {
        let heard = whistle_heard(Path::new("/nonexistent/whistles"), 3.0).unwrap();
        assert!(!heard);
    }
}
