// src/config/settings.rs
//
// Detector tuning parameters: a serde-friendly raw form and the validated,
// immutable form every pipeline stage is built from.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::dsp::frequency_to_bin;
use crate::error::{Result, WhistleError};

/// What the stream driver does with samples left over after the last full window of a chunk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemainderPolicy {
    /// Buffer the tail and prepend it to the next chunk
    #[default]
    Carry,
    /// Drop the tail at every chunk boundary
    Truncate,
}

/// Unvalidated tuning parameters, as read from a config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorSettings {
    /// Sample rate of the analysed stream in Hz
    pub sample_rate: u32,
    /// Samples per analysis window (power of two)
    pub window_size: usize,
    /// Lower edge of the whistle band in Hz
    pub whistle_begin_hz: u32,
    /// Upper edge of the whistle band in Hz
    pub whistle_end_hz: u32,
    /// Std-dev multiplier for the single-spectrum threshold
    pub spectrum_threshold: f32,
    /// Std-dev multiplier for the rolling-median threshold
    pub temporal_threshold: f32,
    /// Std-dev multiplier below which band-edge buckets count as background
    pub background_threshold: f32,
    /// Detecting spectra needed to confirm a whistle
    pub okay_spectra: u32,
    /// Tolerated non-detecting spectra before a streak or whistle ends
    pub miss_spectra: u32,
    /// Spectra kept for rolling statistics (about one second)
    pub stats_window: usize,
    /// Buckets the band is split into when trimming background edges
    pub band_buckets: usize,
    pub remainder: RemainderPolicy,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        // Band edges correspond to the spectrogram of recorded referee whistles
        Self {
            sample_rate: 48_000,
            window_size: 1024,
            whistle_begin_hz: 2000,
            whistle_end_hz: 4000,
            spectrum_threshold: 2.5,
            temporal_threshold: 5.0,
            background_threshold: 0.7,
            okay_spectra: 12, // ~250ms at 48 kHz
            miss_spectra: 4,  // ~83ms at 48 kHz
            stats_window: 47, // 46.875 spectra per second
            band_buckets: 10,
            remainder: RemainderPolicy::Carry,
        }
    }
}

impl DetectorSettings {
    /// Load settings from a JSON file; absent keys keep their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Check every parameter and derive bin indices
    pub fn validate(self) -> Result<DetectorConfig> {
        if self.sample_rate == 0 {
            return Err(WhistleError::config("sample_rate must be positive"));
        }
        if self.window_size < 2 || !self.window_size.is_power_of_two() {
            return Err(WhistleError::config(format!(
                "window_size must be a power of two >= 2, got {}",
                self.window_size
            )));
        }

        let nyquist = self.sample_rate / 2;
        if self.whistle_begin_hz > nyquist {
            return Err(WhistleError::config("whistle_begin_hz is above Nyquist frequency"));
        }
        if self.whistle_end_hz > nyquist {
            return Err(WhistleError::config("whistle_end_hz is above Nyquist frequency"));
        }
        if self.whistle_begin_hz >= self.whistle_end_hz {
            return Err(WhistleError::config("whistle_begin_hz must be below whistle_end_hz"));
        }

        for (name, value) in [
            ("spectrum_threshold", self.spectrum_threshold),
            ("temporal_threshold", self.temporal_threshold),
            ("background_threshold", self.background_threshold),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(WhistleError::config(format!(
                    "{} must be finite and non-negative, got {}",
                    name, value
                )));
            }
        }

        if self.okay_spectra == 0 {
            return Err(WhistleError::config("okay_spectra must be at least 1"));
        }
        if self.stats_window == 0 {
            return Err(WhistleError::config("stats_window must be at least 1"));
        }
        if self.band_buckets == 0 {
            return Err(WhistleError::config("band_buckets must be at least 1"));
        }

        let begin_bin = frequency_to_bin(self.whistle_begin_hz, self.window_size, self.sample_rate);
        let end_bin = frequency_to_bin(self.whistle_end_hz, self.window_size, self.sample_rate);
        if begin_bin >= end_bin {
            return Err(WhistleError::config(format!(
                "whistle band {}-{} Hz is narrower than one bin at window_size {}",
                self.whistle_begin_hz, self.whistle_end_hz, self.window_size
            )));
        }

        Ok(DetectorConfig {
            settings: self,
            begin_bin,
            end_bin,
        })
    }
}

/// Validated, immutable detector configuration
///
/// Cheap to clone; each detector instance owns its own copy.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
    settings: DetectorSettings,
    begin_bin: usize,
    end_bin: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        // The defaults always validate; build the struct directly so there is no failure path
        let settings = DetectorSettings::default();
        let begin_bin = frequency_to_bin(settings.whistle_begin_hz, settings.window_size, settings.sample_rate);
        let end_bin = frequency_to_bin(settings.whistle_end_hz, settings.window_size, settings.sample_rate);
        Self {
            settings,
            begin_bin,
            end_bin,
        }
    }
}

impl DetectorConfig {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    pub fn settings(&self) -> &DetectorSettings {
        &self.settings
    }

    pub fn sample_rate(&self) -> u32 {
        self.settings.sample_rate
    }

    pub fn window_size(&self) -> usize {
        self.settings.window_size
    }

    /// First bin of the whistle band (inclusive)
    pub fn spectrum_begin_bin(&self) -> usize {
        self.begin_bin
    }

    /// End bin of the whistle band (exclusive)
    pub fn spectrum_end_bin(&self) -> usize {
        self.end_bin
    }

    pub fn spectrum_threshold(&self) -> f32 {
        self.settings.spectrum_threshold
    }

    pub fn temporal_threshold(&self) -> f32 {
        self.settings.temporal_threshold
    }

    pub fn background_threshold(&self) -> f32 {
        self.settings.background_threshold
    }

    pub fn okay_spectra(&self) -> u32 {
        self.settings.okay_spectra
    }

    pub fn miss_spectra(&self) -> u32 {
        self.settings.miss_spectra
    }

    pub fn stats_window(&self) -> usize {
        self.settings.stats_window
    }

    pub fn band_buckets(&self) -> usize {
        self.settings.band_buckets
    }

    pub fn remainder(&self) -> RemainderPolicy {
        self.settings.remainder
    }

    /// Duration of one analysis window in seconds
    pub fn window_secs(&self) -> f64 {
        self.settings.window_size as f64 / self.settings.sample_rate as f64
    }
}

/// Builder for constructing a validated configuration
pub struct ConfigBuilder {
    settings: DetectorSettings,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            settings: DetectorSettings::default(),
        }
    }

    pub fn from_settings(settings: DetectorSettings) -> Self {
        Self { settings }
    }

    pub fn sample_rate(mut self, hz: u32) -> Self {
        self.settings.sample_rate = hz;
        self
    }

    pub fn window_size(mut self, samples: usize) -> Self {
        self.settings.window_size = samples;
        self
    }

    pub fn band(mut self, begin_hz: u32, end_hz: u32) -> Self {
        self.settings.whistle_begin_hz = begin_hz;
        self.settings.whistle_end_hz = end_hz;
        self
    }

    pub fn spectrum_threshold(mut self, k: f32) -> Self {
        self.settings.spectrum_threshold = k;
        self
    }

    pub fn temporal_threshold(mut self, k: f32) -> Self {
        self.settings.temporal_threshold = k;
        self
    }

    pub fn background_threshold(mut self, k: f32) -> Self {
        self.settings.background_threshold = k;
        self
    }

    pub fn okay_spectra(mut self, n: u32) -> Self {
        self.settings.okay_spectra = n;
        self
    }

    pub fn miss_spectra(mut self, n: u32) -> Self {
        self.settings.miss_spectra = n;
        self
    }

    pub fn stats_window(mut self, n: usize) -> Self {
        self.settings.stats_window = n;
        self
    }

    pub fn band_buckets(mut self, n: usize) -> Self {
        self.settings.band_buckets = n;
        self
    }

    pub fn remainder(mut self, policy: RemainderPolicy) -> Self {
        self.settings.remainder = policy;
        self
    }

    pub fn build(self) -> Result<DetectorConfig> {
        self.settings.validate()
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = DetectorSettings::default().validate().unwrap();
        assert_eq!(config.spectrum_begin_bin(), 42);
        assert_eq!(config.spectrum_end_bin(), 85);
        assert_eq!(config, DetectorConfig::default());
        assert_eq!(RemainderPolicy::default(), RemainderPolicy::Carry);
        assert_eq!(config.remainder(), RemainderPolicy::Carry);
    }

    #[test]
    fn test_bins_ordered_and_in_range() {
        let cases = [
            (48_000, 1024, 0, 24_000),
            (48_000, 1024, 2000, 4000),
            (16_000, 256, 100, 200),
            (44_100, 4096, 5, 22_050),
            (8000, 2, 0, 4000),
        ];
        for (rate, window, begin, end) in cases {
            let config = DetectorConfig::builder()
                .sample_rate(rate)
                .window_size(window)
                .band(begin, end)
                .build()
                .unwrap();
            assert!(config.spectrum_begin_bin() < config.spectrum_end_bin());
            assert!(config.spectrum_end_bin() <= window / 2);
        }
    }

    #[test]
    fn test_rejects_bad_band() {
        let above_nyquist = DetectorConfig::builder().band(2000, 24_001).build();
        assert!(matches!(above_nyquist, Err(WhistleError::Config(_))));

        let inverted = DetectorConfig::builder().band(4000, 2000).build();
        assert!(matches!(inverted, Err(WhistleError::Config(_))));

        let empty = DetectorConfig::builder().band(3000, 3000).build();
        assert!(matches!(empty, Err(WhistleError::Config(_))));

        // 10 Hz is well under one 46.875 Hz bin
        let sub_bin = DetectorConfig::builder().band(2000, 2010).build();
        assert!(matches!(sub_bin, Err(WhistleError::Config(_))));
    }

    #[test]
    fn test_rejects_bad_window_and_counts() {
        assert!(DetectorConfig::builder().window_size(1000).build().is_err());
        assert!(DetectorConfig::builder().window_size(1).build().is_err());
        assert!(DetectorConfig::builder().sample_rate(0).build().is_err());
        assert!(DetectorConfig::builder().okay_spectra(0).build().is_err());
        assert!(DetectorConfig::builder().stats_window(0).build().is_err());
        assert!(DetectorConfig::builder().band_buckets(0).build().is_err());
        assert!(DetectorConfig::builder().spectrum_threshold(f32::NAN).build().is_err());
        assert!(DetectorConfig::builder().background_threshold(-0.1).build().is_err());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = DetectorSettings::from_json_str(
            r#"{ "okay_spectra": 8, "remainder": "truncate" }"#,
        )
        .unwrap();
        assert_eq!(settings.okay_spectra, 8);
        assert_eq!(settings.remainder, RemainderPolicy::Truncate);
        assert_eq!(settings.window_size, 1024);
        assert_eq!(settings.whistle_end_hz, 4000);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let result = DetectorSettings::from_json_str("{ okay_spectra: }");
        assert!(matches!(result, Err(WhistleError::Json(_))));
    }
}
