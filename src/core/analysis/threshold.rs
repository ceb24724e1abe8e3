// src/core/analysis/threshold.rs
//
// Adaptive detection thresholds from per-spectrum statistics blended with a
// rolling one-second median of past statistics.

use std::collections::VecDeque;

use crate::config::DetectorConfig;
use crate::core::dsp::{mean_and_std_dev, median, Spectrum};
use crate::error::{Result, WhistleError};

/// Bounded history of per-spectrum (mean, std-dev) pairs
#[derive(Debug, Clone)]
pub struct RollingStats {
    entries: VecDeque<(f32, f32)>,
    capacity: usize,
}

impl RollingStats {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Record one spectrum's statistics, evicting the oldest once over capacity
    pub fn push(&mut self, mean: f32, std_dev: f32) {
        self.entries.push_back((mean, std_dev));
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// Median of stored means and median of stored std-devs
    pub fn medians(&self) -> (f32, f32) {
        let mut means: Vec<f32> = self.entries.iter().map(|&(m, _)| m).collect();
        let mut devs: Vec<f32> = self.entries.iter().map(|&(_, s)| s).collect();
        (median(&mut means), median(&mut devs))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Thresholds computed for one spectrum
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub spectrum_mean: f32,
    pub spectrum_std_dev: f32,
    pub temporal_mean: f32,
    pub temporal_std_dev: f32,
    /// `spectrum_mean + k_spectrum * spectrum_std_dev`
    pub instantaneous: f32,
    /// `temporal_mean + k_temporal * temporal_std_dev`
    pub temporal: f32,
}

impl Thresholds {
    /// The decision threshold: the stricter of the two estimates
    pub fn effective(&self) -> f32 {
        self.instantaneous.max(self.temporal)
    }
}

/// Maintains rolling statistics and produces per-spectrum thresholds
#[derive(Debug, Clone)]
pub struct AdaptiveThresholdEstimator {
    history: RollingStats,
    spectrum_k: f32,
    temporal_k: f32,
}

impl AdaptiveThresholdEstimator {
    pub fn new(config: &DetectorConfig) -> Self {
        Self {
            history: RollingStats::new(config.stats_window()),
            spectrum_k: config.spectrum_threshold(),
            temporal_k: config.temporal_threshold(),
        }
    }

    /// Fold `spectrum` into the history and compute thresholds
    ///
    /// Returns `InsufficientHistory` until the rolling window is full. The
    /// spectrum's statistics are recorded either way.
    pub fn estimate(&mut self, spectrum: &Spectrum) -> Result<Thresholds> {
        let (spectrum_mean, spectrum_std_dev) = mean_and_std_dev(spectrum);
        self.history.push(spectrum_mean, spectrum_std_dev);

        if !self.history.is_full() {
            return Err(WhistleError::InsufficientHistory {
                have: self.history.len(),
                need: self.history.capacity(),
            });
        }

        let (temporal_mean, temporal_std_dev) = self.history.medians();

        Ok(Thresholds {
            spectrum_mean,
            spectrum_std_dev,
            temporal_mean,
            temporal_std_dev,
            instantaneous: spectrum_mean + self.spectrum_k * spectrum_std_dev,
            temporal: temporal_mean + self.temporal_k * temporal_std_dev,
        })
    }

    pub fn history(&self) -> &RollingStats {
        &self.history
    }

    pub fn is_warm(&self) -> bool {
        self.history.is_full()
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(level: f32) -> Spectrum {
        Spectrum::from_magnitudes(vec![level; 513])
    }

    fn config(stats_window: usize) -> DetectorConfig {
        DetectorConfig::builder().stats_window(stats_window).build().unwrap()
    }

    #[test]
    fn test_rolling_stats_evicts_oldest() {
        let mut stats = RollingStats::new(3);
        for i in 0..5 {
            stats.push(i as f32, 10.0 * i as f32);
        }
        assert_eq!(stats.len(), 3);
        // Holds (2,20), (3,30), (4,40)
        assert_eq!(stats.medians(), (3.0, 30.0));
    }

    #[test]
    fn test_warm_up_then_ready() {
        let mut estimator = AdaptiveThresholdEstimator::new(&config(5));
        for i in 1..5 {
            match estimator.estimate(&flat(1.0)) {
                Err(WhistleError::InsufficientHistory { have, need }) => {
                    assert_eq!(have, i);
                    assert_eq!(need, 5);
                }
                other => panic!("window {} should be warming up, got {:?}", i, other),
            }
        }
        for _ in 0..20 {
            let t = estimator.estimate(&flat(1.0)).unwrap();
            assert!(t.effective().is_finite());
            assert!(t.effective() >= 0.0);
        }
    }

    #[test]
    fn test_threshold_formulas() {
        let mut estimator = AdaptiveThresholdEstimator::new(&config(1));
        let spectrum = Spectrum::from_magnitudes(vec![1.0, 3.0, 1.0, 3.0]);
        let t = estimator.estimate(&spectrum).unwrap();

        assert!((t.spectrum_mean - 2.0).abs() < 1e-6);
        assert!((t.spectrum_std_dev - 1.0).abs() < 1e-6);
        // Single-entry history: medians equal this spectrum's stats
        assert!((t.instantaneous - (2.0 + 2.5)).abs() < 1e-5);
        assert!((t.temporal - (2.0 + 5.0)).abs() < 1e-5);
        assert_eq!(t.effective(), t.temporal);
    }

    #[test]
    fn test_temporal_median_damps_spike() {
        let mut estimator = AdaptiveThresholdEstimator::new(&config(5));
        for _ in 0..4 {
            let _ = estimator.estimate(&flat(1.0));
        }
        let mut loud = vec![1.0; 513];
        loud[100] = 5000.0;
        let t = estimator.estimate(&Spectrum::from_magnitudes(loud)).unwrap();

        // One loud spectrum among five moves the medians not at all
        assert_eq!(t.temporal_mean, 1.0);
        assert_eq!(t.temporal_std_dev, 0.0);
        assert!(t.instantaneous > t.temporal);
    }

    #[test]
    fn test_zero_spectrum_threshold_is_zero() {
        let mut estimator = AdaptiveThresholdEstimator::new(&config(2));
        let _ = estimator.estimate(&flat(0.0));
        let t = estimator.estimate(&flat(0.0)).unwrap();
        assert_eq!(t.effective(), 0.0);
    }
}
