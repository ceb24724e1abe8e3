// src/core/analysis/band.rs
//
// Narrows the whistle band by trimming background-dominated buckets from both
// edges, then tests the remaining band against the decision threshold.

use std::ops::Range;

use super::threshold::Thresholds;
use crate::config::DetectorConfig;
use crate::core::dsp::{mean, Spectrum};

/// Outcome of testing one spectrum's band
#[derive(Debug, Clone, PartialEq)]
pub struct BandDecision {
    /// Bins left after trimming; empty when every bucket looked like background
    pub band: Range<usize>,
    /// Mean magnitude over `band`, `None` when it is empty
    pub band_mean: Option<f32>,
    pub found: bool,
}

/// Stateless band trimmer and decision rule
#[derive(Debug, Clone)]
pub struct BandIsolator {
    begin: usize,
    end: usize,
    background_k: f32,
    buckets: usize,
}

impl BandIsolator {
    pub fn new(begin: usize, end: usize, background_k: f32, buckets: usize) -> Self {
        Self {
            begin,
            end,
            background_k,
            buckets,
        }
    }

    pub fn from_config(config: &DetectorConfig) -> Self {
        Self::new(
            config.spectrum_begin_bin(),
            config.spectrum_end_bin(),
            config.background_threshold(),
            config.band_buckets(),
        )
    }

    /// Bucket boundaries over the configured band
    ///
    /// Width is the floor of band width over bucket count; the last bucket
    /// absorbs the remainder. A band narrower than the bucket count gets one
    /// bucket per bin so no bucket is empty.
    pub fn buckets(&self) -> Vec<Range<usize>> {
        let width = self.end.saturating_sub(self.begin);
        if width == 0 {
            return Vec::new();
        }
        let count = self.buckets.min(width).max(1);
        let step = width / count;

        (0..count)
            .map(|i| {
                let start = self.begin + i * step;
                let end = if i + 1 == count { self.end } else { start + step };
                start..end
            })
            .collect()
    }

    /// Trim buckets whose mean is below `mean + k * std_dev` from each edge
    pub fn isolate(&self, spectrum: &Spectrum, spectrum_mean: f32, spectrum_std_dev: f32) -> Range<usize> {
        let background = spectrum_mean + self.background_k * spectrum_std_dev;
        let buckets = self.buckets();
        let bucket_mean = |r: &Range<usize>| mean(&spectrum[r.start.min(spectrum.len())..r.end.min(spectrum.len())]);

        let mut left = 0;
        while left < buckets.len() && bucket_mean(&buckets[left]) < background {
            left += 1;
        }

        let mut right = buckets.len();
        while right > left && bucket_mean(&buckets[right - 1]) < background {
            right -= 1;
        }

        if left >= right {
            // Collapse to an empty range at the point the edges met
            let at = buckets.get(left).map(|b| b.start).unwrap_or(self.end);
            return at..at;
        }
        buckets[left].start..buckets[right - 1].end
    }

    /// Trim the band and compare what remains against the effective threshold
    pub fn decide(&self, spectrum: &Spectrum, thresholds: &Thresholds) -> BandDecision {
        let band = self.isolate(spectrum, thresholds.spectrum_mean, thresholds.spectrum_std_dev);
        let clipped = band.start.min(spectrum.len())..band.end.min(spectrum.len());

        if clipped.is_empty() {
            return BandDecision {
                band,
                band_mean: None,
                found: false,
            };
        }

        let band_mean = mean(&spectrum[clipped]);
        BandDecision {
            band,
            band_mean: Some(band_mean),
            found: band_mean > thresholds.effective(),
        }
    }
}
