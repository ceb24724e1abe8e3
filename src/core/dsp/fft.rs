//! Real-input FFT producing magnitude spectra

use std::ops::Deref;
use std::sync::Arc;

use num_complex::Complex;
use realfft::{RealFftPlanner, RealToComplex};

use crate::error::{Result, WhistleError};

/// Magnitude spectrum of one analysis window, `window_size / 2 + 1` bins
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    magnitudes: Vec<f32>,
}

impl Spectrum {
    pub fn from_magnitudes(magnitudes: Vec<f32>) -> Self {
        Self { magnitudes }
    }

    pub fn magnitudes(&self) -> &[f32] {
        &self.magnitudes
    }

    /// Index of the bin with the largest magnitude
    pub fn peak_bin(&self) -> Option<usize> {
        self.magnitudes
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(i, _)| i)
    }
}

impl Deref for Spectrum {
    type Target = [f32];

    fn deref(&self) -> &[f32] {
        &self.magnitudes
    }
}

/// Converts fixed-length sample blocks into magnitude spectra
///
/// No window function is applied: the detector's thresholds were tuned
/// against the plain rectangular-window transform.
pub struct SpectralAnalyzer {
    fft: Arc<dyn RealToComplex<f32>>,
    input: Vec<f32>,
    output: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    window_size: usize,
}

impl SpectralAnalyzer {
    pub fn new(window_size: usize) -> Self {
        let mut planner = RealFftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(window_size);
        let input = fft.make_input_vec();
        let output = fft.make_output_vec();
        let scratch = fft.make_scratch_vec();

        Self {
            fft,
            input,
            output,
            scratch,
            window_size,
        }
    }

    /// Compute magnitude spectrum for one window
    ///
    /// Uses the first `window_size` samples; shorter input is rejected.
    pub fn magnitude_spectrum(&mut self, samples: &[f32]) -> Result<Spectrum> {
        if samples.len() < self.window_size {
            return Err(WhistleError::InsufficientSamples {
                expected: self.window_size,
                actual: samples.len(),
            });
        }

        // process() clobbers its input, so work on a copy
        self.input.copy_from_slice(&samples[..self.window_size]);
        self.fft
            .process_with_scratch(&mut self.input, &mut self.output, &mut self.scratch)
            .map_err(|e| WhistleError::InvalidChunk(format!("FFT failed: {}", e)))?;

        Ok(Spectrum::from_magnitudes(
            self.output.iter().map(|c| c.norm()).collect(),
        ))
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Number of bins in every spectrum this analyzer produces
    pub fn bins(&self) -> usize {
        self.window_size / 2 + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustfft::FftPlanner;
    use std::f32::consts::PI;

    fn sine(freq: f32, sample_rate: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * PI * freq * i as f32 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn test_zero_window_gives_zero_spectrum() {
        let mut analyzer = SpectralAnalyzer::new(1024);
        let spectrum = analyzer.magnitude_spectrum(&[0.0; 1024]).unwrap();
        assert_eq!(spectrum.len(), 513);
        assert!(spectrum.iter().all(|&m| m == 0.0));
    }

    #[test]
    fn test_sinusoid_peaks_at_expected_bin() {
        let mut analyzer = SpectralAnalyzer::new(1024);
        for &freq in &[440.0f32, 3000.0, 3210.0, 11025.0] {
            let spectrum = analyzer.magnitude_spectrum(&sine(freq, 48000.0, 1024)).unwrap();
            let expected = (freq * 1024.0 / 48000.0).round() as i64;
            let peak = spectrum.peak_bin().unwrap() as i64;
            assert!(
                (peak - expected).abs() <= 1,
                "{} Hz peaked at bin {}, expected ~{}",
                freq,
                peak,
                expected
            );
        }
    }

    #[test]
    fn test_short_block_rejected() {
        let mut analyzer = SpectralAnalyzer::new(256);
        match analyzer.magnitude_spectrum(&[0.0; 100]) {
            Err(WhistleError::InsufficientSamples { expected, actual }) => {
                assert_eq!(expected, 256);
                assert_eq!(actual, 100);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_matches_complex_fft() {
        let samples: Vec<f32> = (0..64).map(|i| ((i * 7919) % 97) as f32 / 97.0 - 0.5).collect();

        let mut analyzer = SpectralAnalyzer::new(64);
        let spectrum = analyzer.magnitude_spectrum(&samples).unwrap();

        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(64);
        let mut buffer: Vec<Complex<f32>> = samples.iter().map(|&s| Complex::new(s, 0.0)).collect();
        fft.process(&mut buffer);

        assert_eq!(spectrum.len(), 33);
        for (bin, c) in buffer[..33].iter().enumerate() {
            assert!((spectrum[bin] - c.norm()).abs() < 1e-3, "bin {} differs", bin);
        }
    }

    #[test]
    fn test_longer_input_uses_first_window() {
        let mut analyzer = SpectralAnalyzer::new(128);
        let mut samples = sine(3000.0, 48000.0, 128);
        samples.extend(std::iter::repeat(1.0).take(50));
        let a = analyzer.magnitude_spectrum(&samples).unwrap();
        let b = analyzer.magnitude_spectrum(&samples[..128]).unwrap();
        assert_eq!(a, b);
    }
}
