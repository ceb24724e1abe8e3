//! Digital Signal Processing utilities

pub mod fft;
pub mod stats;

pub use fft::{SpectralAnalyzer, Spectrum};
pub use stats::{mean, mean_and_std_dev, median, std_dev};

/// Convert a signed 16-bit PCM sample to the [-1.0, 1.0) float range
#[inline]
pub fn pcm_to_f32(sample: i16) -> f32 {
    sample as f32 / 32768.0
}

/// Bin index for a frequency, truncating toward DC
pub fn frequency_to_bin(hz: u32, window_size: usize, sample_rate: u32) -> usize {
    (hz as u64 * window_size as u64 / sample_rate as u64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_to_bin() {
        assert_eq!(frequency_to_bin(2000, 1024, 48000), 42);
        assert_eq!(frequency_to_bin(4000, 1024, 48000), 85);
        assert_eq!(frequency_to_bin(24000, 1024, 48000), 512);
        assert_eq!(frequency_to_bin(0, 1024, 48000), 0);
    }

    #[test]
    fn test_pcm_to_f32_range() {
        assert_eq!(pcm_to_f32(i16::MIN), -1.0);
        assert!(pcm_to_f32(i16::MAX) < 1.0);
        assert_eq!(pcm_to_f32(0), 0.0);
    }
}
