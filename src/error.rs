//! Error types for the whistle detection pipeline

use thiserror::Error;

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, WhistleError>;

/// Errors raised by the detector and its adapters
#[derive(Debug, Error)]
pub enum WhistleError {
    /// Invalid tuning parameter combination, rejected before any audio is processed
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A block shorter than the analysis window reached the spectral analyzer
    #[error("insufficient samples: expected {expected}, got {actual}")]
    InsufficientSamples { expected: usize, actual: usize },

    /// Rolling statistics are still warming up; no decision for this window
    #[error("insufficient history: {have} of {need} spectra collected")]
    InsufficientHistory { have: usize, need: usize },

    /// Capture buffer that cannot be interpreted as interleaved frames
    #[error("invalid audio chunk: {0}")]
    InvalidChunk(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl WhistleError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        WhistleError::Config(msg.into())
    }

    /// True for the warm-up condition, which callers treat as "no decision yet"
    pub fn is_warming_up(&self) -> bool {
        matches!(self, WhistleError::InsufficientHistory { .. })
    }
}
