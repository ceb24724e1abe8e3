//! whistlewatch - streaming whistle detection
//!
//! Consumes a continuous PCM stream, converts fixed-size windows to magnitude
//! spectra, and decides whether a sustained whistle tone is present using an
//! adaptive statistical test plus a debounced state machine.
//!
//! ## Pipeline
//!
//! raw samples → `WhistleDetector` (windowing) → `SpectralAnalyzer` →
//! `AdaptiveThresholdEstimator` → `BandIsolator` → `WhistleStateMachine` →
//! `WhistleSink`
//!
//! ## Module Structure
//!
//! - `core` - Detection pipeline, WAV replay, capture loop, whistle recorder
//! - `config` - Tuning parameters and validation
//! - `detection` - Event types and regression scoring
//! - `cli` - Command-line interface
//! - `testgen` - Synthetic noise/tone signals
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use whistlewatch::{DetectorConfig, EventLog, WhistleDetector};
//!
//! let mut detector = WhistleDetector::new(DetectorConfig::default());
//! let mut events = EventLog::new();
//!
//! // Interleaved 16-bit PCM as it arrives from the capture device
//! detector.process_chunk(&chunk, channels, Some(timestamp), &mut events)?;
//!
//! for event in &events.events {
//!     println!("{}", event);
//! }
//! ```
//!
//! ## Tuning
//!
//! | Parameter              | Default | Effect                                        |
//! |------------------------|---------|-----------------------------------------------|
//! | `whistle_begin_hz/end` | 2000/4000 | Band searched for whistle energy            |
//! | `spectrum_threshold`   | 2.5     | Std-devs above this spectrum's mean           |
//! | `temporal_threshold`   | 5.0     | Std-devs above the last second's medians      |
//! | `background_threshold` | 0.7     | Band-edge buckets below this are trimmed      |
//! | `okay_spectra`         | 12      | Detecting windows to confirm (~256 ms)        |
//! | `miss_spectra`         | 4       | Dropouts tolerated before a streak ends       |

pub mod cli;
pub mod config;
pub mod core;
pub mod detection;
pub mod error;
pub mod testgen;

pub use config::{ConfigBuilder, DetectorConfig, DetectorSettings, RemainderPolicy};
pub use self::core::{
    EventLog, LogSink, SpectralAnalyzer, Spectrum, WhistleDetector, WhistleRecorder, WhistleSink,
};
pub use detection::{Timestamp, WhistleEvent};
pub use error::{Result, WhistleError};
