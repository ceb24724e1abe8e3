//! Core detection pipeline and its I/O adapters

pub mod analysis;
pub mod analyzer;
pub mod capture;
pub mod decoder;
pub mod detector;
pub mod dsp;
pub mod recorder;
pub mod sink;

pub use analysis::{AdaptiveThresholdEstimator, BandDecision, BandIsolator, RollingStats, Thresholds};
pub use analyzer::{ChunkReport, WhistleDetector, WindowOutcome};
pub use capture::{run_capture, CaptureStats, PcmSource};
pub use decoder::{detect_in_audio, detect_in_wav, read_wav, PcmAudio, ReplayOutcome};
pub use detector::{DetectorState, Phase, Transition, WhistleStateMachine};
pub use dsp::{SpectralAnalyzer, Spectrum};
pub use recorder::{
    default_whistle_dir, whistle_heard, whistle_heard_at, write_pcm_wav, AudioHistory,
    StreamRecorder, WhistleRecorder, WHISTLE_FILE_FORMAT,
};
pub use sink::{EventLog, LogSink, WhistleSink};
