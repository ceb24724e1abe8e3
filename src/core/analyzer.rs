// src/core/analyzer.rs
//
// Stream driver: slices incoming PCM into analysis windows and runs each
// through spectrum -> thresholds -> band decision -> state machine, in order.

use std::time::Duration;

use super::analysis::{AdaptiveThresholdEstimator, BandDecision, BandIsolator, Thresholds};
use super::detector::{Phase, Transition, WhistleStateMachine};
use super::dsp::{pcm_to_f32, SpectralAnalyzer};
use super::sink::WhistleSink;
use crate::config::{DetectorConfig, RemainderPolicy};
use crate::detection::{Timestamp, WhistleEvent};
use crate::error::{Result, WhistleError};

/// Everything computed for one analysis window
#[derive(Debug, Clone, PartialEq)]
pub struct WindowOutcome {
    pub window_index: u64,
    /// `None` while the rolling statistics are warming up
    pub thresholds: Option<Thresholds>,
    pub decision: Option<BandDecision>,
    pub transition: Option<Transition>,
}

/// Summary of one `process_chunk` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkReport {
    /// Full windows analysed from this chunk
    pub windows: usize,
    pub detected: usize,
    pub ended: usize,
    /// Samples buffered for the next chunk
    pub carried: usize,
    /// Samples discarded at the chunk boundary
    pub dropped: usize,
}

/// One independent whistle detector bound to a single audio stream
///
/// Owns its rolling statistics and debounce state; instances share nothing.
pub struct WhistleDetector {
    config: DetectorConfig,
    analyzer: SpectralAnalyzer,
    estimator: AdaptiveThresholdEstimator,
    isolator: BandIsolator,
    machine: WhistleStateMachine,
    pending: Vec<f32>,
    windows_processed: u64,
}

impl WhistleDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            analyzer: SpectralAnalyzer::new(config.window_size()),
            estimator: AdaptiveThresholdEstimator::new(&config),
            isolator: BandIsolator::from_config(&config),
            machine: WhistleStateMachine::from_config(&config),
            pending: Vec::with_capacity(config.window_size() * 2),
            windows_processed: 0,
            config,
        }
    }

    /// Feed a chunk of interleaved 16-bit PCM
    ///
    /// Only the first channel is analysed. A trailing partial frame is ignored.
    pub fn process_chunk<S>(
        &mut self,
        samples: &[i16],
        channels: usize,
        timestamp: Option<Timestamp>,
        sink: &mut S,
    ) -> Result<ChunkReport>
    where
        S: WhistleSink + ?Sized,
    {
        if channels == 0 {
            return Err(WhistleError::InvalidChunk("channel count is zero".to_string()));
        }
        let first_channel = samples.chunks_exact(channels).map(|frame| pcm_to_f32(frame[0]));
        self.feed(first_channel, timestamp, sink)
    }

    /// Feed already-deinterleaved float samples of the analysed channel
    pub fn process_mono<S>(
        &mut self,
        samples: &[f32],
        timestamp: Option<Timestamp>,
        sink: &mut S,
    ) -> Result<ChunkReport>
    where
        S: WhistleSink + ?Sized,
    {
        self.feed(samples.iter().copied(), timestamp, sink)
    }

    fn feed<I, S>(&mut self, channel: I, timestamp: Option<Timestamp>, sink: &mut S) -> Result<ChunkReport>
    where
        I: Iterator<Item = f32>,
        S: WhistleSink + ?Sized,
    {
        let window_size = self.config.window_size();
        let mut report = ChunkReport::default();

        let mut pending = std::mem::take(&mut self.pending);
        pending.extend(channel);

        let mut consumed = 0;
        let mut result = Ok(());
        while pending.len() - consumed >= window_size {
            let window = &pending[consumed..consumed + window_size];
            consumed += window_size;
            report.windows += 1;

            match self.analyse_window(window, timestamp, sink) {
                Ok(Some(Transition::Detected)) => report.detected += 1,
                Ok(Some(Transition::Ended)) => report.ended += 1,
                Ok(None) => {}
                Err(e) => {
                    result = Err(e);
                    break;
                }
            }
        }

        match self.config.remainder() {
            RemainderPolicy::Carry => {
                pending.drain(..consumed);
                report.carried = pending.len();
            }
            RemainderPolicy::Truncate => {
                report.dropped = pending.len() - consumed;
                if report.dropped > 0 {
                    log::trace!("Dropping {} samples at chunk boundary", report.dropped);
                }
                pending.clear();
            }
        }
        self.pending = pending;

        result.map(|_| report)
    }

    fn analyse_window<S>(
        &mut self,
        window: &[f32],
        timestamp: Option<Timestamp>,
        sink: &mut S,
    ) -> Result<Option<Transition>>
    where
        S: WhistleSink + ?Sized,
    {
        let outcome = self.process_window(window)?;

        match outcome.transition {
            Some(Transition::Detected) => {
                let event = WhistleEvent {
                    timestamp,
                    window_index: outcome.window_index,
                    stream_offset: self.offset_after(outcome.window_index),
                };
                log::info!("Whistle detected: {}", event);
                sink.whistle_detected(&event)?;
            }
            Some(Transition::Ended) => {
                log::info!(
                    "Whistle ended at {:.3}s",
                    self.offset_after(outcome.window_index).as_secs_f64()
                );
                sink.whistle_ended(timestamp)?;
            }
            None => {}
        }

        Ok(outcome.transition)
    }

    /// Run one full window through the pipeline without reporting to a sink
    pub fn process_window(&mut self, window: &[f32]) -> Result<WindowOutcome> {
        let spectrum = self.analyzer.magnitude_spectrum(window)?;
        let window_index = self.windows_processed;
        self.windows_processed += 1;

        let thresholds = match self.estimator.estimate(&spectrum) {
            Ok(t) => t,
            Err(e) if e.is_warming_up() => {
                return Ok(WindowOutcome {
                    window_index,
                    thresholds: None,
                    decision: None,
                    transition: None,
                });
            }
            Err(e) => return Err(e),
        };

        if window_index + 1 == self.config.stats_window() as u64 {
            log::debug!(
                "Rolling statistics warm after {} windows ({:.2}s)",
                window_index + 1,
                self.offset_after(window_index).as_secs_f64()
            );
        }

        let decision = self.isolator.decide(&spectrum, &thresholds);
        log::trace!(
            "window {}: band {:?} mean {:?} threshold {:.4} found {}",
            window_index,
            decision.band,
            decision.band_mean,
            thresholds.effective(),
            decision.found
        );
        let transition = self.machine.step(decision.found);

        Ok(WindowOutcome {
            window_index,
            thresholds: Some(thresholds),
            decision: Some(decision),
            transition,
        })
    }

    fn offset_after(&self, window_index: u64) -> Duration {
        let samples = (window_index + 1) * self.config.window_size() as u64;
        Duration::from_secs_f64(samples as f64 / self.config.sample_rate() as f64)
    }

    /// Clear all history and state, as if newly constructed
    pub fn reset(&mut self) {
        self.estimator.reset();
        self.machine.reset();
        self.pending.clear();
        self.windows_processed = 0;
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// True while a confirmed whistle has not yet ended
    pub fn whistle_active(&self) -> bool {
        self.machine.phase() == Phase::Confirmed
    }

    pub fn phase(&self) -> Phase {
        self.machine.phase()
    }

    pub fn is_warm(&self) -> bool {
        self.estimator.is_warm()
    }

    pub fn windows_processed(&self) -> u64 {
        self.windows_processed
    }

    /// Samples waiting for the next chunk to complete a window
    pub fn pending_samples(&self) -> usize {
        self.pending.len()
    }
}
