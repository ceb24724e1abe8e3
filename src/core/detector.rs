// src/core/detector.rs
//
// Debounce per-spectrum detections into whistle start/end transitions.

use crate::config::DetectorConfig;

/// Coarse state of the whistle state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Accumulating,
    Confirmed,
}

/// Transition reported by a single step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Enough detecting spectra were seen: report a whistle
    Detected,
    /// A confirmed whistle stopped
    Ended,
}

/// Streak counters plus the confirmed flag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DetectorState {
    pub match_streak: u32,
    pub miss_streak: u32,
    pub confirmed: bool,
}

impl DetectorState {
    pub fn phase(&self) -> Phase {
        if self.confirmed {
            Phase::Confirmed
        } else if self.match_streak > 0 {
            Phase::Accumulating
        } else {
            Phase::Idle
        }
    }
}

/// Turns the per-window `found` flag into debounced whistle transitions
#[derive(Debug, Clone)]
pub struct WhistleStateMachine {
    state: DetectorState,
    okay_spectra: u32,
    miss_spectra: u32,
}

impl WhistleStateMachine {
    pub fn new(okay_spectra: u32, miss_spectra: u32) -> Self {
        Self {
            state: DetectorState::default(),
            okay_spectra,
            miss_spectra,
        }
    }

    pub fn from_config(config: &DetectorConfig) -> Self {
        Self::new(config.okay_spectra(), config.miss_spectra())
    }

    /// Advance by one processed window
    pub fn step(&mut self, found: bool) -> Option<Transition> {
        let state = &mut self.state;

        if state.confirmed {
            if found {
                state.miss_streak = 0;
            } else {
                state.miss_streak += 1;
                if state.miss_streak > self.miss_spectra {
                    self.reset();
                    return Some(Transition::Ended);
                }
            }
            return None;
        }

        if found {
            state.match_streak += 1;
            state.miss_streak = 0;
        } else if state.match_streak > 0 {
            state.miss_streak += 1;
            if state.miss_streak > self.miss_spectra {
                // Unconfirmed streak abandoned
                self.reset();
                return None;
            }
        }

        if state.match_streak >= self.okay_spectra {
            self.state = DetectorState {
                match_streak: 0,
                miss_streak: 0,
                confirmed: true,
            };
            return Some(Transition::Detected);
        }
        None
    }

    pub fn reset(&mut self) {
        self.state = DetectorState::default();
    }

    pub fn state(&self) -> DetectorState {
        self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }
}
