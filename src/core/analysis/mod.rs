//! Per-spectrum detection stages
//!
//! - Adaptive thresholds (instantaneous + rolling median)
//! - Band isolation (background edge trimming and the banded decision)

mod band;
mod threshold;

pub use band::{BandDecision, BandIsolator};
pub use threshold::{AdaptiveThresholdEstimator, RollingStats, Thresholds};
