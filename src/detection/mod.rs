//! Detection events and regression scoring

mod event;
mod regression;
mod result;

pub use event::{Timestamp, WhistleEvent};
pub use regression::{collect_wav_files, run_regression};
pub use result::{Expectation, FileResult, RegressionSummary, Verdict};
