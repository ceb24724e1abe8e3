//! Configuration module for whistlewatch

mod settings;

pub use settings::{ConfigBuilder, DetectorConfig, DetectorSettings, RemainderPolicy};
