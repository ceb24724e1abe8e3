// src/cli/mod.rs
//
// Command-line interface module

mod args;
mod output;

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::config::{DetectorConfig, DetectorSettings};
use crate::core::{
    default_whistle_dir, detect_in_wav, run_capture, whistle_heard, PcmSource, StreamRecorder,
    WhistleDetector, WhistleRecorder,
};
use crate::detection::run_regression;
use crate::testgen::{SignalSpec, ToneSpec};

pub use args::{Args, Command};
pub use output::{format_regression, format_replay};

/// Default `log` filter for a `-v` count; `RUST_LOG` takes precedence
pub fn log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Load and validate the detector configuration
pub fn load_config(path: Option<&PathBuf>) -> Result<DetectorConfig> {
    let settings = match path {
        Some(path) => DetectorSettings::from_json_file(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?,
        None => DetectorSettings::default(),
    };
    settings.validate().context("Rejected detector configuration")
}

/// Run a parsed command; returns the process exit code
pub fn run(args: Args) -> Result<i32> {
    let config = load_config(args.config.as_ref())?;

    match args.command {
        Command::Listen {
            channels,
            period,
            whistle_dir,
            keep,
            record_all,
            no_save,
        } => {
            let dir = whistle_dir.unwrap_or_else(default_whistle_dir);
            let mut detector = WhistleDetector::new(config.clone());
            let mut recorder = WhistleRecorder::new(&dir, channels, config.sample_rate())
                .keep_files(keep)
                .save(!no_save);
            let mut stream_out = match &record_all {
                Some(path) => Some(
                    StreamRecorder::create(path, channels, config.sample_rate())
                        .with_context(|| format!("Failed to create {}", path.display()))?,
                ),
                None => None,
            };

            log::info!(
                "Listening on stdin: {} Hz, {} ch, band {}-{} Hz, saving to {}",
                config.sample_rate(),
                channels,
                config.settings().whistle_begin_hz,
                config.settings().whistle_end_hz,
                dir.display()
            );

            let stdin = io::stdin();
            let mut source = PcmSource::new(stdin.lock(), channels, period);
            run_capture(&mut source, &mut detector, &mut recorder, stream_out.as_mut())
                .context("Capture loop failed")?;

            if let Some(out) = stream_out {
                out.finalize()?;
            }
            Ok(0)
        }

        Command::Replay { files, json } => {
            let mut outcomes = Vec::new();
            for path in &files {
                let outcome = detect_in_wav(path, &config)
                    .with_context(|| format!("Failed to replay {}", path.display()))?;
                if !json {
                    println!("{}", format_replay(path, &outcome));
                }
                outcomes.push(serde_json::json!({
                    "file": path.display().to_string(),
                    "detected": outcome.detected(),
                    "event": outcome.event,
                    "windows": outcome.windows,
                }));
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&outcomes)?);
            }
            Ok(0)
        }

        Command::Regress { root, json } => {
            let summary = run_regression(&root, &config, !json);
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print!("{}", format_regression(&summary));
            }
            Ok(if summary.all_passed() { 0 } else { 1 })
        }

        Command::Heard { seconds, whistle_dir } => {
            let dir = whistle_dir.unwrap_or_else(default_whistle_dir);
            let heard = whistle_heard(&dir, seconds)
                .with_context(|| format!("Failed to scan {}", dir.display()))?;
            println!("{}", if heard { "heard" } else { "not heard" });
            Ok(if heard { 0 } else { 1 })
        }

        Command::Generate {
            output,
            seconds,
            tone_hz,
            tone_start,
            amplitude,
            noise,
            seed,
        } => {
            let mut spec = SignalSpec::noise(config.sample_rate(), seconds, noise).with_seed(seed);
            if let Some(freq) = tone_hz {
                spec = spec.with_tone(ToneSpec::new(freq, amplitude).starting_at(tone_start));
            }
            spec.write_wav(&output)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("Wrote {}", output.display());
            Ok(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_filter() {
        assert_eq!(log_filter(0), "info");
        assert_eq!(log_filter(1), "debug");
        assert_eq!(log_filter(5), "trace");
    }

    #[test]
    fn test_default_config_loads() {
        let config = load_config(None).unwrap();
        assert_eq!(config, DetectorConfig::default());
    }
}
