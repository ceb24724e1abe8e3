//! CLI argument definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand};

fn parse_nonzero(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

#[derive(Parser, Debug)]
#[command(name = "whistlewatch")]
#[command(version, about = "Listen for referee whistles in a PCM audio stream")]
pub struct Args {
    /// JSON file with detector settings (missing keys keep defaults)
    #[arg(short, long, global = true, env = "WHISTLEWATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Read raw s16le PCM from stdin and save whistles as they are heard
    Listen {
        /// Interleaved channels in the input stream
        #[arg(long, default_value_t = 1, value_parser = parse_nonzero)]
        channels: usize,

        /// Frames per read
        #[arg(long, default_value_t = 1024, value_parser = parse_nonzero)]
        period: usize,

        /// Where whistle recordings are written
        #[arg(long, env = "WHISTLEWATCH_DIR")]
        whistle_dir: Option<PathBuf>,

        /// Maximum whistle files kept (0 = unlimited)
        #[arg(long, default_value_t = 20)]
        keep: usize,

        /// Also append all captured audio to this WAV file
        #[arg(long)]
        record_all: Option<PathBuf>,

        /// Detect and log only, never write whistle files
        #[arg(long)]
        no_save: bool,
    },

    /// Replay WAV files and report the first whistle in each
    Replay {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Score the detector against ROOT/whistle_yes and ROOT/whistle_no
    Regress {
        root: PathBuf,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Exit 0 if a whistle was saved within the last N seconds, 1 otherwise
    Heard {
        #[arg(long, default_value_t = 3.0)]
        seconds: f64,

        #[arg(long, env = "WHISTLEWATCH_DIR")]
        whistle_dir: Option<PathBuf>,
    },

    /// Write a synthetic noise (+ optional tone) WAV for testing
    Generate {
        output: PathBuf,

        #[arg(long, default_value_t = 3.0)]
        seconds: f64,

        /// Tone frequency in Hz; omit for noise only
        #[arg(long)]
        tone_hz: Option<f64>,

        /// When the tone starts, in seconds
        #[arg(long, default_value_t = 1.0)]
        tone_start: f64,

        /// Tone peak amplitude in 16-bit units
        #[arg(long, default_value_t = 10_000.0)]
        amplitude: f64,

        /// Noise standard deviation in 16-bit units
        #[arg(long, default_value_t = 1000.0)]
        noise: f64,

        #[arg(long, default_value_t = 0x5eed)]
        seed: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_listen_defaults() {
        let args = Args::try_parse_from(["whistlewatch", "-vv", "listen", "--no-save"]).unwrap();
        assert_eq!(args.verbose, 2);
        match args.command {
            Command::Listen { channels, period, keep, no_save, .. } => {
                assert_eq!(channels, 1);
                assert_eq!(period, 1024);
                assert_eq!(keep, 20);
                assert!(no_save);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_listen_rejects_zero_channels_or_period() {
        assert!(Args::try_parse_from(["whistlewatch", "listen", "--channels", "0"]).is_err());
        assert!(Args::try_parse_from(["whistlewatch", "listen", "--period", "0"]).is_err());
        let args = Args::try_parse_from(["whistlewatch", "listen", "--channels", "2"]).unwrap();
        assert!(matches!(args.command, Command::Listen { channels: 2, .. }));
    }

    #[test]
    fn test_replay_requires_files() {
        assert!(Args::try_parse_from(["whistlewatch", "replay"]).is_err());
    }
}
