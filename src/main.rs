// src/main.rs
use clap::Parser;
use std::process;

use whistlewatch::cli::{self, Args};

fn main() {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli::log_filter(args.verbose)))
        .init();

    match cli::run(args) {
        Ok(code) => process::exit(code),
        Err(e) => {
            log::error!("Error: {:#}", e);
            process::exit(2);
        }
    }
}
