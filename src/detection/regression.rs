// src/detection/regression.rs
//
// Replay labelled recordings (`whistle_yes/`, `whistle_no/`) and score the
// detector. Every file gets its own detector, so files run in parallel.

use std::path::{Path, PathBuf};

use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use rayon::prelude::*;
use walkdir::WalkDir;

use super::result::{Expectation, FileResult, RegressionSummary, Verdict};
use crate::config::DetectorConfig;
use crate::core::detect_in_wav;

/// Sorted `.wav` files directly inside `dir`
pub fn collect_wav_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .map(|e| e.eq_ignore_ascii_case("wav"))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    files
}

fn evaluate(path: &Path, expectation: Expectation, config: &DetectorConfig) -> FileResult {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    match detect_in_wav(path, config) {
        Ok(outcome) => FileResult {
            file_name,
            expectation,
            verdict: Verdict::classify(expectation, outcome.detected()),
            event: outcome.event,
            error: None,
        },
        Err(e) => {
            log::warn!("Could not analyse {}: {}", path.display(), e);
            FileResult {
                file_name,
                expectation,
                verdict: Verdict::Error,
                event: None,
                error: Some(e.to_string()),
            }
        }
    }
}

/// Run the detector over `root/whistle_yes` and `root/whistle_no`
///
/// Missing directories contribute no files. Results keep directory order
/// (yes before no) and file-name order within each.
pub fn run_regression(root: &Path, config: &DetectorConfig, show_progress: bool) -> RegressionSummary {
    let jobs: Vec<(PathBuf, Expectation)> = [Expectation::Whistle, Expectation::NoWhistle]
        .into_iter()
        .flat_map(|expectation| {
            let dir = root.join(expectation.dir_name());
            if !dir.is_dir() {
                log::warn!("Regression directory not found: {}", dir.display());
            }
            collect_wav_files(&dir)
                .into_iter()
                .map(move |path| (path, expectation))
        })
        .collect();

    log::info!("Running {} recordings from {}", jobs.len(), root.display());

    let progress = if show_progress {
        let pb = ProgressBar::new(jobs.len() as u64);
        if let Ok(style) = ProgressStyle::default_bar().template("{bar:40} {pos}/{len} {msg}") {
            pb.set_style(style);
        }
        pb
    } else {
        ProgressBar::hidden()
    };

    let results: Vec<FileResult> = jobs
        .par_iter()
        .progress_with(progress.clone())
        .map(|(path, expectation)| evaluate(path, *expectation, config))
        .collect();
    progress.finish_and_clear();

    RegressionSummary::from_results(results)
}
