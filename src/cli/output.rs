//! Output formatting for CLI results

use std::path::Path;

use colorful::Colorful;

use crate::core::ReplayOutcome;
use crate::detection::{RegressionSummary, Verdict};

/// One line per replayed file
pub fn format_replay(path: &Path, outcome: &ReplayOutcome) -> String {
    match &outcome.event {
        Some(event) => format!(
            "{} {} ({:.3}s into {:.2}s)",
            "WHISTLE".green(),
            path.display(),
            event.stream_offset.as_secs_f64(),
            outcome.duration_secs
        ),
        None => format!(
            "{} {} ({} windows, {:.2}s)",
            "none   ".dim(),
            path.display(),
            outcome.windows,
            outcome.duration_secs
        ),
    }
}

/// Per-file verdict lines followed by a coloured summary banner
pub fn format_regression(summary: &RegressionSummary) -> String {
    let mut output = String::new();
    let mut last_expectation = None;

    for result in &summary.results {
        if last_expectation.is_some() && last_expectation != Some(result.expectation) {
            output.push_str(&format!("{}\n", "-".repeat(80)));
        }
        last_expectation = Some(result.expectation);

        let line = format!("{}: {}", result.verdict.label(), result.file_name);
        let line = match result.verdict {
            Verdict::Ok => line.green().to_string(),
            Verdict::FalseNegative | Verdict::FalsePositive => line.red().to_string(),
            Verdict::Error => line.yellow().to_string(),
        };
        output.push_str(&line);
        if let Some(err) = &result.error {
            output.push_str(&format!(" ({})", err));
        }
        output.push('\n');
    }

    let banner = "-".repeat(80);
    let headline = format!("TEST RESULTS: {}", summary.headline());
    let block = format!("{}\n{}\n{}", banner, headline, banner);
    let block = if summary.total() == 0 {
        block.yellow().to_string()
    } else if summary.all_passed() {
        block.green().to_string()
    } else {
        block.red().to_string()
    };
    output.push_str(&block);
    output.push('\n');
    output
}
