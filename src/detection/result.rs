//! Regression result types for labelled whistle recordings

use serde::Serialize;

use super::event::WhistleEvent;

/// Label a recording carries by virtue of the directory it sits in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Expectation {
    Whistle,
    NoWhistle,
}

impl Expectation {
    pub fn dir_name(&self) -> &'static str {
        match self {
            Expectation::Whistle => "whistle_yes",
            Expectation::NoWhistle => "whistle_no",
        }
    }
}

/// Outcome of one recording against its label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Ok,
    FalseNegative,
    FalsePositive,
    /// The file could not be decoded
    Error,
}

impl Verdict {
    pub fn classify(expectation: Expectation, detected: bool) -> Self {
        match (expectation, detected) {
            (Expectation::Whistle, true) | (Expectation::NoWhistle, false) => Verdict::Ok,
            (Expectation::Whistle, false) => Verdict::FalseNegative,
            (Expectation::NoWhistle, true) => Verdict::FalsePositive,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Ok => "OK",
            Verdict::FalseNegative => "FALSE NEGATIVE",
            Verdict::FalsePositive => "FALSE POSITIVE",
            Verdict::Error => "ERROR",
        }
    }
}

/// One analysed recording
#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    pub file_name: String,
    pub expectation: Expectation,
    pub verdict: Verdict,
    pub event: Option<WhistleEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregate over a whole regression run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RegressionSummary {
    pub results: Vec<FileResult>,
    pub success: usize,
    pub false_negatives: usize,
    pub false_positives: usize,
    pub errors: usize,
}

impl RegressionSummary {
    pub fn from_results(results: Vec<FileResult>) -> Self {
        let count = |v: Verdict| results.iter().filter(|r| r.verdict == v).count();
        Self {
            success: count(Verdict::Ok),
            false_negatives: count(Verdict::FalseNegative),
            false_positives: count(Verdict::FalsePositive),
            errors: count(Verdict::Error),
            results,
        }
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn all_passed(&self) -> bool {
        self.success == self.total()
    }

    /// `run=N, success=N, ...` with zero counts omitted
    pub fn headline(&self) -> String {
        let mut parts = vec![format!("run={}", self.total())];
        if self.success > 0 {
            parts.push(format!("success={}", self.success));
        }
        if self.false_negatives > 0 {
            parts.push(format!("false negatives={}", self.false_negatives));
        }
        if self.false_positives > 0 {
            parts.push(format!("false positives={}", self.false_positives));
        }
        if self.errors > 0 {
            parts.push(format!("errors={}", self.errors));
        }
        parts.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(expectation: Expectation, detected: bool) -> FileResult {
        FileResult {
            file_name: "x.wav".to_string(),
            expectation,
            verdict: Verdict::classify(expectation, detected),
            event: None,
            error: None,
        }
    }

    #[test]
    fn test_classify() {
        assert_eq!(Verdict::classify(Expectation::Whistle, true), Verdict::Ok);
        assert_eq!(Verdict::classify(Expectation::NoWhistle, false), Verdict::Ok);
        assert_eq!(Verdict::classify(Expectation::Whistle, false), Verdict::FalseNegative);
        assert_eq!(Verdict::classify(Expectation::NoWhistle, true), Verdict::FalsePositive);
    }

    #[test]
    fn test_summary_headline() {
        let summary = RegressionSummary::from_results(vec![
            result(Expectation::Whistle, true),
            result(Expectation::Whistle, false),
            result(Expectation::NoWhistle, false),
        ]);
        assert_eq!(summary.total(), 3);
        assert!(!summary.all_passed());
        assert_eq!(summary.headline(), "run=3, success=2, false negatives=1");
    }
}
