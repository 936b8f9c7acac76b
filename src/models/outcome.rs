//! Run result models
//!
//! Per-case outcomes, per-suite summaries and the run verdict. Derived by the
//! engine and consumed by both reporters; never mutated once built.

use std::fmt;

use crate::failure::SourceLocation;

/// Result of executing a single case
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaseOutcome {
    pub name: String,
    pub passed: bool,
    pub included: bool,
    pub duration_ms: u64,
    pub message: Option<String>,
    pub location: Option<SourceLocation>,
}

impl CaseOutcome {
    pub fn pass(name: impl Into<String>, included: bool, duration_ms: u64) -> Self {
        Self {
            name: name.into(),
            passed: true,
            included,
            duration_ms,
            message: None,
            location: None,
        }
    }

    pub fn fail(
        name: impl Into<String>,
        included: bool,
        duration_ms: u64,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            passed: false,
            included,
            duration_ms,
            message: Some(message.into()),
            location: None,
        }
    }

    pub fn with_location(mut self, location: Option<SourceLocation>) -> Self {
        self.location = location;
        self
    }

    /// A failure that counts against the run
    pub fn is_blocking_failure(&self) -> bool {
        !self.passed && self.included
    }

    pub fn status_label(&self) -> &'static str {
        if self.passed {
            "PASS"
        } else {
            "FAIL"
        }
    }
}

impl fmt::Display for CaseOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} [{}ms]",
            self.status_label(),
            self.name,
            self.duration_ms
        )?;
        if !self.included {
            write!(f, " (ignored)")?;
        }
        if let Some(msg) = &self.message {
            write!(f, " - {msg}")?;
        }
        Ok(())
    }
}

/// Aggregated statistics of one suite
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SuiteSummary {
    pub name: String,
    pub count: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub ignored: usize,
    pub total_duration_ms: u64,
    pub outcomes: Vec<CaseOutcome>,
}

impl SuiteSummary {
    pub fn new(name: impl Into<String>, outcomes: Vec<CaseOutcome>) -> Self {
        let count = outcomes.len();
        let succeeded = outcomes.iter().filter(|o| o.passed).count();
        let ignored = outcomes.iter().filter(|o| !o.included).count();
        let total_duration_ms = outcomes.iter().map(|o| o.duration_ms).sum();

        Self {
            name: name.into(),
            count,
            succeeded,
            failed: count - succeeded,
            ignored,
            total_duration_ms,
            outcomes,
        }
    }

    pub fn pass_rate(&self) -> f64 {
        percent(self.succeeded, self.count)
    }

    pub fn ignore_rate(&self) -> f64 {
        percent(self.ignored, self.count)
    }

    /// Failed cases that count against the run
    pub fn blocking_failures(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.is_blocking_failure())
            .count()
    }

    /// Every non-ignored case passed
    pub fn is_success(&self) -> bool {
        self.blocking_failures() == 0
    }
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Pass/fail classification of a whole run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    /// Process exit status for this verdict
    pub fn code(self) -> u8 {
        match self {
            Verdict::Pass => 0,
            Verdict::Fail => 1,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => write!(f, "PASS"),
            Verdict::Fail => write!(f, "FAIL"),
        }
    }
}

/// Summaries of every suite of a completed run, in registration order
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunReport {
    pub suites: Vec<SuiteSummary>,
}

impl RunReport {
    pub fn new(suites: Vec<SuiteSummary>) -> Self {
        Self { suites }
    }

    pub fn case_count(&self) -> usize {
        self.suites.iter().map(|s| s.count).sum()
    }

    pub fn blocking_failures(&self) -> usize {
        self.suites.iter().map(SuiteSummary::blocking_failures).sum()
    }

    pub fn total_duration_ms(&self) -> u64 {
        self.suites.iter().map(|s| s.total_duration_ms).sum()
    }

    /// `Fail` if any included case failed
    pub fn verdict(&self) -> Verdict {
        if self.blocking_failures() > 0 {
            Verdict::Fail
        } else {
            Verdict::Pass
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suite_summary_counts() {
        let summary = SuiteSummary::new(
            "S",
            vec![
                CaseOutcome::pass("a", true, 3),
                CaseOutcome::fail("b", true, 4, "x"),
                CaseOutcome::fail("c", false, 5, "y"),
                CaseOutcome::pass("d", false, 0),
            ],
        );

        assert_eq!(summary.count, 4);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.ignored, 2);
        assert_eq!(summary.succeeded + summary.failed, summary.count);
        assert_eq!(summary.total_duration_ms, 12);
        assert_eq!(summary.blocking_failures(), 1);
        assert!(!summary.is_success());
        assert_eq!(summary.pass_rate(), 50.0);
    }

    #[test]
    fn test_ignored_failure_keeps_suite_successful() {
        let summary = SuiteSummary::new(
            "S",
            vec![
                CaseOutcome::pass("a", false, 1),
                CaseOutcome::fail("b", false, 1, "x"),
                CaseOutcome::pass("c", true, 1),
            ],
        );
        assert!(summary.is_success());
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.ignored, 2);
    }

    #[test]
    fn test_empty_suite_rates() {
        let summary = SuiteSummary::new("empty", Vec::new());
        assert_eq!(summary.pass_rate(), 0.0);
        assert_eq!(summary.ignore_rate(), 0.0);
        assert!(summary.is_success());
    }

    #[test]
    fn test_run_verdict() {
        let passing = RunReport::new(vec![SuiteSummary::new(
            "S",
            vec![CaseOutcome::fail("b", false, 1, "x")],
        )]);
        assert_eq!(passing.verdict(), Verdict::Pass);
        assert_eq!(passing.verdict().code(), 0);

        let failing = RunReport::new(vec![SuiteSummary::new(
            "S",
            vec![CaseOutcome::fail("b", true, 1, "x")],
        )]);
        assert_eq!(failing.verdict(), Verdict::Fail);
        assert_eq!(failing.verdict().code(), 1);

        assert_eq!(RunReport::default().verdict(), Verdict::Pass);
    }

    #[test]
    fn test_outcome_display() {
        let outcome = CaseOutcome::fail("b", false, 7, "x");
        assert_eq!(outcome.to_string(), "FAIL b [7ms] (ignored) - x");
    }
}
