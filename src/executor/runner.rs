//! Suite execution engine
//!
//! Runs every registered case one at a time, in registration order, and folds
//! the outcomes into suite summaries.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::failure::Failure;
use crate::models::{CaseOutcome, RunReport, SuiteSummary};
use crate::registry::{Registry, Suite, TestCase};
use crate::utils::{whole_millis, Timer};

/// A case raised something other than a [`Failure`]; the run stops here
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum UncaughtError {
    #[error("uncaught error in `{suite}` / `{case}`: {message}")]
    Error {
        suite: String,
        case: String,
        message: String,
    },

    #[error("panic in `{suite}` / `{case}`: {message}")]
    Panic {
        suite: String,
        case: String,
        message: String,
    },
}

/// Observer notified as the run progresses.
///
/// Every hook defaults to doing nothing.
pub trait RunListener {
    fn suite_started(&mut self, _suite: &Suite) {}

    /// `index` is 1-based
    fn case_started(&mut self, _index: usize, _count: usize, _case: &TestCase) {}

    fn case_finished(&mut self, _outcome: &CaseOutcome) {}

    fn suite_finished(&mut self, _summary: &SuiteSummary) {}

    fn run_finished(&mut self, _report: &RunReport) {}
}

/// Listener that ignores every event
impl RunListener for () {}

/// Sequential executor over a [`Registry`]
pub struct Engine<'a> {
    listener: &'a mut dyn RunListener,
}

impl<'a> Engine<'a> {
    pub fn new(listener: &'a mut dyn RunListener) -> Self {
        Self { listener }
    }

    /// Run all suites, stopping at the first uncaught error
    pub fn run(&mut self, registry: &Registry) -> Result<RunReport, UncaughtError> {
        info!(
            "Starting run: {} suites, {} cases",
            registry.suite_count(),
            registry.case_count()
        );

        let mut suites = Vec::new();
        for suite in registry.suites() {
            suites.push(self.run_suite(suite)?);
        }

        let report = RunReport::new(suites);
        info!(
            "Run completed in {}ms - {} ({} blocking failures)",
            report.total_duration_ms(),
            report.verdict(),
            report.blocking_failures()
        );

        self.listener.run_finished(&report);
        Ok(report)
    }

    /// Run every case of one suite
    pub fn run_suite(&mut self, suite: &Suite) -> Result<SuiteSummary, UncaughtError> {
        self.listener.suite_started(suite);

        let count = suite.len();
        let mut outcomes = Vec::with_capacity(count);

        for (index, case) in suite.cases().iter().enumerate() {
            self.listener.case_started(index + 1, count, case);
            let outcome = run_case(suite.name(), case)?;
            self.listener.case_finished(&outcome);
            outcomes.push(outcome);
        }

        let summary = SuiteSummary::new(suite.name(), outcomes);
        info!(
            "Suite {} completed: {}/{} passed, {} ignored",
            summary.name, summary.succeeded, summary.count, summary.ignored
        );

        self.listener.suite_finished(&summary);
        Ok(summary)
    }
}

/// Execute one case body, timing it and classifying the result.
///
/// Ignored cases run like any other; only the verdict treats them differently.
pub fn run_case(suite: &str, case: &TestCase) -> Result<CaseOutcome, UncaughtError> {
    debug!("Running {} / {}", suite, case.name());

    let timer = Timer::start(case.name());
    let result = panic::catch_unwind(AssertUnwindSafe(|| (case.body())()));
    let elapsed = timer.stop();
    let duration_ms = whole_millis(elapsed);

    let mut outcome = match result {
        Ok(Ok(())) => CaseOutcome::pass(case.name(), case.is_included(), duration_ms),
        Ok(Err(err)) => match err.downcast_ref::<Failure>() {
            Some(failure) => {
                CaseOutcome::fail(case.name(), case.is_included(), duration_ms, failure.message())
                    .with_location(failure.location().cloned())
            }
            None => {
                let uncaught = UncaughtError::Error {
                    suite: suite.to_string(),
                    case: case.name().to_string(),
                    message: format!("{err:#}"),
                };
                error!("{}", uncaught);
                return Err(uncaught);
            }
        },
        Err(payload) => {
            let uncaught = UncaughtError::Panic {
                suite: suite.to_string(),
                case: case.name().to_string(),
                message: panic_message(&*payload),
            };
            error!("{}", uncaught);
            return Err(uncaught);
        }
    };

    if let Some(budget_ms) = case.duration_budget_ms() {
        if elapsed > Duration::from_millis(budget_ms) {
            let note = format!("exceeded duration budget of {budget_ms} ms (took {elapsed:.1?})");
            warn!("{} / {}: {}", suite, case.name(), note);

            outcome.passed = false;
            outcome.message = Some(match outcome.message.take() {
                Some(message) => format!("{message}; {note}"),
                None => note,
            });
        }
    }

    debug!("  {}", outcome);
    Ok(outcome)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert::{assert_equal, assert_throws};
    use crate::failure::Failure;
    use std::thread::sleep;
    use std::time::Instant;
    use thiserror::Error;

    #[derive(Debug, Error)]
    #[error("defect")]
    struct Defect;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl RunListener for Recorder {
        fn suite_started(&mut self, suite: &Suite) {
            self.events.push(format!("suite {}", suite.name()));
        }

        fn case_started(&mut self, index: usize, count: usize, case: &TestCase) {
            self.events
                .push(format!("start {}/{} {}", index, count, case.name()));
        }

        fn case_finished(&mut self, outcome: &CaseOutcome) {
            self.events
                .push(format!("{} {}", outcome.status_label(), outcome.name));
        }

        fn suite_finished(&mut self, summary: &SuiteSummary) {
            self.events.push(format!("summary {}", summary.name));
        }

        fn run_finished(&mut self, _report: &RunReport) {
            self.events.push("done".to_string());
        }
    }

    fn pass() -> Result<(), Failure> {
        Ok(())
    }

    #[test]
    fn test_run_counts_and_verdict() {
        let mut registry = Registry::new();
        registry.add_test("S", "a", pass);
        registry.add_test("S", "b", || assert_equal(1, 2, "x"));

        let report = Engine::new(&mut ()).run(&registry).unwrap();
        let suite = &report.suites[0];

        assert_eq!(suite.count, 2);
        assert_eq!(suite.succeeded, 1);
        assert_eq!(suite.failed, 1);
        assert_eq!(suite.ignored, 0);
        assert_eq!(suite.outcomes[1].message.as_deref(), Some("x"));
        assert_eq!(report.verdict().code(), 1);
    }

    #[test]
    fn test_ignored_failure_does_not_fail_run() {
        let mut registry = Registry::new();
        registry.add_test("S", "a", pass);
        registry.add_test("S", "b", || assert_equal(1, 2, "x")).ignore();

        let report = Engine::new(&mut ()).run(&registry).unwrap();
        let suite = &report.suites[0];

        assert_eq!(suite.ignored, 1);
        assert_eq!(suite.failed, 1);
        assert_eq!(report.verdict().code(), 0);
    }

    #[test]
    fn test_budget_overrun_fails_passing_body() {
        let mut registry = Registry::new();
        registry
            .add_test("S", "slow", || {
                sleep(Duration::from_millis(30));
                Ok::<(), Failure>(())
            })
            .budget_ms(5);
        registry.add_test("S", "fast", pass).budget_ms(10_000);

        let report = Engine::new(&mut ()).run(&registry).unwrap();
        let slow = &report.suites[0].outcomes[0];
        let fast = &report.suites[0].outcomes[1];

        assert!(!slow.passed);
        assert!(slow.duration_ms >= 30);
        assert!(slow
            .message
            .as_deref()
            .unwrap()
            .contains("exceeded duration budget of 5 ms"));
        assert!(fast.passed);
    }

    #[test]
    fn test_budget_overrun_below_one_millisecond() {
        let mut registry = Registry::new();
        registry
            .add_test("S", "just over", || {
                let start = Instant::now();
                while start.elapsed() < Duration::from_micros(5_700) {
                    std::hint::spin_loop();
                }
                Ok::<(), Failure>(())
            })
            .budget_ms(5);

        let report = Engine::new(&mut ()).run(&registry).unwrap();
        let outcome = &report.suites[0].outcomes[0];

        assert!(!outcome.passed);
        assert!(outcome.duration_ms >= 5);
        assert!(outcome
            .message
            .as_deref()
            .unwrap()
            .starts_with("exceeded duration budget of 5 ms"));
    }

    #[test]
    fn test_budget_overrun_keeps_body_message() {
        let mut registry = Registry::new();
        registry
            .add_test("S", "slow failure", || {
                sleep(Duration::from_millis(20));
                assert_equal(1, 2, "wrong")
            })
            .budget_ms(1);

        let report = Engine::new(&mut ()).run(&registry).unwrap();
        let message = report.suites[0].outcomes[0].message.clone().unwrap();
        assert!(message.starts_with("wrong; exceeded duration budget"));
    }

    #[test]
    fn test_uncaught_error_aborts_run() {
        let mut registry = Registry::new();
        registry.add_test("S", "defect", || Err(Defect));
        registry.add_test("S", "never", pass);
        registry.add_test("T", "never either", pass);

        let mut recorder = Recorder::default();
        let err = Engine::new(&mut recorder).run(&registry).unwrap_err();

        assert_eq!(
            err,
            UncaughtError::Error {
                suite: "S".to_string(),
                case: "defect".to_string(),
                message: "defect".to_string(),
            }
        );
        assert_eq!(recorder.events, vec!["suite S", "start 1/2 defect"]);
    }

    #[test]
    fn test_wrong_kind_from_assert_throws_aborts_run() {
        let mut registry = Registry::new();
        registry.add_test("S", "wrong kind", || {
            assert_throws::<Failure, (), _>(|| Err(Defect))
        });

        let err = Engine::new(&mut ()).run(&registry).unwrap_err();
        assert!(matches!(err, UncaughtError::Error { .. }));
    }

    #[test]
    fn test_panic_aborts_run() {
        let mut registry = Registry::new();
        registry.add_test("S", "panics", || -> Result<(), Failure> {
            panic!("index out of bounds")
        });

        let err = Engine::new(&mut ()).run(&registry).unwrap_err();
        match err {
            UncaughtError::Panic { case, message, .. } => {
                assert_eq!(case, "panics");
                assert_eq!(message, "index out of bounds");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_listener_sees_registration_order() {
        let mut registry = Registry::new();
        registry.add_test("B", "b1", pass);
        registry.add_test("A", "a1", || assert_equal(1, 2, "x"));
        registry.add_test("B", "b2", pass);

        let mut recorder = Recorder::default();
        Engine::new(&mut recorder).run(&registry).unwrap();

        assert_eq!(
            recorder.events,
            vec![
                "suite B",
                "start 1/2 b1",
                "PASS b1",
                "start 2/2 b2",
                "PASS b2",
                "summary B",
                "suite A",
                "start 1/1 a1",
                "FAIL a1",
                "summary A",
                "done",
            ]
        );
    }

    #[test]
    fn test_empty_registry_passes() {
        let registry = Registry::new();
        let report = Engine::new(&mut ()).run(&registry).unwrap();
        assert!(report.suites.is_empty());
        assert_eq!(report.verdict().code(), 0);
    }
}
