//! PopQuiz - a minimal embeddable unit-test harness
//!
//! Test authors register named cases grouped into suites from a single setup
//! callback. The harness runs them one at a time in registration order,
//! records pass/fail/ignore outcomes and timing, prints a console report and
//! optionally writes a JSON summary.
//!
//! ## Usage
//!
//! ```no_run
//! use popquiz::assert::{assert_equal, assert_throws};
//!
//! #[derive(Debug, thiserror::Error)]
//! #[error("runtime error")]
//! struct RuntimeError;
//!
//! fn main() -> std::process::ExitCode {
//!     popquiz::run(|quiz| {
//!         quiz.output_json("report.json");
//!
//!         quiz.add_test("Example", "Assert True", || assert_equal(1, 1, "One should equal one."));
//!         quiz.add_test("Example", "Expect Error", || {
//!             assert_throws::<RuntimeError, (), _>(|| Err(RuntimeError))
//!         })
//!         .budget_ms(5);
//!         quiz.add_test("Example", "Known Broken", || assert_equal(1, 2, "not yet"))
//!             .ignore();
//!     })
//! }
//! ```
//!
//! ## Outcomes
//!
//! - A body returning a [`Failure`] (what every assertion raises) fails the
//!   case; the run continues.
//! - Ignored cases still run, but their failures never change the exit status.
//! - A case exceeding its duration budget fails even if its body passed.
//! - Any other error, or a panic, aborts the whole run with exit status 1.

pub mod assert;
pub mod config;
pub mod executor;
pub mod failure;
pub mod harness;
pub mod models;
pub mod output;
pub mod registry;
pub mod utils;

pub use failure::{Failure, SourceLocation};
pub use harness::{run, Harness, OutputSettings, RunOutcome, Setup};
pub use registry::Registry;
