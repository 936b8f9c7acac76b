//! Test execution engine
//!
//! Provides sequential execution of registered suites.

mod runner;

pub use runner::{run_case, Engine, RunListener, UncaughtError};
