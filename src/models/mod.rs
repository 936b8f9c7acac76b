//! Data models for run results
//!
//! Derived values produced by the engine and read by the reporters.

mod outcome;

pub use outcome::{CaseOutcome, RunReport, SuiteSummary, Verdict};
