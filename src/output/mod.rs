//! Output reporters
//!
//! Console progress report and structured JSON report.

mod console;
mod json;

pub use console::{AnsiTerminal, CapturedConsole, ConsoleReporter, ConsoleSink, Emphasis};
pub use json::{
    write_report, CaseRecord, JsonDestination, ReportError, StructuredReport, SuiteEntry,
    SuiteTotals,
};
