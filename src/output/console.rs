//! Console reporter
//!
//! Streams suite headers, per-case progress and suite summaries to a
//! [`ConsoleSink`] while the engine runs.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use crate::executor::RunListener;
use crate::models::{CaseOutcome, RunReport, SuiteSummary, Verdict};
use crate::registry::{Suite, TestCase};

const RULE: &str = ">------------------------------------------\n";

/// Presentation class of a piece of console text
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Emphasis {
    Pass,
    Fail,
    Info,
    Plain,
}

impl Emphasis {
    /// ANSI escape selecting this emphasis
    pub fn ansi_code(self) -> &'static str {
        match self {
            Emphasis::Pass => "\x1b[1m\x1b[32m",
            Emphasis::Fail => "\x1b[1m\x1b[31m",
            Emphasis::Info => "\x1b[1m\x1b[36m",
            Emphasis::Plain => "\x1b[0m\x1b[37m",
        }
    }
}

/// Rendering target for console text
pub trait ConsoleSink {
    fn emit(&mut self, emphasis: Emphasis, text: &str);

    fn flush(&mut self) {}
}

/// Writes ANSI-colored text to a terminal (stdout by default)
pub struct AnsiTerminal<W: Write = io::Stdout> {
    out: W,
    colorize: bool,
}

impl AnsiTerminal<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> AnsiTerminal<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            colorize: true,
        }
    }

    pub fn no_color(mut self) -> Self {
        self.colorize = false;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ConsoleSink for AnsiTerminal<W> {
    fn emit(&mut self, emphasis: Emphasis, text: &str) {
        // A closed stdout must not take the run down with it.
        let _ = if self.colorize && emphasis != Emphasis::Plain {
            write!(
                self.out,
                "{}{}{}",
                emphasis.ansi_code(),
                text,
                Emphasis::Plain.ansi_code()
            )
        } else {
            self.out.write_all(text.as_bytes())
        };
    }

    fn flush(&mut self) {
        let _ = self.out.flush();
    }
}

/// In-memory sink recording every emitted segment.
///
/// Clones share the same buffer, so a copy can be handed to the harness and
/// inspected afterwards.
#[derive(Clone, Debug, Default)]
pub struct CapturedConsole {
    segments: Rc<RefCell<Vec<(Emphasis, String)>>>,
}

impl CapturedConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> Vec<(Emphasis, String)> {
        self.segments.borrow().clone()
    }

    /// All text without emphasis
    pub fn text(&self) -> String {
        self.segments
            .borrow()
            .iter()
            .map(|(_, text)| text.as_str())
            .collect()
    }

    /// Whether `needle` was emitted as one segment with `emphasis`
    pub fn contains(&self, emphasis: Emphasis, needle: &str) -> bool {
        self.segments
            .borrow()
            .iter()
            .any(|(e, text)| *e == emphasis && text.contains(needle))
    }
}

impl ConsoleSink for CapturedConsole {
    fn emit(&mut self, emphasis: Emphasis, text: &str) {
        self.segments.borrow_mut().push((emphasis, text.to_string()));
    }
}

/// Human-readable progress and summary report
pub struct ConsoleReporter {
    sink: Box<dyn ConsoleSink>,
    enabled: bool,
}

impl ConsoleReporter {
    pub fn new(sink: Box<dyn ConsoleSink>, enabled: bool) -> Self {
        Self { sink, enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn print(&mut self, emphasis: Emphasis, text: &str) {
        if self.enabled {
            self.sink.emit(emphasis, text);
        }
    }

    /// Out-of-band message (warnings, fatal diagnostics).
    ///
    /// Shown on the sink when enabled, on stderr otherwise.
    pub fn diagnostic(&mut self, text: &str) {
        if self.enabled {
            self.sink.emit(Emphasis::Fail, text);
            self.sink.emit(Emphasis::Plain, "\n");
            self.sink.flush();
        } else {
            eprintln!("{text}");
        }
    }

    fn print_recap_line(&mut self, outcome: &CaseOutcome) {
        self.print(Emphasis::Plain, "        - ");
        if outcome.passed {
            self.print(Emphasis::Pass, "PASS");
        } else {
            self.print(Emphasis::Fail, "FAIL");
        }
        self.print(
            Emphasis::Plain,
            &format!(" ({} - {} ms)\n", outcome.name, outcome.duration_ms),
        );
    }
}

impl RunListener for ConsoleReporter {
    fn suite_started(&mut self, suite: &Suite) {
        self.print(Emphasis::Plain, RULE);
        self.print(Emphasis::Plain, ">>> ");
        self.print(Emphasis::Info, "Test Suite: ");
        self.print(Emphasis::Plain, &format!("{}\n", suite.name()));
    }

    fn case_started(&mut self, index: usize, count: usize, case: &TestCase) {
        self.print(Emphasis::Plain, "\n    >>> ");
        self.print(Emphasis::Info, &format!("Scenario ({index}/{count}):\n"));

        let marker = if case.is_included() { "" } else { " [ignored]" };
        self.print(
            Emphasis::Plain,
            &format!("        - {}{}\n", case.name(), marker),
        );
        self.sink.flush();
    }

    fn case_finished(&mut self, outcome: &CaseOutcome) {
        self.print(
            Emphasis::Plain,
            &format!("        - Completed in {} ms\n", outcome.duration_ms),
        );
        self.print(Emphasis::Plain, "        - ");
        if outcome.passed {
            self.print(Emphasis::Pass, "PASS");
        } else {
            let message = outcome.message.as_deref().unwrap_or_default();
            self.print(Emphasis::Fail, &format!("FAIL ({message})"));
        }
        self.print(Emphasis::Plain, "\n");

        if let Some(location) = &outcome.location {
            self.print(Emphasis::Plain, &format!("        - at {location}\n"));
        }
    }

    fn suite_finished(&mut self, summary: &SuiteSummary) {
        if summary.count == 0 {
            return;
        }

        self.print(Emphasis::Plain, "\n    >>> ");
        self.print(Emphasis::Info, "Summary: ");
        self.print(Emphasis::Plain, &format!("{}\n", summary.name));

        let passed = format!(
            "        - {:.2}% of tests passed ({}/{})\n",
            summary.pass_rate(),
            summary.succeeded,
            summary.count
        );
        if summary.is_success() {
            self.print(Emphasis::Pass, &passed);
        } else {
            self.print(Emphasis::Fail, &passed);
        }

        self.print(
            Emphasis::Plain,
            &format!(
                "        - {:.2}% of tests ignored ({}/{})\n",
                summary.ignore_rate(),
                summary.ignored,
                summary.count
            ),
        );
        self.print(
            Emphasis::Plain,
            &format!(
                "        - Total duration: {} ms\n\n",
                summary.total_duration_ms
            ),
        );

        for outcome in &summary.outcomes {
            self.print_recap_line(outcome);
        }
        self.print(Emphasis::Plain, "\n");
    }

    fn run_finished(&mut self, report: &RunReport) {
        let verdict = report.verdict();

        self.print(Emphasis::Plain, RULE);
        self.print(Emphasis::Plain, ">>> ");
        self.print(Emphasis::Info, "Run: ");
        self.print(
            Emphasis::Plain,
            &format!(
                "{} suites, {} cases, {} failed - ",
                report.suites.len(),
                report.case_count(),
                report.blocking_failures()
            ),
        );
        match verdict {
            Verdict::Pass => self.print(Emphasis::Pass, "PASS"),
            Verdict::Fail => self.print(Emphasis::Fail, "FAIL"),
        }
        self.print(Emphasis::Plain, "\n");
        self.sink.flush();
    }
}
