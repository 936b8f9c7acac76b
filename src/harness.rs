//! Entry point
//!
//! Builds the registry through the setup callback, runs the engine, drives
//! both reporters and turns the result into a process exit status.

use std::path::Path;
use std::process::ExitCode;
use tracing::{error, warn};

use crate::config::HarnessConfig;
use crate::executor::{Engine, UncaughtError};
use crate::models::{RunReport, Verdict};
use crate::output::{
    write_report, AnsiTerminal, ConsoleReporter, ConsoleSink, JsonDestination, StructuredReport,
};
use crate::registry::{CaseHandle, Registry};

/// Output channels of a run
#[derive(Debug)]
pub struct OutputSettings {
    /// Console report toggle, enabled by default
    pub console: bool,
    /// Structured report destination, none by default
    pub json: Option<JsonDestination>,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            console: true,
            json: None,
        }
    }
}

impl From<&HarnessConfig> for OutputSettings {
    fn from(config: &HarnessConfig) -> Self {
        Self {
            console: config.console,
            json: config
                .json
                .clone()
                .map(JsonDestination::Path)
                .filter(|destination| !destination.is_empty_path()),
        }
    }
}

/// Context handed to the setup callback
pub struct Setup<'a> {
    registry: &'a mut Registry,
    output: &'a mut OutputSettings,
}

impl Setup<'_> {
    /// Register a case, see [`Registry::add_test`]
    pub fn add_test<F, E>(
        &mut self,
        suite: impl Into<String>,
        name: impl Into<String>,
        body: F,
    ) -> CaseHandle<'_>
    where
        F: Fn() -> Result<(), E> + 'static,
        E: Into<anyhow::Error> + 'static,
    {
        self.registry.add_test(suite, name, body)
    }

    /// Register a case, see [`Registry::add_test_with`]
    pub fn add_test_with<F, E>(
        &mut self,
        suite: impl Into<String>,
        name: impl Into<String>,
        body: F,
        included: bool,
        duration_budget_ms: Option<u64>,
    ) -> CaseHandle<'_>
    where
        F: Fn() -> Result<(), E> + 'static,
        E: Into<anyhow::Error> + 'static,
    {
        self.registry.add_test_with(suite, name, body, included, duration_budget_ms)
    }

    pub fn output_console(&mut self, enabled: bool) {
        self.output.console = enabled;
    }

    /// Write the structured report to `destination`; an empty path turns it off
    pub fn output_json(&mut self, destination: impl Into<JsonDestination>) {
        let destination = destination.into();
        self.output.json = (!destination.is_empty_path()).then_some(destination);
    }

    /// Write the structured report next to `source`, typically `file!()`
    pub fn output_json_for_source(&mut self, source: impl AsRef<Path>) {
        self.output.json = Some(JsonDestination::beside_source(source));
    }

    pub fn registry(&self) -> &Registry {
        &*self.registry
    }

    /// Direct access for helpers that register into a plain [`Registry`]
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut *self.registry
    }
}

/// How a run ended
#[derive(Debug)]
pub enum RunOutcome {
    Completed(RunReport),
    Aborted(UncaughtError),
}

impl RunOutcome {
    /// 0 when no included case failed, 1 otherwise or when aborted
    pub fn code(&self) -> u8 {
        match self {
            RunOutcome::Completed(report) => report.verdict().code(),
            RunOutcome::Aborted(_) => Verdict::Fail.code(),
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.code())
    }

    pub fn report(&self) -> Option<&RunReport> {
        match self {
            RunOutcome::Completed(report) => Some(report),
            RunOutcome::Aborted(_) => None,
        }
    }
}

/// Runs one registration callback end to end
pub struct Harness {
    output: OutputSettings,
    sink: Box<dyn ConsoleSink>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            output: OutputSettings::default(),
            sink: Box::new(AnsiTerminal::stdout()),
        }
    }

    /// Start from configured output settings
    pub fn with_config(mut self, config: &HarnessConfig) -> Self {
        self.output = OutputSettings::from(config);
        self
    }

    pub fn with_output(mut self, output: OutputSettings) -> Self {
        self.output = output;
        self
    }

    /// Render the console report somewhere other than stdout
    pub fn with_console_sink(mut self, sink: impl ConsoleSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Register through `setup` (called exactly once), run, and report.
    ///
    /// Calls made inside `setup` override the configured output settings.
    pub fn run<F>(self, setup: F) -> RunOutcome
    where
        F: FnOnce(&mut Setup<'_>),
    {
        let Harness { mut output, sink } = self;
        let mut registry = Registry::new();

        setup(&mut Setup {
            registry: &mut registry,
            output: &mut output,
        });

        let mut console = ConsoleReporter::new(sink, output.console);
        let result = Engine::new(&mut console).run(&registry);

        let report = match result {
            Ok(report) => report,
            Err(uncaught) => {
                error!("Run aborted: {}", uncaught);
                console.diagnostic(&format!("{uncaught}, now exiting..."));
                return RunOutcome::Aborted(uncaught);
            }
        };

        if let Some(destination) = output.json.as_mut() {
            let document = StructuredReport::from_run(&report);
            if let Err(e) = write_report(&document, destination) {
                warn!("Structured report not written: {}", e);
                console.diagnostic(&format!("warning: {e}"));
            }
        }

        RunOutcome::Completed(report)
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

/// Run `setup` with default settings and return the process exit status
///
/// ```no_run
/// use popquiz::assert::assert_equal;
///
/// fn main() -> std::process::ExitCode {
///     popquiz::run(|quiz| {
///         quiz.add_test("Math", "addition", || assert_equal(2, 1 + 1, "1 + 1 is 2"));
///     })
/// }
/// ```
pub fn run<F>(setup: F) -> ExitCode
where
    F: FnOnce(&mut Setup<'_>),
{
    Harness::new().run(setup).exit_code()
}
