//! PopQuiz demonstration binary
//!
//! Runs the bundled demonstration suites through the harness and exits with
//! the harness's status.
//!
//! ## Usage
//!
//! ```bash
//! # Run with console report
//! popquiz run
//!
//! # Quiet run writing the JSON report
//! popquiz run --no-console --json report.json
//!
//! # List registered cases
//! popquiz list --detailed
//! ```

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing::info;

use popquiz::config::HarnessConfig;
use popquiz::utils::init_logger;
use popquiz::{Harness, Registry};

mod cli;
mod demo;

use cli::{Args, Command};

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => HarnessConfig::load(path)?,
        None => HarnessConfig::load_default()?,
    };
    if let Some(level) = &args.log_level {
        config.log_level = level.clone();
        config.validate()?;
    }

    init_logger(config.log_level());

    match args.command {
        Command::Run(run_args) => Ok(run_suites(config, run_args)),
        Command::List(list_args) => {
            list_suites(list_args);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn run_suites(mut config: HarnessConfig, args: cli::RunArgs) -> ExitCode {
    if args.no_console {
        config.console = false;
    }
    if let Some(json) = args.json {
        config.json = Some(json);
    }

    info!(
        "Running demonstration suites (console: {}, json: {:?})",
        config.console, config.json
    );

    let outcome = Harness::new()
        .with_config(&config)
        .run(|quiz| demo::register(quiz.registry_mut()));

    outcome.exit_code()
}

fn list_suites(args: cli::ListArgs) {
    let mut registry = Registry::new();
    demo::register(&mut registry);

    println!(
        "\nRegistered suites ({} suites, {} cases)\n",
        registry.suite_count(),
        registry.case_count()
    );
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    for suite in registry.suites() {
        println!("\n{}:", suite.name());
        println!("──────────────────────────────────────────────────────────────────────");

        for (index, case) in suite.cases().iter().enumerate() {
            if args.detailed {
                let ignored = if case.is_included() { "" } else { "ignored" };
                let budget = case
                    .duration_budget_ms()
                    .map(|ms| format!("budget {ms} ms"))
                    .unwrap_or_default();
                println!(
                    "  {:2}. {:30} {:8} {}",
                    index + 1,
                    case.name(),
                    ignored,
                    budget
                );
            } else {
                println!("  {:2}. {}", index + 1, case.name());
            }
        }
    }

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
}
