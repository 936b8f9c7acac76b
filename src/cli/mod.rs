//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Minimal unit-test harness with console and JSON reports
#[derive(Parser, Debug)]
#[command(name = "popquiz")]
#[command(version)]
#[command(about = "Run the bundled PopQuiz demonstration suites")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file (YAML or JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run all registered suites
    Run(RunArgs),

    /// List registered suites and cases without running them
    List(ListArgs),
}

/// Arguments for run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Disable the console report
    #[arg(long)]
    pub no_console: bool,

    /// Write the JSON report to this file
    #[arg(short, long)]
    pub json: Option<PathBuf>,
}

/// Arguments for list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Show ignored flag and duration budget
    #[arg(short, long)]
    pub detailed: bool,
}
