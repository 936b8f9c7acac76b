//! Logging utilities
//!
//! Installs the `tracing` subscriber used by the binary. The library itself
//! only emits events.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Verbosity of the harness's own diagnostics
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    #[default]
    Warn,
    Error,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unsupported log level: {0}")]
pub struct UnknownLogLevel(pub String);

impl LogLevel {
    pub fn to_tracing_level(self) -> Level {
        match self {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }

    /// Filter directive limiting output to this crate's events
    pub fn directive(self) -> String {
        format!("popquiz={}", self)
    }
}

impl FromStr for LogLevel {
    type Err = UnknownLogLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(UnknownLogLevel(s.to_string())),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        f.write_str(name)
    }
}

/// Install the stderr subscriber.
///
/// `RUST_LOG` takes precedence over `level` when set. A second call is a
/// no-op, so embedding programs that already installed a subscriber keep it.
pub fn init_logger(level: LogLevel) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.directive()));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();

    if installed.is_err() {
        tracing::debug!("Subscriber already installed, keeping it");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level() {
        assert_eq!("info".parse(), Ok(LogLevel::Info));
        assert_eq!("DEBUG".parse(), Ok(LogLevel::Debug));
        assert_eq!("warning".parse(), Ok(LogLevel::Warn));
        assert_eq!(
            "loud".parse::<LogLevel>(),
            Err(UnknownLogLevel("loud".to_string()))
        );
    }

    #[test]
    fn test_directive_scoped_to_crate() {
        assert_eq!(LogLevel::default().directive(), "popquiz=warn");
        assert_eq!(LogLevel::Trace.directive(), "popquiz=trace");
        assert_eq!(LogLevel::Error.to_tracing_level(), Level::ERROR);
    }

    #[test]
    fn test_repeated_init_is_harmless() {
        init_logger(LogLevel::Error);
        init_logger(LogLevel::Debug);
    }
}
