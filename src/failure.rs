//! Failure signal
//!
//! The typed error raised by assertions to fail a single case.

use std::fmt;
use std::panic::Location;
use thiserror::Error;

/// Source location of the assertion that raised a failure
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: &'static str,
    pub line: u32,
}

impl SourceLocation {
    /// Location of the caller (propagated through `#[track_caller]`)
    #[track_caller]
    pub fn caller() -> Self {
        let location = Location::caller();
        Self {
            file: location.file(),
            line: location.line(),
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// An expected test failure.
///
/// The engine recovers from this error locally: the case is marked as failed
/// and the run moves on. Any other error reaching the engine aborts the run.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct Failure {
    message: String,
    location: Option<SourceLocation>,
}

impl Failure {
    /// Create a failure located at the caller
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: Some(SourceLocation::caller()),
        }
    }

    /// Create a failure without source location
    pub fn unlocated(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn location(&self) -> Option<&SourceLocation> {
        self.location.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_display_is_message() {
        let failure = Failure::new("One should not equal two.");
        assert_eq!(failure.to_string(), "One should not equal two.");
        assert_eq!(failure.message(), "One should not equal two.");
    }

    #[test]
    fn test_failure_captures_location() {
        let line = line!() + 1;
        let failure = Failure::new("x");
        let location = failure.location().unwrap();
        assert_eq!(location.file, file!());
        assert_eq!(location.line, line);
    }

    #[test]
    fn test_unlocated_failure() {
        let failure = Failure::unlocated("budget");
        assert!(failure.location().is_none());
    }

    #[test]
    fn test_failure_survives_anyhow() {
        let err: anyhow::Error = Failure::new("boxed").into();
        let failure = err.downcast_ref::<Failure>().unwrap();
        assert_eq!(failure.message(), "boxed");
    }
}
