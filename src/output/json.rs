//! Structured reporter
//!
//! Serializes a run into the JSON document keyed by suite name:
//!
//! ```json
//! { "<suite>": [
//!     { "name": "a", "status": true, "ignore": false, "duration": 0 },
//!     { "count": 1, "success": 1, "fail": 0, "ignore": 0, "total_duration": 0 }
//! ] }
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info};

use crate::models::{CaseOutcome, RunReport, SuiteSummary};

/// Errors raised while persisting the structured report
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write report to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write report stream: {0}")]
    Stream(#[source] io::Error),
}

/// Per-case record
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub name: String,
    pub status: bool,
    pub ignore: bool,
    pub duration: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<&CaseOutcome> for CaseRecord {
    fn from(outcome: &CaseOutcome) -> Self {
        Self {
            name: outcome.name.clone(),
            status: outcome.passed,
            ignore: !outcome.included,
            duration: outcome.duration_ms,
            message: if outcome.passed {
                None
            } else {
                outcome.message.clone()
            },
        }
    }
}

/// Trailing totals record of a suite
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteTotals {
    pub count: usize,
    pub success: usize,
    pub fail: usize,
    pub ignore: usize,
    pub total_duration: u64,
}

impl From<&SuiteSummary> for SuiteTotals {
    fn from(summary: &SuiteSummary) -> Self {
        Self {
            count: summary.count,
            success: summary.succeeded,
            fail: summary.failed,
            ignore: summary.ignored,
            total_duration: summary.total_duration_ms,
        }
    }
}

/// One element of a suite's array
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SuiteEntry {
    Case(CaseRecord),
    Totals(SuiteTotals),
}

/// The whole document, suites in registration order
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StructuredReport {
    suites: IndexMap<String, Vec<SuiteEntry>>,
}

impl StructuredReport {
    pub fn from_run(report: &RunReport) -> Self {
        let suites = report
            .suites
            .iter()
            .map(|summary| {
                let mut entries: Vec<SuiteEntry> = summary
                    .outcomes
                    .iter()
                    .map(|o| SuiteEntry::Case(o.into()))
                    .collect();
                entries.push(SuiteEntry::Totals(summary.into()));
                (summary.name.clone(), entries)
            })
            .collect();

        Self { suites }
    }

    pub fn suite(&self, name: &str) -> Option<&[SuiteEntry]> {
        self.suites.get(name).map(Vec::as_slice)
    }

    pub fn suite_names(&self) -> impl Iterator<Item = &str> {
        self.suites.keys().map(String::as_str)
    }

    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Where the structured report goes
pub enum JsonDestination {
    Path(PathBuf),
    Writer(Box<dyn Write>),
}

impl JsonDestination {
    /// `<source stem>.json` next to `source`
    pub fn beside_source(source: impl AsRef<Path>) -> Self {
        JsonDestination::Path(source.as_ref().with_extension("json"))
    }

    /// An empty path means structured output is off
    pub fn is_empty_path(&self) -> bool {
        matches!(self, JsonDestination::Path(path) if path.as_os_str().is_empty())
    }
}

impl fmt::Debug for JsonDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonDestination::Path(path) => f.debug_tuple("Path").field(path).finish(),
            JsonDestination::Writer(_) => f.write_str("Writer(..)"),
        }
    }
}

impl From<PathBuf> for JsonDestination {
    fn from(path: PathBuf) -> Self {
        JsonDestination::Path(path)
    }
}

impl From<&Path> for JsonDestination {
    fn from(path: &Path) -> Self {
        JsonDestination::Path(path.to_path_buf())
    }
}

impl From<&str> for JsonDestination {
    fn from(path: &str) -> Self {
        JsonDestination::Path(PathBuf::from(path))
    }
}

impl From<String> for JsonDestination {
    fn from(path: String) -> Self {
        JsonDestination::Path(PathBuf::from(path))
    }
}

/// Persist `report` to `destination`.
///
/// Files are written to a temporary sibling and renamed into place, so the
/// destination either holds the whole document or is left untouched.
pub fn write_report(
    report: &StructuredReport,
    destination: &mut JsonDestination,
) -> Result<(), ReportError> {
    let content = report.to_json()?;

    match destination {
        JsonDestination::Path(path) => {
            write_atomic(path, content.as_bytes())?;
            info!("Wrote JSON report to {}", path.display());
        }
        JsonDestination::Writer(writer) => {
            writer
                .write_all(content.as_bytes())
                .and_then(|()| writer.flush())
                .map_err(ReportError::Stream)?;
            debug!("Wrote JSON report to stream");
        }
    }

    Ok(())
}

fn write_atomic(path: &Path, content: &[u8]) -> Result<(), ReportError> {
    let io_err = |source: io::Error| ReportError::Io {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir).map_err(io_err)?;
    file.write_all(content).map_err(io_err)?;
    file.flush().map_err(io_err)?;
    file.persist(path).map_err(|e| io_err(e.error))?;

    Ok(())
}
