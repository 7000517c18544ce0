//! Report types produced for export.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The report variants the admin UI can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Attendance,
    Events,
    Users,
}

impl ReportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Attendance => "attendance",
            ReportKind::Events => "events",
            ReportKind::Users => "users",
        }
    }
}

impl FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "attendance" => Ok(ReportKind::Attendance),
            "events" => Ok(ReportKind::Events),
            "users" => Ok(ReportKind::Users),
            _ => Err(format!("Invalid report kind: {}", s)),
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An inclusive `[start, end]` calendar-date filter.
///
/// Bounds are `YYYY-MM-DD` strings compared lexically, which for
/// zero-padded dates orders the same as chronological comparison and
/// matches how the stores themselves filter date columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

impl DateRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Whether a derived calendar date falls inside the range.
    pub fn contains(&self, date: &str) -> bool {
        self.start.as_str() <= date && date <= self.end.as_str()
    }
}

/// An assembled tabular report: one fixed header row plus data rows.
///
/// Ephemeral by design; reports are rendered straight to an export format
/// and never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub kind: ReportKind,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Report {
    pub fn new(kind: ReportKind, header: &[&str]) -> Self {
        Self {
            kind,
            header: header.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// Number of data rows (the header is not counted).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
