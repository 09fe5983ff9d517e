//! Voucher Desk Interface Definition
//!
//! Shared types exchanged between the search engine, the view, and the
//! voucher/log collaborators. It acts as the source of truth for shared types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::StudentRecord;

/// Message the view shows when a non-empty query selects nothing
pub const NOT_FOUND_MESSAGE: &str = "No student found with given ID or Name";

// ═══════════════════════════════════════════════════════════════════════════════
// SEARCH STATE
// ═══════════════════════════════════════════════════════════════════════════════

/// Keyboard navigation direction inside the suggestion list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightDirection {
    Up,
    Down,
}

/// Observable state of the search engine.
///
/// `highlight` is `None` when nothing is highlighted; otherwise it always
/// indexes into `suggestions`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SearchState {
    pub query: String,
    pub suggestions: Vec<StudentRecord>,
    pub selection: Option<StudentRecord>,
    pub highlight: Option<usize>,
}

impl SearchState {
    /// Classify the state the way the view reports it
    pub fn outcome(&self) -> SearchOutcome {
        if self.query.trim().is_empty() {
            SearchOutcome::Idle
        } else if self.selection.is_some() {
            SearchOutcome::Matched
        } else if self.suggestions.is_empty() {
            SearchOutcome::NoMatch
        } else {
            SearchOutcome::AmbiguousPartial
        }
    }

    pub fn highlighted(&self) -> Option<&StudentRecord> {
        self.highlight.and_then(|i| self.suggestions.get(i))
    }
}

/// What a search state means for the user. None of these are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Empty query
    Idle,
    /// Non-empty query, nothing contains it
    NoMatch,
    /// Suggestions exist but none is an exact match; the user must pick
    AmbiguousPartial,
    /// A record is selected
    Matched,
}

// ═══════════════════════════════════════════════════════════════════════════════
// EVENT LOG RECORDS
// ═══════════════════════════════════════════════════════════════════════════════

/// Action recorded against a student in the remote log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventAction {
    Print,
    Download,
    Attendance,
}

impl EventAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventAction::Print => "print",
            EventAction::Download => "download",
            EventAction::Attendance => "attendance",
        }
    }
}

/// One entry of the remote event log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEvent {
    pub action: EventAction,
    pub student_id: String,
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub serial: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl LogEvent {
    /// Build an event for `record`, stamped now
    pub fn for_record(action: EventAction, record: &StudentRecord) -> Self {
        Self {
            action,
            student_id: record.id_string(),
            student_name: record.name().map(str::to_string),
            serial: record.serial.as_ref().map(|s| s.to_string()),
            timestamp: Utc::now(),
        }
    }
}

/// Aggregate attendance figure served by the log API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AttendanceSummary {
    pub count: u64,
}

// ═══════════════════════════════════════════════════════════════════════════════
// ERRORS
// ═══════════════════════════════════════════════════════════════════════════════

/// Error type for desk operations
#[derive(Debug, Error)]
pub enum VoucherError {
    #[error("No student selected")]
    NoSelection,
    #[error("Roster error: {0}")]
    Roster(#[from] crate::roster::RosterError),
    #[error("Log API error: {0}")]
    Log(#[from] crate::attendance::LogError),
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
}

pub type VoucherResult<T> = Result<T, VoucherError>;

// ═══════════════════════════════════════════════════════════════════════════════
// SERVICE INTERFACE
// ═══════════════════════════════════════════════════════════════════════════════

/// Remote sink for print/download/attendance events.
/// Implemented by the HTTP `LogClient` and by the in-process `MemoryEventLog`.
#[async_trait::async_trait]
pub trait EventLog: Send + Sync {
    /// Record one event
    async fn post_event(&self, event: &LogEvent) -> Result<(), crate::attendance::LogError>;

    /// Fetch every event recorded so far
    async fn fetch_logs(&self) -> Result<Vec<LogEvent>, crate::attendance::LogError>;

    /// Fetch the aggregate attendance count
    async fn fetch_attendance(&self) -> Result<AttendanceSummary, crate::attendance::LogError>;
}
