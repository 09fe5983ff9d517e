//! Roster entry with memoized match keys.
//!
//! Module isolation ensures no code outside this module can mutate the record
//! after construction, so the `OnceLock` caches can never go stale.

use std::sync::OnceLock;

use crate::models::StudentRecord;

/// A roster record plus the derived strings every evaluation compares against.
/// Keys are computed on first access and cached, so typing does not re-lowercase
/// the whole roster on each debounced evaluation.
#[derive(Debug, Clone)]
pub struct RosterEntry {
    record: StudentRecord,
    id_text: OnceLock<String>,
    name_lower: OnceLock<Option<String>>,
    name_key: OnceLock<Option<String>>,
}

impl RosterEntry {
    pub fn new(record: StudentRecord) -> Self {
        Self {
            record,
            id_text: OnceLock::new(),
            name_lower: OnceLock::new(),
            name_key: OnceLock::new(),
        }
    }

    pub fn record(&self) -> &StudentRecord {
        &self.record
    }

    /// Stringified id, compared case-sensitively
    pub fn id_text(&self) -> &str {
        self.id_text.get_or_init(|| self.record.id_string())
    }

    /// Lowercased name, `None` when the row has no name
    pub fn name_lower(&self) -> Option<&str> {
        self.name_lower
            .get_or_init(|| self.record.name().map(str::to_lowercase))
            .as_deref()
    }

    /// Lowercased name with all whitespace removed, for exact matching
    pub fn name_key(&self) -> Option<&str> {
        self.name_key
            .get_or_init(|| self.name_lower().map(crate::search::collapse_whitespace))
            .as_deref()
    }
}

impl From<StudentRecord> for RosterEntry {
    fn from(record: StudentRecord) -> Self {
        Self::new(record)
    }
}
