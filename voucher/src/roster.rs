//! Roster source
//!
//! Loads the student roster from a sheet export (CSV, or the JSON array a
//! sheet-to-JSON export produces). Column names follow the source sheet:
//! `StudentId`, `Student Name`, `SNo`. Rows without an id cannot be looked up
//! and are skipped; rows missing a name or serial are kept.
//!
//! A `Roster` is an immutable, cheaply clonable snapshot. The search engine
//! holds one and is handed a new one when the roster is reloaded.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::candidate::RosterEntry;
use crate::models::{CellValue, StudentRecord};

pub const ID_COLUMN: &str = "StudentId";
pub const NAME_COLUMN: &str = "Student Name";
pub const SERIAL_COLUMN: &str = "SNo";

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Missing column: {0}")]
    MissingColumn(&'static str),
    #[error("Unsupported roster format: {0}")]
    UnsupportedFormat(String),
}

pub type RosterResult<T> = Result<T, RosterError>;

/// Row shape of a sheet-to-JSON export
#[derive(Debug, Deserialize)]
struct RosterRow {
    #[serde(rename = "StudentId", default)]
    student_id: Option<CellValue>,
    #[serde(rename = "Student Name", default)]
    student_name: Option<CellValue>,
    #[serde(rename = "SNo", default)]
    serial: Option<CellValue>,
}

impl RosterRow {
    fn into_record(self) -> Option<StudentRecord> {
        let id = match self.student_id {
            Some(CellValue::Text(ref s)) if s.trim().is_empty() => return None,
            Some(id) => id,
            None => return None,
        };
        Some(StudentRecord {
            id,
            name: self.student_name.map(|n| n.to_string()),
            serial: self.serial,
        })
    }
}

/// Ordered, read-only student roster
#[derive(Debug, Clone)]
pub struct Roster {
    entries: Arc<[RosterEntry]>,
}

impl Default for Roster {
    fn default() -> Self {
        Self::empty()
    }
}

impl Roster {
    pub fn empty() -> Self {
        Self {
            entries: Arc::from(Vec::new()),
        }
    }

    pub fn from_records(records: impl IntoIterator<Item = StudentRecord>) -> Self {
        let entries: Vec<RosterEntry> = records.into_iter().map(RosterEntry::new).collect();
        Self {
            entries: entries.into(),
        }
    }

    /// Parse CSV with a header row
    pub fn from_csv_reader<R: Read>(reader: R) -> RosterResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let column = |name: &str| headers.iter().position(|h| h == name);
        let id_col = column(ID_COLUMN).ok_or(RosterError::MissingColumn(ID_COLUMN))?;
        let name_col = column(NAME_COLUMN);
        let serial_col = column(SERIAL_COLUMN);

        let mut records = Vec::new();
        let mut skipped = 0usize;
        for (line, row) in csv_reader.records().enumerate() {
            let row = row?;
            let field = |col: Option<usize>| col.and_then(|c| row.get(c)).and_then(CellValue::from_field);

            let Some(id) = field(Some(id_col)) else {
                skipped += 1;
                warn!(row = line + 2, "Skipping roster row without {}", ID_COLUMN);
                continue;
            };
            records.push(StudentRecord {
                id,
                name: name_col
                    .and_then(|c| row.get(c))
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .map(str::to_string),
                serial: field(serial_col),
            });
        }

        info!(records = records.len(), skipped, "Loaded roster from CSV");
        Ok(Self::from_records(records))
    }

    /// Parse a JSON array of row objects.
    ///
    /// Each row is converted on its own; a row with an unusable cell (a
    /// boolean, an object) is skipped with a warning instead of failing the load.
    pub fn from_json_str(json: &str) -> RosterResult<Self> {
        let rows: Vec<serde_json::Value> = serde_json::from_str(json)?;
        let total = rows.len();
        let mut records = Vec::with_capacity(total);
        for (index, row) in rows.into_iter().enumerate() {
            match serde_json::from_value::<RosterRow>(row) {
                Ok(row) => match row.into_record() {
                    Some(record) => records.push(record),
                    None => warn!(row = index, "Skipping roster row without {}", ID_COLUMN),
                },
                Err(e) => warn!(row = index, error = %e, "Skipping malformed roster row"),
            }
        }
        let skipped = total - records.len();
        info!(records = records.len(), skipped, "Loaded roster from JSON");
        Ok(Self::from_records(records))
    }

    pub fn from_csv_path(path: &Path) -> RosterResult<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(std::io::BufReader::new(file))
    }

    pub fn from_json_path(path: &Path) -> RosterResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Load by file extension (`.csv` or `.json`)
    pub fn load(path: &Path) -> RosterResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => Self::from_csv_path(path),
            "json" => Self::from_json_path(path),
            _ => Err(RosterError::UnsupportedFormat(path.display().to_string())),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &StudentRecord> {
        self.entries.iter().map(RosterEntry::record)
    }

    /// First record whose stringified id equals `id`
    pub fn find_by_id(&self, id: &str) -> Option<&StudentRecord> {
        self.entries
            .iter()
            .find(|e| e.id_text() == id)
            .map(RosterEntry::record)
    }

    /// Whether both rosters are the same loaded snapshot
    pub fn ptr_eq(&self, other: &Roster) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }
}

impl FromIterator<StudentRecord> for Roster {
    fn from_iter<I: IntoIterator<Item = StudentRecord>>(iter: I) -> Self {
        Self::from_records(iter)
    }
}
