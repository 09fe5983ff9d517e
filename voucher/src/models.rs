//! Core data models for the student roster

use serde::{Deserialize, Serialize};
use std::fmt;

// ─────────────────────────────────────────────────────────────────────────────
// CELL VALUES
// ─────────────────────────────────────────────────────────────────────────────

/// A single cell as it comes out of a roster sheet export.
///
/// Sheets hand back ids and serials as numbers or text depending on how the
/// cell was typed, so both shapes are kept and stringified on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    /// Parse a raw CSV field. Blank fields yield `None`.
    ///
    /// A CSV export already holds the text the sheet displayed, so a field only
    /// becomes a number when it prints back unchanged (`007`, `1.50` and `1e3`
    /// stay text).
    pub fn from_field(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        let numeric = trimmed
            .parse::<i64>()
            .map(CellValue::Integer)
            .ok()
            .or_else(|| trimmed.parse::<f64>().ok().filter(|f| f.is_finite()).map(CellValue::Float));
        match numeric {
            Some(value) if value.to_string() == trimmed => Some(value),
            _ => Some(CellValue::Text(trimmed.to_string())),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Integer(n) => write!(f, "{}", n),
            // Integral floats print without a fraction, as the sheet shows them
            CellValue::Float(x) if x.fract() == 0.0 && x.abs() < 1e15 => write!(f, "{}", *x as i64),
            CellValue::Float(x) => write!(f, "{}", x),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Integer(n)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Integer(n as i64)
    }
}

impl From<u32> for CellValue {
    fn from(n: u32) -> Self {
        CellValue::Integer(n as i64)
    }
}

impl From<f64> for CellValue {
    fn from(x: f64) -> Self {
        CellValue::Float(x)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// STUDENT RECORD
// ─────────────────────────────────────────────────────────────────────────────

/// One roster row. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub id: CellValue,
    /// Missing names never match by name
    pub name: Option<String>,
    pub serial: Option<CellValue>,
}

impl StudentRecord {
    pub fn new(id: impl Into<CellValue>, name: impl Into<String>, serial: impl Into<CellValue>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
            serial: Some(serial.into()),
        }
    }

    /// A record with only an id, as left behind by a partially filled row
    pub fn id_only(id: impl Into<CellValue>) -> Self {
        Self {
            id: id.into(),
            name: None,
            serial: None,
        }
    }

    /// The id as the search engine and the voucher see it
    pub fn id_string(&self) -> String {
        self.id.to_string()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Serial as printed on the voucher, e.g. `S-12`
    pub fn serial_label(&self) -> String {
        match &self.serial {
            Some(serial) => format!("S-{}", serial),
            None => "S-".to_string(),
        }
    }
}

impl fmt::Display for StudentRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} — {}", self.id, self.name().unwrap_or(""))
    }
}
