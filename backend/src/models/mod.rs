//! Domain models for the transcoding pipeline.
//!
//! - [`Value`] - A typed cell value read from a dataset
//! - [`RawRule`] - One row of the transcoding table
//! - [`CompiledMapping`] - Destination field → sources + split delimiter
//! - [`ExtractedRecord`] - Values pulled from one source row
//! - [`WriteTarget`] - Where a destination field was written

pub mod address;

use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use address::{AddressError, CellRef, Range};

use crate::error::FieldNotFoundError;

/// Fixed output format for calendar dates.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

// =============================================================================
// Cell values
// =============================================================================

/// A cell value as handed out by a data source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    Text(String),
    Number(f64),
    Bool(bool),
    /// Calendar date.
    Date(NaiveDate),
    /// Date with a time of day; only the date part is ever rendered.
    DateTime(NaiveDateTime),
    #[default]
    Empty,
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Value::Empty => true,
            Value::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// String form used for extraction and export.
    ///
    /// Dates render as `DD/MM/YYYY` whatever the locale; numbers use their
    /// shortest round-trip form (`3`, not `3.0`).
    pub fn to_cell_string(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Number(n) => format_number(*n),
            Value::Bool(b) => b.to_string(),
            Value::Date(d) => d.format(DATE_FORMAT).to_string(),
            Value::DateTime(dt) => dt.date().format(DATE_FORMAT).to_string(),
            Value::Empty => String::new(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_cell_string())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

/// Shortest round-trip form; exponent notation from 1e21 up and below 1e-6,
/// written `1e+21` / `1e-7`.
fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        // keeps -0 from rendering as "-0"
        return "0".to_string();
    }

    let abs = n.abs();
    if abs >= 1e21 || abs < 1e-6 {
        let formatted = format!("{:e}", n);
        return match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => format!("{}e+{}", mantissa, exponent),
            _ => formatted,
        };
    }
    n.to_string()
}

// =============================================================================
// Transcoding rules
// =============================================================================

/// One row of the transcoding table, as read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRule {
    /// 1-based row of the transcoding table this rule came from.
    pub row: usize,
    pub source_field: Option<String>,
    pub dest_field: Option<String>,
    pub split_delimiter: Option<String>,
}

impl RawRule {
    /// Build a rule from non-blank cells; blank strings become `None`.
    pub fn new(row: usize, source_field: &str, dest_field: &str, split_delimiter: Option<&str>) -> Self {
        Self {
            row,
            source_field: non_blank(source_field),
            dest_field: non_blank(dest_field),
            split_delimiter: split_delimiter.and_then(non_blank),
        }
    }
}

fn non_blank(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Compiled sources for one destination field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingEntry {
    /// Source field names in table order; duplicates allowed.
    pub sources: Vec<String>,
    pub split_delimiter: Option<String>,
}

/// Destination field → [`MappingEntry`], in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompiledMapping {
    entries: IndexMap<String, MappingEntry>,
}

impl CompiledMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, dest_field: &str) -> Option<&MappingEntry> {
        self.entries.get(dest_field)
    }

    pub fn dest_fields(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MappingEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub(crate) fn entry_mut(&mut self, dest_field: &str) -> &mut MappingEntry {
        self.entries
            .entry(dest_field.to_string())
            .or_insert_with(|| MappingEntry {
                sources: Vec::new(),
                split_delimiter: None,
            })
    }
}

// =============================================================================
// Extraction
// =============================================================================

/// Values extracted from one source row, keyed by destination field.
///
/// Every destination field of the mapping is present, possibly with no values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedRecord {
    pub fields: IndexMap<String, Vec<String>>,
    /// Source fields that could not be located for this row.
    pub unresolved: Vec<FieldNotFoundError>,
}

impl ExtractedRecord {
    pub fn values(&self, dest_field: &str) -> Option<&[String]> {
        self.fields.get(dest_field).map(Vec::as_slice)
    }
}

// =============================================================================
// Write targets
// =============================================================================

/// A block of cells on a named sheet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellLocation {
    pub sheet: String,
    pub range: Range,
}

impl CellLocation {
    pub fn new(sheet: impl Into<String>, range: Range) -> Self {
        Self {
            sheet: sheet.into(),
            range,
        }
    }
}

impl fmt::Display for CellLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}!{}", self.sheet, self.range)
    }
}

/// Where a destination field resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WriteTarget {
    /// Workbook-wide named region called exactly like the field.
    NamedGlobal { name: String, location: CellLocation },
    /// Named region `<destination>!<field>`.
    NamedScoped { name: String, location: CellLocation },
    /// The field itself is an A1 address on the destination sheet.
    CellAddress { location: CellLocation },
}

impl WriteTarget {
    pub fn location(&self) -> &CellLocation {
        match self {
            WriteTarget::NamedGlobal { location, .. }
            | WriteTarget::NamedScoped { location, .. }
            | WriteTarget::CellAddress { location } => location,
        }
    }
}

impl fmt::Display for WriteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteTarget::NamedGlobal { name, location } => write!(f, "named range '{}' ({})", name, location),
            WriteTarget::NamedScoped { name, location } => write!(f, "scoped range '{}' ({})", name, location),
            WriteTarget::CellAddress { location } => write!(f, "cell {}", location),
        }
    }
}
