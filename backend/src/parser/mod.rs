//! CSV reading and writing for sheet grids.
//!
//! Reading auto-detects encoding and delimiter, then types each cell
//! losslessly (see [`infer_value`]). Writing produces either a plain grid or
//! the text-safe export format.

use chrono::{NaiveDate, NaiveDateTime};
use csv::{QuoteStyle, ReaderBuilder, WriterBuilder};

use crate::models::{Value, DATE_FORMAT};

/// CSV parsing error with context
#[derive(Debug, Clone, thiserror::Error)]
#[error("Line {line}: {message}")]
pub struct CsvError {
    pub line: usize,
    pub message: String,
}

impl CsvError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParsedGrid {
    /// Every row, header included, as the text found in the file.
    pub records: Vec<Vec<String>>,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::ISO_8859_15.decode(bytes).0.into_owned(),
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        // UTF-8 and anything unknown: lossy UTF-8
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Type a raw CSV cell.
///
/// Only conversions that render back to the exact same text are applied, so
/// `004` and `1.50` stay text while `3` and `2.5` become numbers. ISO dates
/// (`2024-03-05`, `2024-03-05T10:00:00`) and `DD/MM/YYYY` become dates.
pub fn infer_value(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::Empty;
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Value::Date(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        if date.format(DATE_FORMAT).to_string() == raw {
            return Value::Date(date);
        }
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Value::DateTime(dt);
        }
    }
    if let Ok(n) = raw.parse::<f64>() {
        let value = Value::Number(n);
        if n.is_finite() && value.to_cell_string() == raw {
            return value;
        }
    }
    Value::Text(raw.to_string())
}

/// Parse CSV text into rows of raw cell text. The first line is data like any other.
pub fn parse_records(content: &str, delimiter: char) -> Result<Vec<Vec<String>>, CsvError> {
    let delimiter = delimiter_byte(delimiter)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(content.as_bytes());

    let mut records = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(|e| {
            let line = e.position().map(|p| p.line() as usize).unwrap_or(idx + 1);
            CsvError::new(line, e.to_string())
        })?;
        records.push(record.iter().map(str::to_string).collect());
    }

    // A trailing all-blank row is an artefact of the final newline in some exports
    while records.last().is_some_and(|row: &Vec<String>| row.iter().all(String::is_empty)) {
        records.pop();
    }

    Ok(records)
}

/// Parse CSV text into a typed grid (see [`infer_value`]).
pub fn parse_grid(content: &str, delimiter: char) -> Result<Vec<Vec<Value>>, CsvError> {
    let records = parse_records(content, delimiter)?;
    Ok(records
        .iter()
        .map(|row| row.iter().map(|cell| infer_value(cell)).collect())
        .collect())
}

/// Parse CSV bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> Result<ParsedGrid, CsvError> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
    let delimiter = detect_delimiter(content);
    let records = parse_records(content, delimiter)?;

    Ok(ParsedGrid {
        records,
        encoding,
        delimiter,
    })
}

/// Write rows of cell text as plain CSV (quoting only where needed).
pub fn write_records(records: &[Vec<String>], delimiter: char) -> Result<String, CsvError> {
    let mut writer = WriterBuilder::new()
        .flexible(true)
        .delimiter(delimiter_byte(delimiter)?)
        .from_writer(Vec::new());

    for (idx, record) in records.iter().enumerate() {
        writer
            .write_record(record)
            .map_err(|e| CsvError::new(idx + 1, e.to_string()))?;
    }
    finish(writer)
}

/// Text-safe export: `;`-separated, every cell quoted and prefixed with `'`
/// so spreadsheet tools keep leading zeros and dates as typed.
pub fn export_text_safe(rows: &[Vec<Value>]) -> Result<String, CsvError> {
    let mut writer = WriterBuilder::new()
        .flexible(true)
        .delimiter(b';')
        .quote_style(QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    for (idx, row) in rows.iter().enumerate() {
        writer
            .write_record(row.iter().map(|cell| format!("'{}", cell.to_cell_string())))
            .map_err(|e| CsvError::new(idx + 1, e.to_string()))?;
    }
    let mut out = finish(writer)?;
    // No terminator after the last row
    if out.ends_with('\n') {
        out.pop();
    }
    Ok(out)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String, CsvError> {
    let bytes = writer
        .into_inner()
        .map_err(|e| CsvError::new(0, e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| CsvError::new(0, e.to_string()))
}

fn delimiter_byte(delimiter: char) -> Result<u8, CsvError> {
    u8::try_from(delimiter)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| CsvError::new(0, format!("Unsupported delimiter '{}'", delimiter)))
}
