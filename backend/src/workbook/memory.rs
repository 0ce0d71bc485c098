//! In-memory workbook: sheets, named ranges and protected ranges.

use std::collections::HashMap;

use indexmap::IndexMap;

use super::{DataSink, DataSource};
use crate::error::{SinkError, SourceError, SourceResult, WorkbookError, WorkbookResult};
use crate::models::{CellLocation, CellRef, Range, Value};
use crate::parser::infer_value;

/// A grid of values. Rows may be ragged; missing cells read as empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    name: String,
    rows: Vec<Vec<Value>>,
    /// Loaded text of cells whose value renders differently (dates, date-times).
    /// Dropped as soon as the cell is set.
    raw: HashMap<CellRef, String>,
    /// Delimiter of the file the sheet was loaded from.
    delimiter: Option<char>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_rows(name, Vec::new())
    }

    pub fn from_rows(name: impl Into<String>, rows: Vec<Vec<Value>>) -> Self {
        Self {
            name: name.into(),
            rows,
            raw: HashMap::new(),
            delimiter: None,
        }
    }

    /// Type raw CSV cells, remembering the text of any cell that would not
    /// render back identically.
    pub fn from_records(name: impl Into<String>, records: Vec<Vec<String>>, delimiter: char) -> Self {
        let mut raw = HashMap::new();
        let rows = records
            .into_iter()
            .enumerate()
            .map(|(r, record)| {
                record
                    .into_iter()
                    .enumerate()
                    .map(|(c, text)| {
                        let value = infer_value(&text);
                        if value.to_cell_string() != text {
                            raw.insert(CellRef::new(r, c), text);
                        }
                        value
                    })
                    .collect()
            })
            .collect();

        Self {
            name: name.into(),
            rows,
            raw,
            delimiter: Some(delimiter),
        }
    }

    /// Convenience for fixtures: every cell becomes [`Value::Text`], blanks [`Value::Empty`].
    pub fn from_text_rows(name: impl Into<String>, rows: &[&[&str]]) -> Self {
        let rows = rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| if cell.is_empty() { Value::Empty } else { Value::text(*cell) })
                    .collect()
            })
            .collect();
        Self::from_rows(name, rows)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn delimiter(&self) -> Option<char> {
        self.delimiter
    }

    pub fn get(&self, cell: CellRef) -> &Value {
        static EMPTY: Value = Value::Empty;
        self.rows
            .get(cell.row)
            .and_then(|row| row.get(cell.col))
            .unwrap_or(&EMPTY)
    }

    /// Text of a cell as it should be saved: the loaded text if the cell is
    /// untouched, otherwise its rendered value.
    pub fn cell_text(&self, cell: CellRef) -> String {
        match self.raw.get(&cell) {
            Some(text) => text.clone(),
            None => self.get(cell).to_cell_string(),
        }
    }

    /// Every row as saved text (see [`Sheet::cell_text`]).
    pub fn text_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .enumerate()
            .map(|(r, row)| (0..row.len()).map(|c| self.cell_text(CellRef::new(r, c))).collect())
            .collect()
    }

    /// Set a cell, growing the grid as needed.
    pub fn set(&mut self, cell: CellRef, value: Value) {
        if self.rows.len() <= cell.row {
            self.rows.resize_with(cell.row + 1, Vec::new);
        }
        let row = &mut self.rows[cell.row];
        if row.len() <= cell.col {
            row.resize(cell.col + 1, Value::Empty);
        }
        row[cell.col] = value;
        self.raw.remove(&cell);
    }
}

/// A set of sheets plus the named and protected ranges defined over them.
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    sheets: IndexMap<String, Sheet>,
    names: IndexMap<String, CellLocation>,
    protected: Vec<CellLocation>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a sheet.
    pub fn add_sheet(&mut self, sheet: Sheet) {
        self.sheets.insert(sheet.name.clone(), sheet);
    }

    pub fn with_sheet(mut self, sheet: Sheet) -> Self {
        self.add_sheet(sheet);
        self
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.get(name)
    }

    pub fn sheets(&self) -> impl Iterator<Item = &Sheet> {
        self.sheets.values()
    }

    /// Bind `name` to a block of cells. Names are matched exactly.
    pub fn define_name(&mut self, name: impl Into<String>, location: CellLocation) {
        self.names.insert(name.into(), location);
    }

    /// Bind `name` to a reference such as `Out!B2` or `'My Sheet'!A1:C1`.
    pub fn define_name_a1(&mut self, name: impl Into<String>, reference: &str) -> WorkbookResult<()> {
        let location = parse_reference(reference)?;
        if !self.sheets.contains_key(&location.sheet) {
            return Err(WorkbookError::UnknownSheet(location.sheet));
        }
        self.define_name(name, location);
        Ok(())
    }

    pub fn with_name(mut self, name: &str, reference: &str) -> WorkbookResult<Self> {
        self.define_name_a1(name, reference)?;
        Ok(self)
    }

    /// Reject writes touching `location`.
    pub fn protect(&mut self, location: CellLocation) {
        self.protected.push(location);
    }

    pub fn protect_a1(&mut self, reference: &str) -> WorkbookResult<()> {
        let location = parse_reference(reference)?;
        self.protect(location);
        Ok(())
    }

    pub fn protected(&self) -> &[CellLocation] {
        &self.protected
    }

    fn is_protected(&self, location: &CellLocation) -> bool {
        self.protected
            .iter()
            .any(|p| p.sheet == location.sheet && p.range.intersects(&location.range))
    }

    fn sheet_or_err(&self, dataset: &str) -> SourceResult<&Sheet> {
        self.sheets
            .get(dataset)
            .ok_or_else(|| SourceError::DatasetNotFound(dataset.to_string()))
    }
}

impl DataSource for Workbook {
    fn has_dataset(&self, dataset: &str) -> bool {
        self.sheets.contains_key(dataset)
    }

    fn header_row(&self, dataset: &str, row: usize) -> SourceResult<Vec<String>> {
        let sheet = self.sheet_or_err(dataset)?;
        let cells = row
            .checked_sub(1)
            .and_then(|idx| sheet.rows.get(idx))
            .map(|cells| cells.iter().map(Value::to_cell_string).collect())
            .unwrap_or_default();
        Ok(cells)
    }

    fn cell_value(&self, dataset: &str, row: usize, col: usize) -> SourceResult<Value> {
        let sheet = self.sheet_or_err(dataset)?;
        Ok(match row.checked_sub(1) {
            Some(idx) => sheet.get(CellRef::new(idx, col)).clone(),
            None => Value::Empty,
        })
    }

    fn all_rows(&self, dataset: &str) -> SourceResult<Vec<Vec<Value>>> {
        Ok(self.sheet_or_err(dataset)?.rows.clone())
    }
}

impl DataSink for Workbook {
    fn has_destination(&self, dataset: &str) -> bool {
        self.sheets.contains_key(dataset)
    }

    fn named_region(&self, name: &str) -> Option<CellLocation> {
        self.names.get(name).cloned()
    }

    fn cell_address(&self, dataset: &str, address: CellRef) -> Option<CellLocation> {
        self.sheets
            .contains_key(dataset)
            .then(|| CellLocation::new(dataset, Range::single(address)))
    }

    fn write(&mut self, location: &CellLocation, text: &str) -> Result<(), SinkError> {
        if self.is_protected(location) {
            return Err(SinkError::Protected(location.to_string()));
        }
        let sheet = self
            .sheets
            .get_mut(&location.sheet)
            .ok_or_else(|| SinkError::DatasetNotFound(location.sheet.clone()))?;
        let value = if text.is_empty() { Value::Empty } else { Value::text(text) };
        for cell in location.range.cells() {
            sheet.set(cell, value.clone());
        }
        Ok(())
    }
}

/// Parse `Sheet!A1`, `Sheet!A1:B2` or `'Sheet name'!A1`.
pub fn parse_reference(reference: &str) -> WorkbookResult<CellLocation> {
    let (sheet, range) = reference
        .rsplit_once('!')
        .ok_or_else(|| WorkbookError::InvalidReference {
            reference: reference.to_string(),
            message: "expected Sheet!A1".to_string(),
        })?;
    let sheet = sheet
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .unwrap_or(sheet);
    let range = Range::from_a1(range).map_err(|e| WorkbookError::invalid_reference(reference, e))?;
    Ok(CellLocation::new(sheet, range))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workbook() -> Workbook {
        Workbook::new()
            .with_sheet(Sheet::from_text_rows(
                "Input",
                &[&["Name", "City", "Name"], &["Alice", "", "Bob"]],
            ))
            .with_sheet(Sheet::new("Out"))
    }

    #[test]
    fn test_header_row_and_cells() {
        let wb = workbook();
        assert_eq!(wb.header_row("Input", 1).unwrap(), vec!["Name", "City", "Name"]);
        assert!(wb.header_row("Input", 9).unwrap().is_empty());
        assert_eq!(wb.cell_value("Input", 2, 0).unwrap(), Value::text("Alice"));
        assert_eq!(wb.cell_value("Input", 2, 1).unwrap(), Value::Empty);
        assert_eq!(wb.cell_value("Input", 40, 40).unwrap(), Value::Empty);
        assert_eq!(
            wb.cell_value("Missing", 1, 0),
            Err(SourceError::DatasetNotFound("Missing".into()))
        );
    }

    #[test]
    fn test_write_grows_grid() {
        let mut wb = workbook();
        let location = wb.cell_address("Out", CellRef::from_a1("C3").unwrap()).unwrap();
        wb.write(&location, "hello").unwrap();

        let out = wb.sheet("Out").unwrap();
        assert_eq!(out.row_count(), 3);
        assert_eq!(out.get(CellRef::new(2, 2)), &Value::text("hello"));
        assert_eq!(out.get(CellRef::new(0, 0)), &Value::Empty);
    }

    #[test]
    fn test_write_named_range_fills_every_cell() {
        let mut wb = workbook().with_name("Block", "Out!A1:B2").unwrap();
        let location = wb.named_region("Block").unwrap();
        wb.write(&location, "x").unwrap();

        let out = wb.sheet("Out").unwrap();
        assert_eq!(out.get(CellRef::new(1, 1)), &Value::text("x"));
        assert_eq!(out.get(CellRef::new(0, 1)), &Value::text("x"));
    }

    #[test]
    fn test_protected_range_rejects_write() {
        let mut wb = workbook();
        wb.protect_a1("Out!B1:B10").unwrap();
        let location = wb.cell_address("Out", CellRef::from_a1("B4").unwrap()).unwrap();
        let err = wb.write(&location, "nope").unwrap_err();
        assert!(matches!(err, SinkError::Protected(_)));
    }

    #[test]
    fn test_cell_address_unknown_sheet() {
        let wb = workbook();
        assert!(wb.cell_address("Nope", CellRef::new(0, 0)).is_none());
    }

    #[test]
    fn test_parse_reference() {
        let loc = parse_reference("'My Sheet'!A1:C1").unwrap();
        assert_eq!(loc.sheet, "My Sheet");
        assert_eq!(loc.range.to_string(), "A1:C1");
        assert!(parse_reference("A1").is_err());
        assert!(parse_reference("Out!1A").is_err());
    }

    #[test]
    fn test_define_name_requires_sheet() {
        let mut wb = workbook();
        let err = wb.define_name_a1("X", "Ghost!A1").unwrap_err();
        assert!(matches!(err, WorkbookError::UnknownSheet(_)));
    }
}
