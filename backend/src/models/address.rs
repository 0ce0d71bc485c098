//! A1-style cell addresses.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Highest addressable column (`ZZZ`), 0-indexed bound.
pub const MAX_COLUMNS: usize = 18_278;

/// Highest addressable row, 0-indexed bound.
pub const MAX_ROWS: usize = 1_048_576;

/// A single cell within a sheet.
///
/// Rows and columns are **0-indexed**: `row = 0` is sheet row `1`,
/// `col = 0` is column `A`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

impl CellRef {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Convert to A1 notation (e.g. `A1`, `BC32`).
    pub fn to_a1(self) -> String {
        format!("{}{}", column_name(self.col), self.row + 1)
    }

    /// Parse an A1-style reference (e.g. `A1`, `$B$2`).
    pub fn from_a1(a1: &str) -> Result<Self, AddressError> {
        let s = a1.trim();
        if s.is_empty() {
            return Err(AddressError::Empty);
        }

        let bytes = s.as_bytes();
        let mut idx = 0usize;
        if bytes.get(idx) == Some(&b'$') {
            idx += 1;
        }

        let col_start = idx;
        while idx < bytes.len() && bytes[idx].is_ascii_alphabetic() {
            idx += 1;
        }
        if idx == col_start {
            return Err(AddressError::MissingColumn(s.to_string()));
        }
        let col_str = &s[col_start..idx];

        if bytes.get(idx) == Some(&b'$') {
            idx += 1;
        }

        let row_start = idx;
        while idx < bytes.len() && bytes[idx].is_ascii_digit() {
            idx += 1;
        }
        if idx == row_start {
            return Err(AddressError::MissingRow(s.to_string()));
        }
        if idx != bytes.len() {
            return Err(AddressError::TrailingCharacters(s.to_string()));
        }

        let col = column_index(col_str).ok_or_else(|| AddressError::InvalidColumn(s.to_string()))?;
        let row: usize = s[row_start..idx]
            .parse()
            .map_err(|_| AddressError::InvalidRow(s.to_string()))?;
        if row == 0 || row > MAX_ROWS {
            return Err(AddressError::InvalidRow(s.to_string()));
        }

        Ok(Self { row: row - 1, col })
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1())
    }
}

/// A rectangular, inclusive block of cells.
///
/// Always normalized so that `start` is the top-left corner.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start: CellRef,
    pub end: CellRef,
}

impl Range {
    pub fn new(a: CellRef, b: CellRef) -> Self {
        Self {
            start: CellRef::new(a.row.min(b.row), a.col.min(b.col)),
            end: CellRef::new(a.row.max(b.row), a.col.max(b.col)),
        }
    }

    pub fn single(cell: CellRef) -> Self {
        Self { start: cell, end: cell }
    }

    pub fn contains(&self, cell: CellRef) -> bool {
        cell.row >= self.start.row
            && cell.row <= self.end.row
            && cell.col >= self.start.col
            && cell.col <= self.end.col
    }

    pub fn intersects(&self, other: &Range) -> bool {
        self.start.row <= other.end.row
            && other.start.row <= self.end.row
            && self.start.col <= other.end.col
            && other.start.col <= self.end.col
    }

    pub fn is_single_cell(&self) -> bool {
        self.start == self.end
    }

    /// Every cell of the range, row by row.
    pub fn cells(&self) -> impl Iterator<Item = CellRef> + '_ {
        (self.start.row..=self.end.row)
            .flat_map(move |row| (self.start.col..=self.end.col).map(move |col| CellRef::new(row, col)))
    }

    /// Parse `A1:B2` or a single-cell reference like `C3`.
    pub fn from_a1(a1: &str) -> Result<Self, AddressError> {
        let s = a1.trim();
        if s.is_empty() {
            return Err(AddressError::Empty);
        }
        match s.split_once(':') {
            None => CellRef::from_a1(s).map(Range::single),
            Some((a, b)) => Ok(Range::new(CellRef::from_a1(a)?, CellRef::from_a1(b)?)),
        }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single_cell() {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}:{}", self.start, self.end)
        }
    }
}

/// Errors when parsing an A1 reference.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("empty cell reference")]
    Empty,

    #[error("missing column in '{0}'")]
    MissingColumn(String),

    #[error("missing row in '{0}'")]
    MissingRow(String),

    #[error("invalid column in '{0}'")]
    InvalidColumn(String),

    #[error("invalid row in '{0}'")]
    InvalidRow(String),

    #[error("trailing characters in '{0}'")]
    TrailingCharacters(String),
}

/// Column letters for a 0-based column index (`0` → `A`, `26` → `AA`).
pub fn column_name(col: usize) -> String {
    let mut n = col + 1;
    let mut out = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        out.push(char::from(b'A' + rem as u8));
        n = (n - 1) / 26;
    }
    out.iter().rev().collect()
}

fn column_index(letters: &str) -> Option<usize> {
    let mut col: usize = 0;
    for b in letters.bytes() {
        if !b.is_ascii_alphabetic() {
            return None;
        }
        let v = (b.to_ascii_uppercase() - b'A') as usize + 1;
        col = col.checked_mul(26)?.checked_add(v)?;
        if col > MAX_COLUMNS {
            return None;
        }
    }
    col.checked_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_address() {
        assert_eq!(CellRef::from_a1("A1").unwrap(), CellRef::new(0, 0));
        assert_eq!(CellRef::from_a1("B12").unwrap(), CellRef::new(11, 1));
        assert_eq!(CellRef::from_a1("$AA$3").unwrap(), CellRef::new(2, 26));
    }

    #[test]
    fn test_address_display() {
        assert_eq!(CellRef::new(31, 54).to_a1(), "BC32");
        assert_eq!(column_name(25), "Z");
        assert_eq!(column_name(26), "AA");
    }

    #[test]
    fn test_invalid_addresses() {
        assert!(matches!(CellRef::from_a1("A0"), Err(AddressError::InvalidRow(_))));
        assert!(matches!(CellRef::from_a1("12"), Err(AddressError::MissingColumn(_))));
        assert!(matches!(CellRef::from_a1("AB"), Err(AddressError::MissingRow(_))));
        assert!(matches!(CellRef::from_a1("A1x"), Err(AddressError::TrailingCharacters(_))));
        assert!(matches!(CellRef::from_a1("ZZZZ1"), Err(AddressError::InvalidColumn(_))));
        assert_eq!(CellRef::from_a1(""), Err(AddressError::Empty));
    }

    #[test]
    fn test_range_normalized() {
        let range = Range::from_a1("C3:A1").unwrap();
        assert_eq!(range.start, CellRef::new(0, 0));
        assert_eq!(range.end, CellRef::new(2, 2));
        assert_eq!(range.to_string(), "A1:C3");
        assert_eq!(range.cells().count(), 9);
    }

    #[test]
    fn test_range_intersects() {
        let a = Range::from_a1("A1:B2").unwrap();
        assert!(a.intersects(&Range::from_a1("B2").unwrap()));
        assert!(!a.intersects(&Range::from_a1("C3").unwrap()));
        assert!(a.contains(CellRef::new(1, 1)));
    }
}
