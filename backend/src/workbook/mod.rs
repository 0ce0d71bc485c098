//! Tabular data source and sink.
//!
//! The transcoding core only talks to datasets through [`DataSource`] and
//! [`DataSink`]. [`Workbook`] is the in-memory implementation of both; it can
//! be loaded from and saved to a directory of CSV files (see [`directory`]).

pub mod directory;
pub mod memory;

pub use memory::{Sheet, Workbook};

use crate::error::{SinkError, SourceResult};
use crate::models::{CellLocation, CellRef, Value};

/// Read side of a workbook.
///
/// Rows are 1-based (as shown to users), columns 0-based.
pub trait DataSource {
    fn has_dataset(&self, dataset: &str) -> bool;

    /// Cells of one row rendered as strings, left to right.
    fn header_row(&self, dataset: &str, row: usize) -> SourceResult<Vec<String>>;

    /// A single cell; anything outside the populated area reads as [`Value::Empty`].
    fn cell_value(&self, dataset: &str, row: usize, col: usize) -> SourceResult<Value>;

    fn all_rows(&self, dataset: &str) -> SourceResult<Vec<Vec<Value>>>;
}

/// Write side of a workbook.
pub trait DataSink {
    /// Whether `dataset` exists and can be written to.
    fn has_destination(&self, dataset: &str) -> bool;

    /// Cells bound to a named region, if the name exists.
    fn named_region(&self, name: &str) -> Option<CellLocation>;

    /// A literal address on a dataset, if the dataset exists.
    fn cell_address(&self, dataset: &str, address: CellRef) -> Option<CellLocation>;

    /// Set every cell of `location` to `text`.
    fn write(&mut self, location: &CellLocation, text: &str) -> Result<(), SinkError>;
}
