//! Field resolver: source field name → column index.
//!
//! Header rows are read once into a snapshot and every lookup result is
//! cached for the lifetime of the resolver, so a mapping that names the same
//! column many times scans the header once.

use std::collections::HashMap;

use crate::error::FieldNotFoundError;
use crate::workbook::DataSource;

/// Zero-based index of the first header cell equal to `field` (exact,
/// case-sensitive, untrimmed) in row `header_row` of `dataset`.
pub fn resolve_field_index<S: DataSource + ?Sized>(
    source: &S,
    dataset: &str,
    header_row: usize,
    field: &str,
) -> Result<usize, FieldNotFoundError> {
    let headers = source
        .header_row(dataset, header_row)
        .map_err(|_| FieldNotFoundError::UnknownDataset {
            dataset: dataset.to_string(),
            field: field.to_string(),
        })?;
    find_in_header(&headers, dataset, header_row, field)
}

fn find_in_header(
    headers: &[String],
    dataset: &str,
    header_row: usize,
    field: &str,
) -> Result<usize, FieldNotFoundError> {
    headers
        .iter()
        .position(|h| h.as_bytes() == field.as_bytes())
        .ok_or_else(|| FieldNotFoundError::MissingHeader {
            dataset: dataset.to_string(),
            field: field.to_string(),
            header_row,
        })
}

/// Caching resolver bound to one data source for one invocation.
pub struct FieldResolver<'a, S: DataSource + ?Sized> {
    source: &'a S,
    /// (dataset, header row) → header cells, `None` if the dataset is missing
    headers: HashMap<(String, usize), Option<Vec<String>>>,
    /// (dataset, header row, field) → resolution
    indices: HashMap<(String, usize, String), Result<usize, FieldNotFoundError>>,
}

impl<'a, S: DataSource + ?Sized> FieldResolver<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            headers: HashMap::new(),
            indices: HashMap::new(),
        }
    }

    pub fn source(&self) -> &'a S {
        self.source
    }

    pub fn resolve(&mut self, dataset: &str, header_row: usize, field: &str) -> Result<usize, FieldNotFoundError> {
        let key = (dataset.to_string(), header_row, field.to_string());
        if let Some(cached) = self.indices.get(&key) {
            return cached.clone();
        }

        let source = self.source;
        let headers = self
            .headers
            .entry((dataset.to_string(), header_row))
            .or_insert_with(|| source.header_row(dataset, header_row).ok());

        let result = match headers {
            Some(headers) => find_in_header(headers, dataset, header_row, field),
            None => Err(FieldNotFoundError::UnknownDataset {
                dataset: dataset.to_string(),
                field: field.to_string(),
            }),
        };

        self.indices.insert(key, result.clone());
        result
    }

    /// Number of header rows read so far.
    pub fn header_reads(&self) -> usize {
        self.headers.len()
    }
}
