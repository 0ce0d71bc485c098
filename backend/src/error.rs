//! Error types for the transcoding pipeline.
//!
//! - [`SourceError`] - Reading from a data source
//! - [`SinkError`] - Writing to a data sink
//! - [`ConfigurationError`] - Missing datasets, bad row numbers (fatal)
//! - [`CompileError`] - The transcoding table yields no mapping (fatal)
//! - [`FieldNotFoundError`] - A source column cannot be located (per field)
//! - [`WriteResolutionError`] - A destination field cannot be written (per field)
//! - [`WorkbookError`] - Loading or saving a workbook directory
//! - [`TranscodeError`] - Top-level, carries the stage that aborted
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use std::fmt;
use thiserror::Error;

use crate::models::AddressError;

// =============================================================================
// Data source / sink errors
// =============================================================================

/// Errors raised by a [`crate::workbook::DataSource`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("Dataset '{0}' does not exist")]
    DatasetNotFound(String),
}

/// Errors raised by a [`crate::workbook::DataSink`] when committing a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    #[error("Dataset '{0}' does not exist")]
    DatasetNotFound(String),

    #[error("Range {0} is protected")]
    Protected(String),
}

// =============================================================================
// Fatal errors
// =============================================================================

/// Structural problems that abort the whole invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("Dataset '{0}' does not exist")]
    DatasetNotFound(String),

    #[error("Invalid row {0}: rows are numbered from 1")]
    InvalidRow(usize),

    #[error("Invalid header row {0}: rows are numbered from 1")]
    InvalidHeaderRow(usize),

    #[error("Unknown input kind '{0}' (expected numeric, letter, alphanumeric or any)")]
    UnknownInputKind(String),

    #[error("Invalid value for {key}: {message}")]
    InvalidSetting { key: String, message: String },
}

impl From<SourceError> for ConfigurationError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::DatasetNotFound(name) => ConfigurationError::DatasetNotFound(name),
        }
    }
}

/// Rule compilation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// No rule had both a source and a destination field.
    #[error("Transcoding table yields an empty mapping ({rules} rule(s) read, none usable); check the in/out columns")]
    EmptyMapping { rules: usize },
}

// =============================================================================
// Per-field errors
// =============================================================================

/// A source field that could not be located. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldNotFoundError {
    #[error("Dataset '{dataset}' does not exist (looking for '{field}')")]
    UnknownDataset { dataset: String, field: String },

    #[error("Value '{field}' not found in header row {header_row} of '{dataset}'")]
    MissingHeader {
        dataset: String,
        field: String,
        header_row: usize,
    },
}

impl FieldNotFoundError {
    pub fn field(&self) -> &str {
        match self {
            FieldNotFoundError::UnknownDataset { field, .. }
            | FieldNotFoundError::MissingHeader { field, .. } => field,
        }
    }
}

/// A destination field that could not be written. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WriteResolutionError {
    #[error("Unable to resolve a write target for '{field}'")]
    Unresolved { field: String },

    #[error("Error writing to '{field}' at {target}: {source}")]
    WriteFailed {
        field: String,
        target: String,
        #[source]
        source: SinkError,
    },
}

impl WriteResolutionError {
    pub fn field(&self) -> &str {
        match self {
            WriteResolutionError::Unresolved { field }
            | WriteResolutionError::WriteFailed { field, .. } => field,
        }
    }
}

// =============================================================================
// Workbook directory errors
// =============================================================================

/// Errors loading or saving a workbook directory.
#[derive(Debug, Error)]
pub enum WorkbookError {
    #[error("Workbook IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error in '{file}': {message}")]
    Csv { file: String, message: String },

    #[error("Invalid workbook manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("Invalid reference '{reference}': {message}")]
    InvalidReference { reference: String, message: String },

    #[error("Sheet '{0}' does not exist")]
    UnknownSheet(String),
}

impl WorkbookError {
    pub(crate) fn csv(file: &str, err: impl fmt::Display) -> Self {
        WorkbookError::Csv {
            file: file.to_string(),
            message: err.to_string(),
        }
    }

    pub(crate) fn invalid_reference(reference: &str, err: AddressError) -> Self {
        WorkbookError::InvalidReference {
            reference: reference.to_string(),
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Top-level errors
// =============================================================================

/// Pipeline stage, reported when an invocation aborts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    CheckDatasets,
    LoadRules,
    CompileRules,
    ExtractRow,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::CheckDatasets => "check-datasets",
            Stage::LoadRules => "load-rules",
            Stage::CompileRules => "compile-rules",
            Stage::ExtractRow => "extract-row",
        };
        f.write_str(name)
    }
}

/// Fatal errors of a transcoding invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranscodeError {
    #[error("Aborted at stage '{stage}': {source}")]
    Configuration {
        stage: Stage,
        #[source]
        source: ConfigurationError,
    },

    #[error("Aborted at stage 'compile-rules': {0}")]
    EmptyMapping(#[from] CompileError),
}

impl TranscodeError {
    pub(crate) fn config(stage: Stage) -> impl FnOnce(ConfigurationError) -> Self {
        move |source| TranscodeError::Configuration { stage, source }
    }

    /// Stage reached before the abort.
    pub fn stage(&self) -> Stage {
        match self {
            TranscodeError::Configuration { stage, .. } => *stage,
            TranscodeError::EmptyMapping(_) => Stage::CompileRules,
        }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for data source reads.
pub type SourceResult<T> = Result<T, SourceError>;

/// Result type for rule compilation.
pub type CompileResult<T> = Result<T, CompileError>;

/// Result type for workbook directory operations.
pub type WorkbookResult<T> = Result<T, WorkbookError>;

/// Result type for a whole transcoding invocation.
pub type TranscodeResult<T> = Result<T, TranscodeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_error_converts_to_configuration() {
        let err: ConfigurationError = SourceError::DatasetNotFound("Input".into()).into();
        assert_eq!(err, ConfigurationError::DatasetNotFound("Input".into()));
    }

    #[test]
    fn test_transcode_error_reports_stage() {
        let err = TranscodeError::config(Stage::LoadRules)(ConfigurationError::DatasetNotFound("Transco".into()));
        assert_eq!(err.stage(), Stage::LoadRules);
        let msg = err.to_string();
        assert!(msg.contains("load-rules"));
        assert!(msg.contains("Transco"));

        let err: TranscodeError = CompileError::EmptyMapping { rules: 3 }.into();
        assert_eq!(err.stage(), Stage::CompileRules);
        assert!(err.to_string().contains("empty mapping"));
    }

    #[test]
    fn test_write_failure_format() {
        let err = WriteResolutionError::WriteFailed {
            field: "Title".into(),
            target: "Out!B2".into(),
            source: SinkError::Protected("Out!B2".into()),
        };
        let msg = err.to_string();
        assert!(msg.contains("Title"));
        assert!(msg.contains("protected"));
        assert_eq!(err.field(), "Title");
    }
}
