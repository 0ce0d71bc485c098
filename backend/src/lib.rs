//! # Transco - transcode spreadsheet rows through a rule table
//!
//! A transcoding table maps source columns to destination fields. Transco
//! compiles that table, extracts one row of a source dataset and writes each
//! destination field to a named region or cell of a destination dataset.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Transco    │────▶│  Compiler   │────▶│  Extractor  │────▶│   Writer    │
//! │  table      │     │  (mapping)  │     │ (+resolver) │     │ (name/cell) │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use transco::{load_dir, transcode_and_copy, LogBroadcaster, TranscodeOptions, TranscodeRequest};
//!
//! let mut book = load_dir("book/")?;
//! let source = book.clone();
//! let report = transcode_and_copy(
//!     &source,
//!     &mut book,
//!     &TranscodeRequest::new("Catalog", "Form", "Transco", 2),
//!     &TranscodeOptions::default(),
//!     &LogBroadcaster::new(),
//! )?;
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types per concern
//! - [`models`] - Rules, mappings, records, cell addresses
//! - [`workbook`] - Data source/sink traits, in-memory and directory workbooks
//! - [`parser`] - CSV decoding and export
//! - [`transform`] - Compiler, resolver, extractor, writer, pipeline
//! - [`config`] - Invocation options
//! - [`input`] - Typed interactive prompts
//! - [`logs`] - Log sink and broadcaster

// Core modules
pub mod error;
pub mod models;

// I/O
pub mod parser;
pub mod workbook;

// Transcoding
pub mod transform;

pub mod config;
pub mod input;
pub mod logs;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    CompileError, ConfigurationError, FieldNotFoundError, SinkError, SourceError, Stage, TranscodeError,
    TranscodeResult, WorkbookError, WriteResolutionError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    CellLocation, CellRef, CompiledMapping, ExtractedRecord, MappingEntry, Range, RawRule, Value, WriteTarget,
};

// =============================================================================
// Re-exports - Workbook
// =============================================================================

pub use workbook::directory::{load_dir, save_sheet, Manifest, MANIFEST_FILE};
pub use workbook::{DataSink, DataSource, Sheet, Workbook};

// =============================================================================
// Re-exports - CSV
// =============================================================================

pub use parser::{
    decode_content, detect_delimiter, detect_encoding, export_text_safe, parse_bytes_auto, CsvError, ParsedGrid,
};

// =============================================================================
// Re-exports - Transcoding
// =============================================================================

pub use transform::{
    compile, extract_row, load_rules, resolve_field_index, resolve_target, transcode_and_copy, FieldResolver,
    TranscodeReport, TranscodeRequest, WriteReport,
};

pub use config::TranscodeOptions;
pub use input::{request_value, request_value_stdin, InputKind};
pub use logs::{LogBroadcaster, LogEntry, LogLevel, LogSink};
