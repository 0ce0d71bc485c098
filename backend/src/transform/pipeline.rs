//! High-level API: transcode one source row and copy it to the destination.
//!
//! # Example
//!
//! ```rust,ignore
//! use transco::{transcode_and_copy, LogBroadcaster, TranscodeOptions, TranscodeRequest};
//!
//! let source = workbook.clone();
//! let report = transcode_and_copy(
//!     &source,
//!     &mut workbook,
//!     &TranscodeRequest::new("Catalog", "Form", "Transco", 2),
//!     &TranscodeOptions::default(),
//!     &LogBroadcaster::new(),
//! )?;
//! println!("{} field(s) written", report.written_count());
//! ```

use serde::{Deserialize, Serialize};

use crate::config::TranscodeOptions;
use crate::error::{ConfigurationError, Stage, TranscodeError, TranscodeResult, WriteResolutionError};
use crate::logs::LogSink;
use crate::models::{CompiledMapping, ExtractedRecord};
use crate::transform::compiler::{compile, log_mapping};
use crate::transform::extractor::extract_row;
use crate::transform::resolver::FieldResolver;
use crate::transform::rules::load_rules;
use crate::transform::writer::{write_record, WriteReport, WrittenField};
use crate::workbook::{DataSink, DataSource};

/// What to transcode and where.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscodeRequest {
    pub source_dataset: String,
    pub dest_dataset: String,
    pub transco_dataset: String,
    /// 1-based row of the source dataset
    pub row: usize,
}

impl TranscodeRequest {
    pub fn new(
        source_dataset: impl Into<String>,
        dest_dataset: impl Into<String>,
        transco_dataset: impl Into<String>,
        row: usize,
    ) -> Self {
        Self {
            source_dataset: source_dataset.into(),
            dest_dataset: dest_dataset.into(),
            transco_dataset: transco_dataset.into(),
            row,
        }
    }
}

/// Result of a completed invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscodeReport {
    pub mapping: CompiledMapping,
    pub record: ExtractedRecord,
    pub write: WriteReport,
}

impl TranscodeReport {
    pub fn written(&self) -> &[WrittenField] {
        &self.write.written
    }

    pub fn failures(&self) -> &[WriteResolutionError] {
        &self.write.failures
    }

    pub fn written_count(&self) -> usize {
        self.write.written.len()
    }

    pub fn unresolved_count(&self) -> usize {
        self.record.unresolved.len()
    }
}

/// Transcode `request.row` of the source dataset into the destination.
///
/// Stages: check datasets, load rules, compile, extract, write. Structural
/// problems abort with a [`TranscodeError`] naming the stage; missing source
/// fields and unwritable destination fields are reported and skipped.
pub fn transcode_and_copy<S, K>(
    source: &S,
    sink: &mut K,
    request: &TranscodeRequest,
    options: &TranscodeOptions,
    log: &dyn LogSink,
) -> TranscodeResult<TranscodeReport>
where
    S: DataSource + ?Sized,
    K: DataSink + ?Sized,
{
    let result = run_stages(source, sink, request, options, log);
    if let Err(err) = &result {
        log.error(&err.to_string());
    }
    result
}

fn run_stages<S, K>(
    source: &S,
    sink: &mut K,
    request: &TranscodeRequest,
    options: &TranscodeOptions,
    log: &dyn LogSink,
) -> TranscodeResult<TranscodeReport>
where
    S: DataSource + ?Sized,
    K: DataSink + ?Sized,
{
    // 1. Check datasets
    check_request(source, sink, request, options).map_err(TranscodeError::config(Stage::CheckDatasets))?;
    log.info(&format!(
        "📖 Transcoding row {} of '{}' into '{}' using '{}'",
        request.row, request.source_dataset, request.dest_dataset, request.transco_dataset
    ));

    // 2. Load rules
    let rules = load_rules(source, &request.transco_dataset)
        .map_err(|e| TranscodeError::config(Stage::LoadRules)(e.into()))?;
    log.success(&format!("Read {} transcoding rule(s)", rules.len()));

    // 3. Compile
    let mapping = compile(&rules, log)?;
    log_mapping(&mapping, log);

    // 4. Extract
    let mut resolver = FieldResolver::new(source);
    let record = extract_row(
        &mut resolver,
        &request.source_dataset,
        options.header_row,
        &mapping,
        request.row,
        log,
    )
    .map_err(|e| TranscodeError::config(Stage::ExtractRow)(e.into()))?;

    // 5. Write
    log.info(&format!("✍️  Writing {} field(s) to '{}'", record.fields.len(), request.dest_dataset));
    let write = write_record(
        sink,
        &record,
        &mapping,
        &request.dest_dataset,
        &options.join_separator,
        log,
    );

    let report = TranscodeReport { mapping, record, write };
    log.success(&format!(
        "Transcoding completed successfully: {} field(s) written, {} write failure(s), {} unresolved source field(s)",
        report.written_count(),
        report.failures().len(),
        report.unresolved_count()
    ));

    Ok(report)
}

fn check_request<S, K>(
    source: &S,
    sink: &K,
    request: &TranscodeRequest,
    options: &TranscodeOptions,
) -> Result<(), ConfigurationError>
where
    S: DataSource + ?Sized,
    K: DataSink + ?Sized,
{
    for dataset in [&request.source_dataset, &request.transco_dataset] {
        if !source.has_dataset(dataset) {
            return Err(ConfigurationError::DatasetNotFound(dataset.clone()));
        }
    }
    if !sink.has_destination(&request.dest_dataset) {
        return Err(ConfigurationError::DatasetNotFound(request.dest_dataset.clone()));
    }
    if request.row == 0 {
        return Err(ConfigurationError::InvalidRow(request.row));
    }
    options.validate()
}
