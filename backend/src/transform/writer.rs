//! Writer resolver: join extracted values and commit them to the sink.
//!
//! Targets are resolved by trying [`RESOLUTION_ORDER`] in sequence; each
//! strategy either yields a [`WriteTarget`] or passes. Failures are per field
//! and never stop the remaining fields.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::WriteResolutionError;
use crate::logs::LogSink;
use crate::models::{CellRef, CompiledMapping, ExtractedRecord, MappingEntry, WriteTarget};
use crate::workbook::DataSink;

/// Separator used to join values of a field without a split delimiter.
pub const DEFAULT_JOIN_SEPARATOR: &str = ", ";

static CELL_ADDRESS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]+[0-9]+$").expect("cell address pattern"));

/// One way of locating the cells a destination field refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetStrategy {
    /// A named region called exactly like the field.
    GlobalName,
    /// A named region called `<destination>!<field>`.
    ScopedName,
    /// The field is itself an address such as `B12` on the destination.
    CellAddress,
}

/// Strategies in priority order; the first to resolve wins.
pub const RESOLUTION_ORDER: [TargetStrategy; 3] = [
    TargetStrategy::GlobalName,
    TargetStrategy::ScopedName,
    TargetStrategy::CellAddress,
];

impl TargetStrategy {
    pub fn resolve<K: DataSink + ?Sized>(&self, sink: &K, field: &str, destination: &str) -> Option<WriteTarget> {
        match self {
            TargetStrategy::GlobalName => sink.named_region(field).map(|location| WriteTarget::NamedGlobal {
                name: field.to_string(),
                location,
            }),
            TargetStrategy::ScopedName => {
                let name = format!("{}!{}", destination, field);
                sink.named_region(&name)
                    .map(|location| WriteTarget::NamedScoped { name, location })
            }
            TargetStrategy::CellAddress => {
                if !is_cell_address(field) {
                    return None;
                }
                let cell = CellRef::from_a1(field).ok()?;
                sink.cell_address(destination, cell)
                    .map(|location| WriteTarget::CellAddress { location })
            }
        }
    }
}

/// Uppercase column letters followed by digits, nothing else (`B2`, `AA10`).
pub fn is_cell_address(field: &str) -> bool {
    CELL_ADDRESS.is_match(field)
}

/// Resolve where `field` should be written on `destination`.
pub fn resolve_target<K: DataSink + ?Sized>(sink: &K, field: &str, destination: &str) -> Option<WriteTarget> {
    RESOLUTION_ORDER
        .iter()
        .find_map(|strategy| strategy.resolve(sink, field, destination))
}

/// Join non-empty values with the entry's delimiter, or `default_separator`.
pub fn join_values(values: &[String], entry: Option<&MappingEntry>, default_separator: &str) -> String {
    let separator = entry
        .and_then(|e| e.split_delimiter.as_deref())
        .unwrap_or(default_separator);
    values
        .iter()
        .filter(|v| !v.is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(separator)
}

/// A field that was committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenField {
    pub field: String,
    pub value: String,
    pub target: WriteTarget,
}

/// Outcome of writing one extracted record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteReport {
    pub written: Vec<WrittenField>,
    pub failures: Vec<WriteResolutionError>,
}

impl WriteReport {
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Resolve and write a single destination field.
pub fn write_field<K: DataSink + ?Sized>(
    sink: &mut K,
    field: &str,
    value: &str,
    destination: &str,
) -> Result<WriteTarget, WriteResolutionError> {
    let target = resolve_target(sink, field, destination).ok_or_else(|| WriteResolutionError::Unresolved {
        field: field.to_string(),
    })?;

    sink.write(target.location(), value)
        .map_err(|source| WriteResolutionError::WriteFailed {
            field: field.to_string(),
            target: target.location().to_string(),
            source,
        })?;

    Ok(target)
}

/// Write every field of `record` to `destination`, isolating failures per field.
pub fn write_record<K: DataSink + ?Sized>(
    sink: &mut K,
    record: &ExtractedRecord,
    mapping: &CompiledMapping,
    destination: &str,
    default_separator: &str,
    log: &dyn LogSink,
) -> WriteReport {
    let mut report = WriteReport::default();

    for (field, values) in &record.fields {
        let value = join_values(values, mapping.get(field), default_separator);

        match write_field(sink, field, &value, destination) {
            Ok(target) => {
                log.success(&format!("Wrote '{}' to {}: {}", field, target, value));
                report.written.push(WrittenField {
                    field: field.clone(),
                    value,
                    target,
                });
            }
            Err(err) => {
                log.error(&err.to_string());
                report.failures.push(err);
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logs::LogBroadcaster;
    use crate::models::Value;
    use crate::workbook::{Sheet, Workbook};

    fn workbook() -> Workbook {
        Workbook::new().with_sheet(Sheet::new("Out")).with_sheet(Sheet::new("Other"))
    }

    fn entry(split: Option<&str>) -> MappingEntry {
        MappingEntry {
            sources: vec!["A".to_string()],
            split_delimiter: split.map(str::to_string),
        }
    }

    #[test]
    fn test_join_default_separator() {
        let values = vec!["foo".to_string(), "bar".to_string()];
        assert_eq!(join_values(&values, Some(&entry(None)), DEFAULT_JOIN_SEPARATOR), "foo, bar");
        assert_eq!(join_values(&values, Some(&entry(Some("|"))), DEFAULT_JOIN_SEPARATOR), "foo|bar");
        assert_eq!(join_values(&[], None, DEFAULT_JOIN_SEPARATOR), "");
    }

    #[test]
    fn test_join_drops_empty_fragments() {
        let values = vec!["a".to_string(), String::new(), "b".to_string()];
        assert_eq!(join_values(&values, Some(&entry(Some(";"))), DEFAULT_JOIN_SEPARATOR), "a;b");
    }

    #[test]
    fn test_cell_address_pattern() {
        assert!(is_cell_address("B2"));
        assert!(is_cell_address("AA100"));
        assert!(!is_cell_address("b2"));
        assert!(!is_cell_address("B"));
        assert!(!is_cell_address("$B$2"));
        assert!(!is_cell_address("Title"));
    }

    #[test]
    fn test_global_name_beats_scoped_name() {
        let wb = workbook()
            .with_name("Title", "Out!A1")
            .unwrap()
            .with_name("Out!Title", "Out!B1")
            .unwrap();

        let target = resolve_target(&wb, "Title", "Out").unwrap();
        assert!(matches!(target, WriteTarget::NamedGlobal { .. }));
        assert_eq!(target.location().to_string(), "Out!A1");
    }

    #[test]
    fn test_scoped_name_used_for_destination() {
        let wb = workbook().with_name("Out!Title", "Out!B1").unwrap();

        let target = resolve_target(&wb, "Title", "Out").unwrap();
        assert_eq!(
            target,
            WriteTarget::NamedScoped {
                name: "Out!Title".to_string(),
                location: wb.named_region("Out!Title").unwrap(),
            }
        );
        assert!(resolve_target(&wb, "Title", "Other").is_none());
    }

    #[test]
    fn test_named_region_beats_cell_address() {
        let wb = workbook().with_name("C3", "Other!A1").unwrap();
        let target = resolve_target(&wb, "C3", "Out").unwrap();
        assert_eq!(target.location().to_string(), "Other!A1");
    }

    #[test]
    fn test_cell_address_fallback() {
        let wb = workbook();
        let target = resolve_target(&wb, "C3", "Out").unwrap();
        assert_eq!(target.location().to_string(), "Out!C3");

        assert!(resolve_target(&wb, "A0", "Out").is_none());
        assert!(resolve_target(&wb, "C3", "Missing").is_none());
    }

    #[test]
    fn test_write_record_isolates_failures() {
        let mut wb = workbook().with_name("Title", "Out!A1").unwrap();
        wb.protect_a1("Out!B1").unwrap();

        let mut record = ExtractedRecord::default();
        record.fields.insert("Title".into(), vec!["Song".into()]);
        record.fields.insert("B1".into(), vec!["locked".into()]);
        record.fields.insert("Nowhere".into(), vec!["lost".into()]);
        record.fields.insert("C1".into(), vec!["x".into(), "y".into()]);

        let report = write_record(
            &mut wb,
            &record,
            &CompiledMapping::new(),
            "Out",
            DEFAULT_JOIN_SEPARATOR,
            &LogBroadcaster::quiet(),
        );

        assert_eq!(report.written.len(), 2);
        assert_eq!(report.failures.len(), 2);
        assert!(matches!(report.failures[0], WriteResolutionError::WriteFailed { .. }));
        assert!(matches!(report.failures[1], WriteResolutionError::Unresolved { .. }));

        let out = wb.sheet("Out").unwrap();
        assert_eq!(out.get(CellRef::new(0, 0)), &Value::text("Song"));
        assert_eq!(out.get(CellRef::new(0, 1)), &Value::Empty);
        assert_eq!(out.get(CellRef::new(0, 2)), &Value::text("x, y"));
    }

    #[test]
    fn test_empty_sequence_clears_target() {
        let mut wb = workbook();
        let target = write_field(&mut wb, "A1", "seed", "Out").unwrap();
        assert_eq!(target.location().to_string(), "Out!A1");

        write_field(&mut wb, "A1", "", "Out").unwrap();
        assert_eq!(wb.sheet("Out").unwrap().get(CellRef::new(0, 0)), &Value::Empty);
    }
}
