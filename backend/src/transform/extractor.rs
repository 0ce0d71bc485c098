//! Row extractor: one source row + compiled mapping → [`ExtractedRecord`].

use crate::error::SourceResult;
use crate::logs::LogSink;
use crate::models::{CompiledMapping, ExtractedRecord};
use crate::transform::resolver::FieldResolver;
use crate::workbook::DataSource;

/// Extract the values of `row` (1-based) for every destination field.
///
/// For each destination, the cells of its sources are read in order, dates
/// rendered `DD/MM/YYYY`, empty strings dropped. With a split delimiter and
/// at least one value, every value is split and the fragments flattened.
/// Unresolved source fields are logged, recorded, and contribute nothing.
pub fn extract_row<S: DataSource + ?Sized>(
    resolver: &mut FieldResolver<'_, S>,
    dataset: &str,
    header_row: usize,
    mapping: &CompiledMapping,
    row: usize,
    log: &dyn LogSink,
) -> SourceResult<ExtractedRecord> {
    let source = resolver.source();
    let mut record = ExtractedRecord::default();

    for (dest, entry) in mapping.iter() {
        let mut values = Vec::new();

        for field in &entry.sources {
            let col = match resolver.resolve(dataset, header_row, field) {
                Ok(col) => col,
                Err(err) => {
                    log.warning(&format!("{} (no value for '{}')", err, dest));
                    record.unresolved.push(err);
                    continue;
                }
            };

            let text = source.cell_value(dataset, row, col)?.to_cell_string();
            if !text.is_empty() {
                values.push(text);
            }
        }

        let values = match entry.split_delimiter.as_deref() {
            Some(delimiter) if !values.is_empty() => values
                .iter()
                .flat_map(|v| v.split(delimiter))
                .map(str::to_string)
                .collect(),
            _ => values,
        };

        record.fields.insert(dest.to_string(), values);
    }

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logs::LogBroadcaster;
    use crate::models::{RawRule, Value};
    use crate::transform::compiler::compile;
    use crate::workbook::{Sheet, Workbook};
    use chrono::NaiveDate;

    fn mapping(rules: &[(&str, &str, Option<&str>)]) -> CompiledMapping {
        let rules: Vec<RawRule> = rules
            .iter()
            .enumerate()
            .map(|(i, (s, d, split))| RawRule::new(i + 2, s, d, *split))
            .collect();
        compile(&rules, &LogBroadcaster::quiet()).unwrap()
    }

    fn extract(wb: &Workbook, mapping: &CompiledMapping, row: usize) -> ExtractedRecord {
        let mut resolver = FieldResolver::new(wb);
        extract_row(&mut resolver, "Input", 1, mapping, row, &LogBroadcaster::quiet()).unwrap()
    }

    #[test]
    fn test_split_then_flatten_in_source_order() {
        let wb = Workbook::new().with_sheet(Sheet::from_text_rows(
            "Input",
            &[&["A", "B"], &["x,y", "z"]],
        ));
        let mapping = mapping(&[("A", "Out", Some(",")), ("B", "Out", None)]);

        let record = extract(&wb, &mapping, 2);
        assert_eq!(record.values("Out").unwrap(), ["x", "y", "z"]);
    }

    #[test]
    fn test_without_delimiter_values_stay_whole() {
        let wb = Workbook::new().with_sheet(Sheet::from_text_rows(
            "Input",
            &[&["A", "B"], &["foo,1", "bar"]],
        ));
        let mapping = mapping(&[("A", "Out", None), ("B", "Out", None)]);

        let record = extract(&wb, &mapping, 2);
        assert_eq!(record.values("Out").unwrap(), ["foo,1", "bar"]);
    }

    #[test]
    fn test_date_and_number_rendering() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let wb = Workbook::new().with_sheet(Sheet::from_rows(
            "Input",
            vec![
                vec![Value::text("When"), Value::text("Qty")],
                vec![Value::Date(date), Value::Number(12.0)],
            ],
        ));
        let mapping = mapping(&[("When", "Date", None), ("Qty", "Count", None)]);

        let record = extract(&wb, &mapping, 2);
        assert_eq!(record.values("Date").unwrap(), ["05/03/2024"]);
        assert_eq!(record.values("Count").unwrap(), ["12"]);
    }

    #[test]
    fn test_empty_values_excluded() {
        let wb = Workbook::new().with_sheet(Sheet::from_text_rows(
            "Input",
            &[&["A", "B", "C"], &["", "kept", ""]],
        ));
        let mapping = mapping(&[("A", "Out", None), ("B", "Out", None), ("C", "Out", None)]);

        let record = extract(&wb, &mapping, 2);
        assert_eq!(record.values("Out").unwrap(), ["kept"]);
    }

    #[test]
    fn test_missing_source_field_is_skipped() {
        let wb = Workbook::new().with_sheet(Sheet::from_text_rows(
            "Input",
            &[&["A"], &["value"]],
        ));
        let mapping = mapping(&[("Ghost", "Out", None), ("A", "Out", None), ("Ghost", "Other", Some(","))]);

        let record = extract(&wb, &mapping, 2);
        assert_eq!(record.values("Out").unwrap(), ["value"]);
        // key present even with nothing resolved
        assert!(record.values("Other").unwrap().is_empty());
        assert_eq!(record.unresolved.len(), 2);
        assert_eq!(record.unresolved[0].field(), "Ghost");
    }

    #[test]
    fn test_row_past_end_yields_empty_sequences() {
        let wb = Workbook::new().with_sheet(Sheet::from_text_rows("Input", &[&["A"], &["v"]]));
        let mapping = mapping(&[("A", "Out", Some(","))]);

        let record = extract(&wb, &mapping, 50);
        assert!(record.values("Out").unwrap().is_empty());
    }

    #[test]
    fn test_split_keeps_empty_fragments() {
        let wb = Workbook::new().with_sheet(Sheet::from_text_rows("Input", &[&["A"], &["a;;b"]]));
        let mapping = mapping(&[("A", "Out", Some(";"))]);

        let record = extract(&wb, &mapping, 2);
        assert_eq!(record.values("Out").unwrap(), ["a", "", "b"]);
    }

    #[test]
    fn test_multi_character_delimiter() {
        let wb = Workbook::new().with_sheet(Sheet::from_text_rows("Input", &[&["A"], &["a / b/c"]]));
        let mapping = mapping(&[("A", "Out", Some(" / "))]);

        let record = extract(&wb, &mapping, 2);
        assert_eq!(record.values("Out").unwrap(), ["a", "b/c"]);
    }
}
