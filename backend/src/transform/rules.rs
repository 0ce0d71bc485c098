//! Load raw transcoding rules from a dataset.
//!
//! Layout of the transcoding table (row 1 is a header and is skipped):
//!
//! | in (source field) | out (destination) | split (optional) |
//! |-------------------|-------------------|------------------|
//! | First name        | Title             |                  |
//! | Authors           | Output!Authors    | ;                |

use crate::error::SourceResult;
use crate::models::{RawRule, Value};
use crate::workbook::DataSource;

/// Read every rule of the transcoding table `dataset`.
pub fn load_rules<S: DataSource + ?Sized>(source: &S, dataset: &str) -> SourceResult<Vec<RawRule>> {
    let rows = source.all_rows(dataset)?;

    let rules = rows
        .iter()
        .enumerate()
        .skip(1)
        .map(|(idx, row)| {
            let cell = |col: usize| row.get(col).map(Value::to_cell_string).unwrap_or_default();
            let split = cell(2);
            RawRule::new(idx + 1, &cell(0), &cell(1), Some(split.as_str()))
        })
        .collect();

    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceError;
    use crate::workbook::{Sheet, Workbook};

    #[test]
    fn test_load_rules_skips_header() {
        let wb = Workbook::new().with_sheet(Sheet::from_text_rows(
            "Transco",
            &[
                &["in", "out", "split"],
                &["First", "Title"],
                &["Tags", "C3", ","],
                &["", "Orphan", ""],
            ],
        ));

        let rules = load_rules(&wb, "Transco").unwrap();
        assert_eq!(rules.len(), 3);
        assert_eq!(rules[0], RawRule::new(2, "First", "Title", None));
        assert_eq!(rules[1].split_delimiter.as_deref(), Some(","));
        assert_eq!(rules[1].row, 3);
        assert!(rules[2].source_field.is_none());
    }

    #[test]
    fn test_numeric_cells_become_names() {
        let wb = Workbook::new().with_sheet(Sheet::from_rows(
            "Transco",
            vec![
                vec![Value::text("in"), Value::text("out")],
                vec![Value::Number(2024.0), Value::text("Year")],
            ],
        ));
        let rules = load_rules(&wb, "Transco").unwrap();
        assert_eq!(rules[0].source_field.as_deref(), Some("2024"));
    }

    #[test]
    fn test_missing_dataset() {
        let wb = Workbook::new();
        assert_eq!(
            load_rules(&wb, "Transco"),
            Err(SourceError::DatasetNotFound("Transco".into()))
        );
    }
}
