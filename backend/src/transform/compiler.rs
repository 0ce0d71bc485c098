//! Rule compiler: raw transcoding rules → [`CompiledMapping`].
//!
//! Rules sharing a destination field are merged: their sources are appended
//! in table order, and the delimiter of the last rule that carries one wins.
//! A later rule without a delimiter leaves an earlier delimiter in place.

use crate::error::{CompileError, CompileResult};
use crate::logs::LogSink;
use crate::models::{CompiledMapping, RawRule};

/// Compile raw rules into a mapping keyed by destination field.
///
/// Rules missing a source or destination field are logged and skipped.
/// Fails with [`CompileError::EmptyMapping`] when nothing usable remains.
pub fn compile(rules: &[RawRule], log: &dyn LogSink) -> CompileResult<CompiledMapping> {
    let mut mapping = CompiledMapping::new();

    for rule in rules {
        let (Some(source), Some(dest)) = (rule.source_field.as_deref(), rule.dest_field.as_deref()) else {
            log.warning(&format!(
                "Skipping transcoding row {} due to missing information (in: {:?}, out: {:?})",
                rule.row,
                rule.source_field.as_deref().unwrap_or(""),
                rule.dest_field.as_deref().unwrap_or("")
            ));
            continue;
        };

        let entry = mapping.entry_mut(dest);
        entry.sources.push(source.to_string());

        if let Some(delimiter) = rule.split_delimiter.as_deref().filter(|d| !d.is_empty()) {
            entry.split_delimiter = Some(delimiter.to_string());
        }
    }

    if mapping.is_empty() {
        return Err(CompileError::EmptyMapping { rules: rules.len() });
    }

    Ok(mapping)
}

/// Log the compiled mapping, one destination per line.
pub fn log_mapping(mapping: &CompiledMapping, log: &dyn LogSink) {
    log.info("🗺️  Transcoding map:");
    for (dest, entry) in mapping.iter() {
        let split = entry
            .split_delimiter
            .as_deref()
            .map(|d| format!(" (split on '{}')", d))
            .unwrap_or_default();
        log.info_indent(&format!("[{}] → {}{}", entry.sources.join(" + "), dest, split), 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logs::{drain, LogBroadcaster, LogLevel};

    fn rule(row: usize, source: &str, dest: &str, split: Option<&str>) -> RawRule {
        RawRule::new(row, source, dest, split)
    }

    #[test]
    fn test_keys_are_distinct_destinations() {
        let rules = vec![
            rule(2, "First", "Name", None),
            rule(3, "Last", "Name", None),
            rule(4, "City", "B4", None),
            rule(5, "First", "Initials", None),
        ];
        let mapping = compile(&rules, &LogBroadcaster::quiet()).unwrap();

        assert_eq!(mapping.dest_fields().collect::<Vec<_>>(), vec!["Name", "B4", "Initials"]);
        assert_eq!(mapping.get("Name").unwrap().sources, vec!["First", "Last"]);
    }

    #[test]
    fn test_duplicate_sources_kept() {
        let rules = vec![rule(2, "Tag", "Tags", None), rule(3, "Tag", "Tags", None)];
        let mapping = compile(&rules, &LogBroadcaster::quiet()).unwrap();
        assert_eq!(mapping.get("Tags").unwrap().sources, vec!["Tag", "Tag"]);
    }

    #[test]
    fn test_last_delimiter_wins_but_absence_does_not_clear() {
        let rules = vec![
            rule(2, "A", "Out", Some(",")),
            rule(3, "B", "Out", Some(" / ")),
            rule(4, "C", "Out", None),
        ];
        let mapping = compile(&rules, &LogBroadcaster::quiet()).unwrap();
        assert_eq!(mapping.get("Out").unwrap().split_delimiter.as_deref(), Some(" / "));
    }

    #[test]
    fn test_empty_delimiter_is_absent() {
        let rules = vec![RawRule {
            row: 2,
            source_field: Some("A".into()),
            dest_field: Some("Out".into()),
            split_delimiter: Some(String::new()),
        }];
        let mapping = compile(&rules, &LogBroadcaster::quiet()).unwrap();
        assert!(mapping.get("Out").unwrap().split_delimiter.is_none());
    }

    #[test]
    fn test_invalid_rules_skipped_and_logged() {
        let logs = LogBroadcaster::quiet();
        let mut rx = logs.subscribe();
        let rules = vec![
            rule(2, "", "Title", None),
            rule(3, "Name", "", Some(",")),
            rule(4, "Name", "Title", None),
        ];

        let mapping = compile(&rules, &logs).unwrap();
        assert_eq!(mapping.len(), 1);

        let warnings: Vec<_> = drain(&mut rx)
            .into_iter()
            .filter(|e| e.level == LogLevel::Warning)
            .collect();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].message.contains("row 2"));
    }

    #[test]
    fn test_no_valid_rules_is_empty_mapping() {
        let rules = vec![rule(2, "", "", None), rule(3, "A", "", None)];
        let err = compile(&rules, &LogBroadcaster::quiet()).unwrap_err();
        assert_eq!(err, CompileError::EmptyMapping { rules: 2 });

        let err = compile(&[], &LogBroadcaster::quiet()).unwrap_err();
        assert_eq!(err, CompileError::EmptyMapping { rules: 0 });
    }

    #[test]
    fn test_compile_is_deterministic() {
        let rules = vec![
            rule(2, "A", "X", Some(";")),
            rule(3, "B", "Y", None),
            rule(4, "C", "X", None),
        ];
        let logs = LogBroadcaster::quiet();
        assert_eq!(compile(&rules, &logs).unwrap(), compile(&rules, &logs).unwrap());
    }
}
