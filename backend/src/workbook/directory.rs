//! Workbook stored as a directory.
//!
//! ```text
//! book/
//!   Input.csv        one sheet per CSV file, named after the file stem
//!   Transco.csv
//!   Output.csv
//!   workbook.json    optional: named and protected ranges
//! ```
//!
//! `workbook.json`:
//!
//! ```json
//! {
//!   "names": { "Title": "Output!B2", "Output!Authors": "Output!B3:D3" },
//!   "protected": ["Output!A1:A10"]
//! }
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::memory::{Sheet, Workbook};
use crate::error::{WorkbookError, WorkbookResult};
use crate::parser::{parse_bytes_auto, write_records};

/// Manifest file name inside a workbook directory.
pub const MANIFEST_FILE: &str = "workbook.json";

/// Named and protected ranges of a workbook directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Range name → `Sheet!A1` or `Sheet!A1:B2`.
    #[serde(default)]
    pub names: IndexMap<String, String>,
    #[serde(default)]
    pub protected: Vec<String>,
}

/// Load every `*.csv` sheet of `dir`, then apply its manifest if present.
pub fn load_dir(dir: impl AsRef<Path>) -> WorkbookResult<Workbook> {
    let dir = dir.as_ref();
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|e| e.eq_ignore_ascii_case("csv")))
        .collect();
    paths.sort();

    let mut workbook = Workbook::new();
    for path in paths {
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let bytes = fs::read(&path)?;
        let parsed = parse_bytes_auto(&bytes).map_err(|e| WorkbookError::csv(&path.display().to_string(), e))?;
        workbook.add_sheet(Sheet::from_records(name, parsed.records, parsed.delimiter));
    }

    let manifest_path = dir.join(MANIFEST_FILE);
    if manifest_path.exists() {
        let manifest: Manifest = serde_json::from_str(&fs::read_to_string(&manifest_path)?)?;
        apply_manifest(&mut workbook, &manifest)?;
    }

    Ok(workbook)
}

pub fn apply_manifest(workbook: &mut Workbook, manifest: &Manifest) -> WorkbookResult<()> {
    for (name, reference) in &manifest.names {
        workbook.define_name_a1(name.as_str(), reference)?;
    }
    for reference in &manifest.protected {
        workbook.protect_a1(reference)?;
    }
    Ok(())
}

/// Write one sheet to `<dir>/<sheet>.csv`, returning the path written.
pub fn save_sheet(workbook: &Workbook, sheet: &str, dir: impl AsRef<Path>) -> WorkbookResult<PathBuf> {
    let sheet_data = workbook
        .sheet(sheet)
        .ok_or_else(|| WorkbookError::UnknownSheet(sheet.to_string()))?;
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let path = dir.join(format!("{}.csv", sheet));
    let delimiter = sheet_data.delimiter().unwrap_or(',');
    let content = write_records(&sheet_data.text_rows(), delimiter).map_err(|e| WorkbookError::csv(sheet, e))?;
    fs::write(&path, content)?;
    Ok(path)
}
