//! SmartTable inputs.
//!
//! A SmartTable source is a spreadsheet whose first row holds display names,
//! whose second row holds mapping keys (`basic/dataName`, `meta/temperature`,
//! `inputdata1`, ...) and whose remaining rows are data. Each data row is
//! processed as its own unit of work through a one-row CSV (`fsmarttable_*.csv`).

pub mod source;

use std::path::{Path, PathBuf};

use crate::error::RdeError;

pub use source::{SmartTableFile, SmartTableRowFile, SmartTableTable};

/// Prefix of generated per-row CSV files.
pub const ROW_CSV_PREFIX: &str = "fsmarttable_";

/// One parsed SmartTable row: column keys and values in column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SmartTableRow {
    columns: Vec<(String, String)>,
}

impl SmartTableRow {
    pub fn new(columns: Vec<(String, String)>) -> Self {
        Self { columns }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// True for generated row CSVs (`fsmarttable_<name>_<NNNN>.csv`).
pub fn is_row_csv(path: &Path) -> bool {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    let has_prefix = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(ROW_CSV_PREFIX));
    is_csv && has_prefix
}

/// Reads a generated row CSV: a header of mapping keys plus one data row.
///
/// Extra data rows are ignored with a warning.
pub fn read_row_csv(path: &Path) -> Result<SmartTableRow, RdeError> {
    let csv_err = |e: csv::Error| RdeError::Csv {
        path: path.to_path_buf(),
        source: e,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(csv_err)?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let mut records = reader.records();
    let record = match records.next() {
        Some(record) => record.map_err(csv_err)?,
        None => return Err(RdeError::EmptyRowCsv(path.to_path_buf())),
    };
    if records.next().is_some() {
        tracing::warn!(
            file = %crate::sanitize::redact_path(path),
            "Row CSV has more than one data row, only the first is used"
        );
    }

    let columns = headers
        .into_iter()
        .enumerate()
        .map(|(i, key)| (key, record.get(i).unwrap_or_default().to_string()))
        .collect();

    Ok(SmartTableRow::new(columns))
}

/// Picks the row CSVs out of a list of raw files.
pub fn row_csvs(rawfiles: &[PathBuf]) -> Vec<&PathBuf> {
    rawfiles.iter().filter(|p| is_row_csv(p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_is_row_csv() {
        assert!(is_row_csv(Path::new("/tmp/fsmarttable_experiment_0001.csv")));
        assert!(is_row_csv(Path::new("fsmarttable_x_0000.CSV")));
        assert!(!is_row_csv(Path::new("/tmp/smarttable_experiment.csv")));
        assert!(!is_row_csv(Path::new("/tmp/fsmarttable_experiment_0001.tsv")));
        assert!(!is_row_csv(Path::new("/tmp/data.csv")));
    }

    #[test]
    fn test_read_row_csv() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("fsmarttable_t_0000.csv");
        std::fs::write(
            &path,
            "\u{feff}basic/dataName,meta/comment,inputdata1\nrun-1,,data.txt\n",
        )
        .unwrap();

        let row = read_row_csv(&path).unwrap();

        assert_eq!(row.len(), 3);
        assert_eq!(row.get("basic/dataName"), Some("run-1"));
        assert_eq!(row.get("meta/comment"), Some(""));
        assert_eq!(row.get("inputdata1"), Some("data.txt"));
        assert_eq!(
            row.keys().collect::<Vec<_>>(),
            vec!["basic/dataName", "meta/comment", "inputdata1"]
        );
    }

    #[test]
    fn test_read_row_csv_short_record_pads_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("fsmarttable_t_0000.csv");
        std::fs::write(&path, "basic/dataName,custom/a\nonly-name\n").unwrap();

        let row = read_row_csv(&path).unwrap();
        assert_eq!(row.get("custom/a"), Some(""));
    }

    #[test]
    fn test_read_row_csv_without_data_row() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("fsmarttable_t_0000.csv");
        std::fs::write(&path, "basic/dataName\n").unwrap();

        assert!(matches!(read_row_csv(&path), Err(RdeError::EmptyRowCsv(_))));
    }

    #[test]
    fn test_row_csvs_filter() {
        let files = vec![
            PathBuf::from("a/fsmarttable_s_0000.csv"),
            PathBuf::from("a/input.txt"),
        ];
        assert_eq!(row_csvs(&files), vec![&files[0]]);
    }
}
