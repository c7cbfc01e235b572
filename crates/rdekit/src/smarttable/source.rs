use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Reader};

use crate::error::RdeError;
use crate::storage;

use super::ROW_CSV_PREFIX;

const SOURCE_PREFIX: &str = "smarttable_";
const SOURCE_EXTENSIONS: &[&str] = &["csv", "tsv", "xlsx"];

/// Parsed SmartTable source: mapping keys plus data rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmartTableTable {
    pub display_names: Vec<String>,
    pub keys: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// A generated row CSV and the input files its `inputdata*` columns name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmartTableRowFile {
    pub row_index: usize,
    pub row_csv: PathBuf,
    pub data_files: Vec<PathBuf>,
}

impl SmartTableRowFile {
    /// Raw files of the unit: the row CSV first, then the mapped data files.
    pub fn rawfiles(&self) -> Vec<PathBuf> {
        let mut files = Vec::with_capacity(self.data_files.len() + 1);
        files.push(self.row_csv.clone());
        files.extend(self.data_files.iter().cloned());
        files
    }
}

pub struct SmartTableFile {
    path: PathBuf,
}

impl SmartTableFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `smarttable_<name>.{csv,tsv,xlsx}`
    pub fn is_smarttable_file(path: &Path) -> bool {
        let name_ok = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(SOURCE_PREFIX));
        let ext_ok = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| SOURCE_EXTENSIONS.iter().any(|x| e.eq_ignore_ascii_case(x)));
        name_ok && ext_ok
    }

    pub fn read_table(&self) -> Result<SmartTableTable, RdeError> {
        let grid = match self.extension().as_str() {
            "xlsx" => self.read_workbook()?,
            "tsv" => self.read_delimited(b'\t')?,
            _ => self.read_delimited(b',')?,
        };

        let mut grid = grid.into_iter();
        let display_names = grid.next().unwrap_or_default();
        let keys: Vec<String> = grid
            .next()
            .unwrap_or_default()
            .into_iter()
            .map(|k| k.trim().to_string())
            .collect();

        if keys.is_empty() || keys.iter().all(|k| k.is_empty()) {
            return Err(RdeError::InvalidInvoice {
                path: self.path.clone(),
                message: "SmartTable has no mapping-key row (row 2)".to_string(),
            });
        }

        let rows = grid
            .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
            .collect();

        Ok(SmartTableTable {
            display_names,
            keys,
            rows,
        })
    }

    /// Writes one `fsmarttable_<stem>_<NNNN>.csv` per data row into `out_dir`.
    ///
    /// `inputdata*` cells are resolved against `inputdata`; a referenced file
    /// that does not exist is an error.
    pub fn generate_row_csvs(
        &self,
        out_dir: &Path,
        inputdata: &Path,
    ) -> Result<Vec<SmartTableRowFile>, RdeError> {
        let table = self.read_table()?;
        storage::ensure_directory(out_dir)?;

        let stem = self
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.strip_prefix(SOURCE_PREFIX))
            .unwrap_or("table");

        let mut generated = Vec::with_capacity(table.rows.len());
        for (row_index, row) in table.rows.iter().enumerate() {
            let row_csv = out_dir.join(format!("{}{}_{:04}.csv", ROW_CSV_PREFIX, stem, row_index));
            let values: Vec<&str> = (0..table.keys.len())
                .map(|i| row.get(i).map(String::as_str).unwrap_or(""))
                .collect();

            let csv_err = |e: csv::Error| RdeError::Csv {
                path: row_csv.clone(),
                source: e,
            };
            let mut writer = csv::Writer::from_path(&row_csv).map_err(csv_err)?;
            writer.write_record(&table.keys).map_err(csv_err)?;
            writer.write_record(&values).map_err(csv_err)?;
            writer.flush().map_err(|e| RdeError::Csv {
                path: row_csv.clone(),
                source: e.into(),
            })?;

            let mut data_files = Vec::new();
            for (key, value) in table.keys.iter().zip(values.iter()) {
                if !key.starts_with("inputdata") || value.trim().is_empty() {
                    continue;
                }
                let candidate = inputdata.join(value.trim());
                if !candidate.is_file() {
                    return Err(RdeError::MissingInputFile {
                        column: key.clone(),
                        path: candidate,
                    });
                }
                data_files.push(candidate);
            }

            generated.push(SmartTableRowFile {
                row_index,
                row_csv,
                data_files,
            });
        }

        Ok(generated)
    }

    fn extension(&self) -> String {
        self.path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase()
    }

    fn read_delimited(&self, delimiter: u8) -> Result<Vec<Vec<String>>, RdeError> {
        let csv_err = |e: csv::Error| RdeError::Csv {
            path: self.path.clone(),
            source: e,
        };
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .from_path(&self.path)
            .map_err(csv_err)?;

        let mut grid = Vec::new();
        for record in reader.records() {
            let record = record.map_err(csv_err)?;
            grid.push(
                record
                    .iter()
                    .map(|cell| cell.trim_start_matches('\u{feff}').to_string())
                    .collect(),
            );
        }
        Ok(grid)
    }

    fn read_workbook(&self) -> Result<Vec<Vec<String>>, RdeError> {
        let excel_err = |message: String| RdeError::Excel {
            path: self.path.clone(),
            message,
        };
        let mut workbook = open_workbook_auto(&self.path).map_err(|e| excel_err(e.to_string()))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| excel_err("workbook has no worksheet".to_string()))?
            .map_err(|e| excel_err(e.to_string()))?;

        Ok(range
            .rows()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect())
    }
}
