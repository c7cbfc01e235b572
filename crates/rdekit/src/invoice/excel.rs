use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Reader};
use serde_json::Value;

use crate::error::RdeError;

use super::mapping::{apply_column, ColumnKey};
use super::schema::InvoiceSchema;

/// Column naming the raw file of each Excel invoice row.
pub const DATA_FILE_COLUMN: &str = "data_file_names/name";

const FILE_SUFFIX: &str = "_excel_invoice.xlsx";

/// Key row plus data rows of an Excel invoice sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExcelInvoiceTable {
    pub keys: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ExcelInvoiceTable {
    /// The key row is the first row holding a `basic/` key. Rows above it are
    /// titles and notes; blank rows below it are skipped.
    pub fn from_grid(grid: Vec<Vec<String>>) -> Option<Self> {
        let mut grid = grid.into_iter();
        let keys: Vec<String> = grid
            .by_ref()
            .find(|row| row.iter().any(|cell| cell.trim().starts_with("basic/")))?
            .into_iter()
            .map(|cell| cell.trim().to_string())
            .collect();

        let rows = grid
            .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
            .collect();

        Some(Self { keys, rows })
    }

    /// `(key, value)` pairs of data row `index`, in column order.
    pub fn row(&self, index: usize) -> Option<Vec<(&str, &str)>> {
        let row = self.rows.get(index)?;
        Some(
            self.keys
                .iter()
                .enumerate()
                .map(|(i, key)| (key.as_str(), row.get(i).map(String::as_str).unwrap_or("")))
                .collect(),
        )
    }

    /// Raw file name of row `index`, when the row names one.
    pub fn data_file_name(&self, index: usize) -> Option<&str> {
        let column = self.keys.iter().position(|k| k == DATA_FILE_COLUMN)?;
        self.rows
            .get(index)?
            .get(column)
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
    }
}

pub struct ExcelInvoiceFile {
    path: PathBuf,
}

impl ExcelInvoiceFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_excel_invoice(path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.to_lowercase().ends_with(FILE_SUFFIX))
    }

    pub fn read_table(&self) -> Result<ExcelInvoiceTable, RdeError> {
        let excel_err = |message: String| RdeError::Excel {
            path: self.path.clone(),
            message,
        };
        let mut workbook = open_workbook_auto(&self.path).map_err(|e| excel_err(e.to_string()))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| excel_err("workbook has no worksheet".to_string()))?
            .map_err(|e| excel_err(e.to_string()))?;

        let grid = range
            .rows()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect();

        ExcelInvoiceTable::from_grid(grid)
            .ok_or_else(|| excel_err("no row with basic/ keys found".to_string()))
    }

    /// Overwrites `invoice` with the fields of data row `index`.
    pub fn overwrite(
        &self,
        invoice: &mut Value,
        index: usize,
        schema: Option<&InvoiceSchema>,
    ) -> Result<(), RdeError> {
        let table = self.read_table()?;
        apply_row(&table, invoice, index, schema)
    }
}

pub(crate) fn apply_row(
    table: &ExcelInvoiceTable,
    invoice: &mut Value,
    index: usize,
    schema: Option<&InvoiceSchema>,
) -> Result<(), RdeError> {
    let row = table.row(index).ok_or_else(|| RdeError::ExcelInvoiceRow {
        index,
        message: format!("sheet has {} data rows", table.rows.len()),
    })?;

    for (key, value) in row {
        if value.trim().is_empty() {
            continue;
        }
        let column = ColumnKey::parse(key);
        if !apply_column(invoice, column, value, schema)? {
            tracing::debug!(column = %key, "Excel invoice column does not map to an invoice field");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    fn sample_table() -> ExcelInvoiceTable {
        ExcelInvoiceTable::from_grid(grid(&[
            &["Excel invoice", "", ""],
            &[DATA_FILE_COLUMN, "basic/dataName", "sample/names"],
            &["", "", ""],
            &["a.txt", "first", "s-a"],
            &["b.txt", "second", ""],
        ]))
        .unwrap()
    }

    #[test]
    fn test_is_excel_invoice() {
        assert!(ExcelInvoiceFile::is_excel_invoice(Path::new("in/batch_excel_invoice.xlsx")));
        assert!(!ExcelInvoiceFile::is_excel_invoice(Path::new("in/batch.xlsx")));
    }

    #[test]
    fn test_from_grid_finds_key_row() {
        let table = sample_table();
        assert_eq!(table.keys[1], "basic/dataName");
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.data_file_name(1), Some("b.txt"));
    }

    #[test]
    fn test_from_grid_without_keys() {
        assert!(ExcelInvoiceTable::from_grid(grid(&[&["title"], &["x"]])).is_none());
    }

    #[test]
    fn test_apply_row_overwrites_fields() {
        let table = sample_table();
        let mut invoice = json!({
            "basic": { "dataName": "template", "dataOwnerId": "u1" },
            "sample": { "names": ["old"] }
        });

        apply_row(&table, &mut invoice, 1, None).unwrap();

        assert_eq!(invoice["basic"]["dataName"], "second");
        assert_eq!(invoice["basic"]["dataOwnerId"], "u1");
        // blank cells leave the template untouched
        assert_eq!(invoice["sample"]["names"], json!(["old"]));
    }

    #[test]
    fn test_apply_row_out_of_range() {
        let table = sample_table();
        let mut invoice = json!({});
        let result = apply_row(&table, &mut invoice, 5, None);
        assert!(matches!(result, Err(RdeError::ExcelInvoiceRow { index: 5, .. })));
    }

    #[test]
    fn test_read_missing_workbook_is_unexpected() {
        let file = ExcelInvoiceFile::new("/nonexistent/x_excel_invoice.xlsx");
        let err = file.read_table().unwrap_err();
        assert!(!err.is_structured());
    }
}
