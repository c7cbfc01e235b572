use std::path::{Path, PathBuf};

use glob::Pattern;

use crate::error::RdeError;
use crate::invoice::excel::DATA_FILE_COLUMN;
use crate::invoice::ExcelInvoiceFile;
use crate::models::RdeInputDirPaths;
use crate::pipeline::{resolve_mode, ProcessingMode, UnitSource};
use crate::smarttable::SmartTableFile;

/// One independently processed grouping of raw files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitOfWork {
    pub index: usize,
    pub source: UnitSource,
    pub rawfiles: Vec<PathBuf>,
}

/// Input files sorted by role.
#[derive(Debug, Default)]
pub struct ClassifiedInputs {
    pub smarttable: Option<PathBuf>,
    pub excel_invoice: Option<PathBuf>,
    pub others: Vec<PathBuf>,
}

fn single(kind: &str, mut found: Vec<PathBuf>) -> Result<Option<PathBuf>, RdeError> {
    match found.len() {
        0 | 1 => Ok(found.pop()),
        count => Err(RdeError::MultipleInputSources {
            kind: kind.to_string(),
            count,
        }),
    }
}

pub fn classify_inputs(files: Vec<PathBuf>) -> Result<ClassifiedInputs, RdeError> {
    let patterns = [
        Pattern::new("smarttable_*.csv"),
        Pattern::new("smarttable_*.tsv"),
        Pattern::new("smarttable_*.xlsx"),
    ];
    let smarttable_patterns: Vec<Pattern> = patterns.into_iter().filter_map(Result::ok).collect();
    let file_name = |p: &Path| {
        p.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string()
    };

    let mut smarttables = Vec::new();
    let mut excel_invoices = Vec::new();
    let mut others = Vec::new();
    for file in files {
        let name = file_name(&file);
        if smarttable_patterns.iter().any(|p| p.matches(&name)) {
            smarttables.push(file);
        } else if ExcelInvoiceFile::is_excel_invoice(&file) {
            excel_invoices.push(file);
        } else {
            others.push(file);
        }
    }

    Ok(ClassifiedInputs {
        smarttable: single("SmartTable", smarttables)?,
        excel_invoice: single("Excel invoice", excel_invoices)?,
        others,
    })
}

fn smarttable_units(
    file: PathBuf,
    srcpaths: &RdeInputDirPaths,
    temp_dir: &Path,
) -> Result<Vec<UnitOfWork>, RdeError> {
    let rows = SmartTableFile::new(&file).generate_row_csvs(temp_dir, &srcpaths.inputdata)?;
    Ok(rows
        .into_iter()
        .map(|row| UnitOfWork {
            index: row.row_index,
            source: UnitSource::SmartTable { file: file.clone() },
            rawfiles: row.rawfiles(),
        })
        .collect())
}

fn excel_units(file: PathBuf, srcpaths: &RdeInputDirPaths) -> Result<Vec<UnitOfWork>, RdeError> {
    let table = ExcelInvoiceFile::new(&file).read_table()?;
    let mut units = Vec::with_capacity(table.rows.len());
    for index in 0..table.rows.len() {
        let mut rawfiles = Vec::new();
        if let Some(name) = table.data_file_name(index) {
            let path = srcpaths.inputdata.join(name);
            if !path.is_file() {
                return Err(RdeError::MissingInputFile {
                    column: DATA_FILE_COLUMN.to_string(),
                    path,
                });
            }
            rawfiles.push(path);
        }
        units.push(UnitOfWork {
            index,
            source: UnitSource::ExcelInvoice { file: file.clone() },
            rawfiles,
        });
    }
    Ok(units)
}

/// Splits the input directory into units of work.
///
/// A SmartTable yields one unit per data row (row CSVs are generated into
/// `temp_dir`), an Excel invoice one unit per data row, `MultiDataTile` one
/// unit per input file; anything else is a single unit.
pub fn discover_units(
    srcpaths: &RdeInputDirPaths,
    temp_dir: &Path,
) -> Result<Vec<UnitOfWork>, RdeError> {
    let files = crate::storage::list_files(&srcpaths.inputdata)?;
    let inputs = classify_inputs(files)?;

    if let Some(file) = inputs.smarttable {
        return smarttable_units(file, srcpaths, temp_dir);
    }
    if let Some(file) = inputs.excel_invoice {
        return excel_units(file, srcpaths);
    }

    let mode = resolve_mode(None, None, srcpaths.config.extended_mode());
    if mode == ProcessingMode::MultiDataTile && !inputs.others.is_empty() {
        return Ok(inputs
            .others
            .into_iter()
            .enumerate()
            .map(|(index, file)| UnitOfWork {
                index,
                source: UnitSource::Plain,
                rawfiles: vec![file],
            })
            .collect());
    }

    Ok(vec![UnitOfWork {
        index: 0,
        source: UnitSource::Plain,
        rawfiles: inputs.others,
    }])
}
