use std::path::{Path, PathBuf};

use crate::error::RdeError;
use crate::models::{DatasetPaths, RdeInputDirPaths, RdeOutputResourcePath};
use crate::smarttable;

use super::callback::DatasetCallback;
use super::mode::{resolve_mode, ProcessingMode};

/// Where a unit of work comes from. At most one mode-specific input exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitSource {
    Plain,
    ExcelInvoice { file: PathBuf },
    SmartTable { file: PathBuf },
}

impl UnitSource {
    pub fn excel_file(&self) -> Option<&Path> {
        match self {
            UnitSource::ExcelInvoice { file } => Some(file),
            _ => None,
        }
    }

    pub fn smarttable_file(&self) -> Option<&Path> {
        match self {
            UnitSource::SmartTable { file } => Some(file),
            _ => None,
        }
    }
}

/// Mutable working record for one unit of work.
pub struct ProcessingContext {
    pub index: String,
    pub srcpaths: RdeInputDirPaths,
    pub resource_paths: RdeOutputResourcePath,
    pub datasets_function: Option<DatasetCallback>,
    source: UnitSource,
    mode: ProcessingMode,
}

impl ProcessingContext {
    /// The mode is derived from `source` and the configured extended mode.
    pub fn new(
        index: impl Into<String>,
        srcpaths: RdeInputDirPaths,
        resource_paths: RdeOutputResourcePath,
        source: UnitSource,
        datasets_function: Option<DatasetCallback>,
    ) -> Self {
        let mode = resolve_mode(
            source.smarttable_file(),
            source.excel_file(),
            srcpaths.config.extended_mode(),
        );
        Self {
            index: index.into(),
            srcpaths,
            resource_paths,
            datasets_function,
            source,
            mode,
        }
    }

    pub fn mode(&self) -> ProcessingMode {
        self.mode
    }

    pub fn source(&self) -> &UnitSource {
        &self.source
    }

    pub fn excel_file(&self) -> Option<&Path> {
        self.source.excel_file()
    }

    /// Row of the Excel invoice this unit reads, parsed from `index`.
    pub fn excel_index(&self) -> Result<usize, RdeError> {
        self.index
            .trim()
            .parse()
            .map_err(|_| RdeError::InvalidExcelIndex(self.index.clone()))
    }

    pub fn smarttable_file(&self) -> Option<&Path> {
        self.source.smarttable_file()
    }

    /// Destination `invoice.json` of this unit.
    pub fn invoice_dst(&self) -> PathBuf {
        self.resource_paths.invoice_json()
    }

    pub fn metadata_dst(&self) -> PathBuf {
        self.resource_paths.metadata_json()
    }

    /// First raw file that is not a generated SmartTable row CSV.
    pub fn primary_rawfile(&self) -> Option<&Path> {
        self.resource_paths
            .rawfiles
            .iter()
            .find(|p| !smarttable::is_row_csv(p))
            .map(PathBuf::as_path)
    }

    pub fn dataset_paths(&self) -> DatasetPaths {
        DatasetPaths::new(self.srcpaths.clone(), self.resource_paths.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn context(source: UnitSource, extended: Option<&str>, index: &str) -> ProcessingContext {
        let mut config = Config::default();
        config.system.extended_mode = extended.map(str::to_string);
        let srcpaths = RdeInputDirPaths::new("/d/inputdata", "/d/invoice", "/d/tasksupport", config);
        let resource_paths = RdeOutputResourcePath::for_unit(
            Path::new("/d/out"),
            0,
            PathBuf::new(),
            PathBuf::new(),
            vec![
                PathBuf::from("/d/out/temp/fsmarttable_t_0000.csv"),
                PathBuf::from("/d/inputdata/a.txt"),
            ],
        );
        ProcessingContext::new(index, srcpaths, resource_paths, source, None)
    }

    #[test]
    fn test_mode_follows_source() {
        let ctx = context(
            UnitSource::SmartTable {
                file: PathBuf::from("/d/inputdata/smarttable_t.csv"),
            },
            Some("MultiDataTile"),
            "0",
        );
        assert_eq!(ctx.mode(), ProcessingMode::SmartTableInvoice);
        assert!(ctx.smarttable_file().is_some());
        assert!(ctx.excel_file().is_none());

        let ctx = context(UnitSource::Plain, Some("MultiDataTile"), "0");
        assert_eq!(ctx.mode(), ProcessingMode::MultiDataTile);
    }

    #[test]
    fn test_excel_index() {
        let source = UnitSource::ExcelInvoice {
            file: PathBuf::from("/d/inputdata/a_excel_invoice.xlsx"),
        };
        assert_eq!(context(source.clone(), None, "3").excel_index().unwrap(), 3);
        assert!(matches!(
            context(source, None, "three").excel_index(),
            Err(RdeError::InvalidExcelIndex(i)) if i == "three"
        ));
    }

    #[test]
    fn test_primary_rawfile_skips_row_csv() {
        let ctx = context(UnitSource::Plain, None, "0");
        assert_eq!(ctx.primary_rawfile(), Some(Path::new("/d/inputdata/a.txt")));
        assert_eq!(ctx.invoice_dst(), PathBuf::from("/d/out/invoice/invoice.json"));
    }
}
