use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::StorageError;
use crate::smarttable::SmartTableRow;
use crate::storage;

pub const INVOICE_FILE_NAME: &str = "invoice.json";
pub const METADATA_FILE_NAME: &str = "metadata.json";
pub const INVOICE_SCHEMA_FILE_NAME: &str = "invoice.schema.json";
pub const METADATA_DEF_FILE_NAME: &str = "metadata-def.json";

/// Input side of a run: where raw data, the user invoice and task support
/// files live, plus the effective configuration.
#[derive(Debug, Clone)]
pub struct RdeInputDirPaths {
    pub inputdata: PathBuf,
    pub invoice: PathBuf,
    pub tasksupport: PathBuf,
    pub config: Config,
}

impl RdeInputDirPaths {
    pub fn new<P: AsRef<Path>>(inputdata: P, invoice: P, tasksupport: P, config: Config) -> Self {
        Self {
            inputdata: inputdata.as_ref().to_path_buf(),
            invoice: invoice.as_ref().to_path_buf(),
            tasksupport: tasksupport.as_ref().to_path_buf(),
            config,
        }
    }

    pub fn default_invoice_json(&self) -> PathBuf {
        self.invoice.join(INVOICE_FILE_NAME)
    }

    pub fn invoice_schema_json(&self) -> PathBuf {
        self.tasksupport.join(INVOICE_SCHEMA_FILE_NAME)
    }

    pub fn metadata_def_json(&self) -> PathBuf {
        self.tasksupport.join(METADATA_DEF_FILE_NAME)
    }
}

/// Output directories a unit of work can write into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputDir {
    Raw,
    NonsharedRaw,
    Structured,
    MainImage,
    OtherImage,
    Meta,
    Thumbnail,
    Logs,
    Invoice,
}

impl OutputDir {
    pub const ALL: [OutputDir; 9] = [
        OutputDir::Raw,
        OutputDir::NonsharedRaw,
        OutputDir::Structured,
        OutputDir::MainImage,
        OutputDir::OtherImage,
        OutputDir::Meta,
        OutputDir::Thumbnail,
        OutputDir::Logs,
        OutputDir::Invoice,
    ];

    pub fn dir_name(self) -> &'static str {
        match self {
            OutputDir::Raw => "raw",
            OutputDir::NonsharedRaw => "nonshared_raw",
            OutputDir::Structured => "structured",
            OutputDir::MainImage => "main_image",
            OutputDir::OtherImage => "other_image",
            OutputDir::Meta => "meta",
            OutputDir::Thumbnail => "thumbnail",
            OutputDir::Logs => "logs",
            OutputDir::Invoice => "invoice",
        }
    }

    pub fn from_dir_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|dir| dir.dir_name() == name)
    }
}

/// Output side of one unit of work.
#[derive(Debug, Clone, Default)]
pub struct RdeOutputResourcePath {
    pub raw: PathBuf,
    pub nonshared_raw: PathBuf,
    pub structured: PathBuf,
    pub main_image: PathBuf,
    pub other_image: PathBuf,
    pub meta: PathBuf,
    pub thumbnail: PathBuf,
    pub logs: PathBuf,
    pub invoice: PathBuf,
    pub invoice_schema_json: PathBuf,
    /// Snapshot of the user's invoice taken before any unit was processed.
    pub invoice_org: PathBuf,
    pub rawfiles: Vec<PathBuf>,
    pub smarttable_rowfile: Option<PathBuf>,
    pub smarttable_row_data: Option<SmartTableRow>,
}

impl RdeOutputResourcePath {
    /// Resource paths for unit `index` under `output_root`.
    ///
    /// Unit 0 writes straight into the root; later units get their own
    /// `divided/NNNN` subtree so units never share a destination.
    pub fn for_unit(
        output_root: &Path,
        index: usize,
        invoice_schema_json: PathBuf,
        invoice_org: PathBuf,
        rawfiles: Vec<PathBuf>,
    ) -> Self {
        let base = if index == 0 {
            output_root.to_path_buf()
        } else {
            output_root.join("divided").join(format!("{:04}", index))
        };

        Self {
            raw: base.join(OutputDir::Raw.dir_name()),
            nonshared_raw: base.join(OutputDir::NonsharedRaw.dir_name()),
            structured: base.join(OutputDir::Structured.dir_name()),
            main_image: base.join(OutputDir::MainImage.dir_name()),
            other_image: base.join(OutputDir::OtherImage.dir_name()),
            meta: base.join(OutputDir::Meta.dir_name()),
            thumbnail: base.join(OutputDir::Thumbnail.dir_name()),
            logs: base.join(OutputDir::Logs.dir_name()),
            invoice: base.join(OutputDir::Invoice.dir_name()),
            invoice_schema_json,
            invoice_org,
            rawfiles,
            smarttable_rowfile: None,
            smarttable_row_data: None,
        }
    }

    pub fn dir(&self, dir: OutputDir) -> &Path {
        match dir {
            OutputDir::Raw => &self.raw,
            OutputDir::NonsharedRaw => &self.nonshared_raw,
            OutputDir::Structured => &self.structured,
            OutputDir::MainImage => &self.main_image,
            OutputDir::OtherImage => &self.other_image,
            OutputDir::Meta => &self.meta,
            OutputDir::Thumbnail => &self.thumbnail,
            OutputDir::Logs => &self.logs,
            OutputDir::Invoice => &self.invoice,
        }
    }

    pub fn invoice_json(&self) -> PathBuf {
        self.invoice.join(INVOICE_FILE_NAME)
    }

    pub fn metadata_json(&self) -> PathBuf {
        self.meta.join(METADATA_FILE_NAME)
    }

    pub fn create_dirs(&self) -> Result<(), StorageError> {
        for dir in OutputDir::ALL {
            storage::ensure_directory(self.dir(dir))?;
        }
        Ok(())
    }
}

/// Single view over both path bundles, handed to unified dataset callbacks.
#[derive(Debug, Clone)]
pub struct DatasetPaths {
    input: RdeInputDirPaths,
    output: RdeOutputResourcePath,
}

impl DatasetPaths {
    pub fn new(input: RdeInputDirPaths, output: RdeOutputResourcePath) -> Self {
        Self { input, output }
    }

    pub fn input(&self) -> &RdeInputDirPaths {
        &self.input
    }

    pub fn output(&self) -> &RdeOutputResourcePath {
        &self.output
    }

    pub fn config(&self) -> &Config {
        &self.input.config
    }

    pub fn inputdata(&self) -> &Path {
        &self.input.inputdata
    }

    pub fn tasksupport(&self) -> &Path {
        &self.input.tasksupport
    }

    pub fn rawfiles(&self) -> &[PathBuf] {
        &self.output.rawfiles
    }

    pub fn structured(&self) -> &Path {
        &self.output.structured
    }

    pub fn meta(&self) -> &Path {
        &self.output.meta
    }

    pub fn main_image(&self) -> &Path {
        &self.output.main_image
    }

    pub fn invoice_json(&self) -> PathBuf {
        self.output.invoice_json()
    }

    pub fn metadata_json(&self) -> PathBuf {
        self.output.metadata_json()
    }

    pub fn smarttable_row_data(&self) -> Option<&SmartTableRow> {
        self.output.smarttable_row_data.as_ref()
    }
}
