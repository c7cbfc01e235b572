use std::path::PathBuf;
use thiserror::Error;

use crate::models::WorkflowExecutionStatus;

/// Errors raised while turning one unit of work into a dataset package.
///
/// Every fatal condition has its own variant so the failure status can be
/// derived with an exhaustive match instead of probing loosely typed fields.
#[derive(Error, Debug)]
pub enum RdeError {
    // ── Preconditions ──
    #[error("SmartTable file is not set for this unit of work")]
    MissingSmartTableFile,

    #[error("Expected exactly one SmartTable row CSV in rawfiles, found {found}")]
    RowCsvCount { found: usize },

    #[error("SmartTable row CSV '{0}' has no data row")]
    EmptyRowCsv(PathBuf),

    #[error("Excel invoice row index is not numeric: '{0}'")]
    InvalidExcelIndex(String),

    #[error("Original invoice snapshot not found: {0}")]
    MissingInvoiceSnapshot(PathBuf),

    #[error("Input file referenced by '{column}' not found: {path}")]
    MissingInputFile { column: String, path: PathBuf },

    #[error("Found {count} {kind} files in inputdata, expected at most one")]
    MultipleInputSources { kind: String, count: usize },

    // ── Schema / definition ──
    #[error("metadata definition not found for key: {0}")]
    UnknownMetadataKey(String),

    #[error("variable metadata is not supported for SmartTable meta mapping: {0}")]
    VariableMetadataUnsupported(String),

    #[error("Invalid metadata definition: {0}")]
    InvalidMetadataDefinition(String),

    #[error("unsupported sample field '{0}' in magic variable, only 'names' is supported")]
    UnsupportedSampleField(String),

    #[error("unsupported metadata field '{0}' in magic variable, only 'constant' is supported")]
    UnsupportedMetadataField(String),

    #[error("Unsupported magic variable: ${{{0}}}")]
    UnsupportedPlaceholder(String),

    #[error("Unknown processing mode: {0}")]
    UnknownMode(String),

    #[error("Invalid invoice schema '{path}': {message}")]
    InvalidSchema { path: PathBuf, message: String },

    #[error("Invalid invoice '{path}': {message}")]
    InvalidInvoice { path: PathBuf, message: String },

    // ── Casting ──
    #[error("failed to cast metadata value for key: {key} (expected {expected})")]
    CastFailure { key: String, expected: String },

    #[error("failed to cast invoice value for field: {field} (expected {expected})")]
    InvoiceCastFailure { field: String, expected: String },

    // ── Missing references ──
    #[error("Invoice field is missing: {0}")]
    MissingInvoiceField(String),

    #[error("metadata.json is required to resolve metadata magic variables")]
    MetadataDocumentRequired,

    #[error("Metadata key is missing: metadata.constant['{0}']")]
    MissingMetadataConstant(String),

    #[error("sample.names is empty")]
    EmptySampleNames,

    #[error("No raw file available to resolve ${{filename}}")]
    NoRawFile,

    // ── Validation ──
    #[error("Invoice validation failed for '{path}': {errors}")]
    InvoiceValidation { path: PathBuf, errors: String },

    #[error("Metadata validation failed for '{path}': {message}")]
    MetadataValidation { path: PathBuf, message: String },

    // ── Raised by user code (dataset callbacks) ──
    #[error("{message}")]
    Structured {
        code: i32,
        message: String,
        target: Option<PathBuf>,
        trace: Option<String>,
    },

    // ── Wrapped ──
    #[error("Failed to read Excel invoice row {index}: {message}")]
    ExcelInvoiceRow { index: usize, message: String },

    // ── Unexpected ──
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Failed to parse JSON '{path}': {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to read CSV '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to read workbook '{path}': {message}")]
    Excel { path: PathBuf, message: String },
}

/// Code reported for errors that are not part of the structured taxonomy.
pub const UNEXPECTED_ERROR_CODE: i32 = 999;

/// Code reported for structured errors that carry no code of their own.
pub const DEFAULT_ERROR_CODE: i32 = 1;

impl RdeError {
    /// Creates a user-level structured error.
    pub fn structured(code: i32, message: impl Into<String>) -> Self {
        RdeError::Structured {
            code,
            message: message.into(),
            target: None,
            trace: None,
        }
    }

    /// Structured errors are the ones whose message is meant for the user as-is.
    /// Everything else is an unexpected failure and gets wrapped by the pipeline.
    pub fn is_structured(&self) -> bool {
        !matches!(
            self,
            RdeError::Storage(_)
                | RdeError::Json { .. }
                | RdeError::Csv { .. }
                | RdeError::Excel { .. }
        )
    }

    pub fn code(&self) -> i32 {
        match self {
            RdeError::Structured { code, .. } => *code,
            RdeError::Storage(_)
            | RdeError::Json { .. }
            | RdeError::Csv { .. }
            | RdeError::Excel { .. } => UNEXPECTED_ERROR_CODE,
            RdeError::MissingSmartTableFile
            | RdeError::RowCsvCount { .. }
            | RdeError::EmptyRowCsv(_)
            | RdeError::InvalidExcelIndex(_)
            | RdeError::MissingInvoiceSnapshot(_)
            | RdeError::MissingInputFile { .. }
            | RdeError::MultipleInputSources { .. }
            | RdeError::UnknownMetadataKey(_)
            | RdeError::VariableMetadataUnsupported(_)
            | RdeError::InvalidMetadataDefinition(_)
            | RdeError::UnsupportedSampleField(_)
            | RdeError::UnsupportedMetadataField(_)
            | RdeError::UnsupportedPlaceholder(_)
            | RdeError::UnknownMode(_)
            | RdeError::InvalidSchema { .. }
            | RdeError::InvalidInvoice { .. }
            | RdeError::CastFailure { .. }
            | RdeError::InvoiceCastFailure { .. }
            | RdeError::MissingInvoiceField(_)
            | RdeError::MetadataDocumentRequired
            | RdeError::MissingMetadataConstant(_)
            | RdeError::EmptySampleNames
            | RdeError::NoRawFile
            | RdeError::InvoiceValidation { .. }
            | RdeError::MetadataValidation { .. }
            | RdeError::ExcelInvoiceRow { .. } => DEFAULT_ERROR_CODE,
        }
    }

    /// The file the error is about, when there is one.
    pub fn target(&self) -> Option<PathBuf> {
        match self {
            RdeError::Structured { target, .. } => target.clone(),
            RdeError::EmptyRowCsv(path) | RdeError::MissingInvoiceSnapshot(path) => {
                Some(path.clone())
            }
            RdeError::MissingInputFile { path, .. }
            | RdeError::InvalidSchema { path, .. }
            | RdeError::InvalidInvoice { path, .. }
            | RdeError::InvoiceValidation { path, .. }
            | RdeError::MetadataValidation { path, .. }
            | RdeError::Json { path, .. }
            | RdeError::Csv { path, .. }
            | RdeError::Excel { path, .. } => Some(path.clone()),
            RdeError::Storage(e) => e.path().map(|p| p.to_path_buf()),
            _ => None,
        }
    }

    /// Renders the error together with its `source()` chain.
    pub fn trace(&self) -> String {
        if let RdeError::Structured {
            trace: Some(trace), ..
        } = self
        {
            return trace.clone();
        }

        let mut rendered = format!("{:?}", self);
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            rendered.push_str("\ncaused by: ");
            rendered.push_str(&cause.to_string());
            source = cause.source();
        }
        rendered
    }
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to copy file from '{from}' to '{to}': {source}")]
    CopyFile {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to scan directory '{path}': {source}")]
    ScanDirectory {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

impl StorageError {
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            StorageError::CreateDirectory { path, .. }
            | StorageError::ReadFile { path, .. }
            | StorageError::WriteFile { path, .. }
            | StorageError::ScanDirectory { path, .. } => Some(path),
            StorageError::CopyFile { from, .. } => Some(from),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Failed to parse config YAML: {0}")]
    ParseYaml(#[from] serde_yaml::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },
}

/// Run-level failures returned by the workflow.
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error(
        "Unit {} failed in {} mode: {}",
        .0.run_id(),
        .0.mode(),
        .0.error_message().unwrap_or("unknown error")
    )]
    UnitFailed(Box<WorkflowExecutionStatus>),

    #[error(transparent)]
    Rde(#[from] RdeError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl WorkflowError {
    /// The failed status when a unit aborted the run.
    pub fn status(&self) -> Option<&WorkflowExecutionStatus> {
        match self {
            WorkflowError::UnitFailed(status) => Some(&**status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, RdeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_error_keeps_code() {
        let err = RdeError::structured(1060, "tile rejected");
        assert_eq!(err.code(), 1060);
        assert!(err.is_structured());
        assert_eq!(err.to_string(), "tile rejected");
    }

    #[test]
    fn test_storage_error_is_unexpected() {
        let err = RdeError::from(StorageError::ReadFile {
            path: PathBuf::from("/tmp/missing.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        });
        assert_eq!(err.code(), UNEXPECTED_ERROR_CODE);
        assert!(!err.is_structured());
        assert_eq!(err.target(), Some(PathBuf::from("/tmp/missing.json")));
        assert!(err.trace().contains("caused by: gone"));
    }

    #[test]
    fn test_domain_errors_use_default_code() {
        assert_eq!(RdeError::EmptySampleNames.code(), DEFAULT_ERROR_CODE);
        assert_eq!(
            RdeError::UnknownMetadataKey("count".to_string()).to_string(),
            "metadata definition not found for key: count"
        );
    }

    #[test]
    fn test_cast_failure_names_key() {
        let err = RdeError::CastFailure {
            key: "count".to_string(),
            expected: "integer".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("failed to cast metadata value"));
        assert!(msg.contains("count"));
    }

    #[test]
    fn test_structured_trace_is_preserved() {
        let err = RdeError::Structured {
            code: 42,
            message: "bad".to_string(),
            target: Some(PathBuf::from("a.csv")),
            trace: Some("at step 3".to_string()),
        };
        assert_eq!(err.trace(), "at step 3");
        assert_eq!(err.target(), Some(PathBuf::from("a.csv")));
    }
}
