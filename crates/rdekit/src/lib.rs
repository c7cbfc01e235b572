pub mod config;
pub mod error;
pub mod invoice;
pub mod logging;
pub mod metadata;
pub mod models;
pub mod pipeline;
pub mod processor;
pub mod sanitize;
pub mod smarttable;
pub mod storage;
pub mod workflow;

pub use config::{find_config, load_config, Config};
pub use error::{ConfigError, RdeError, Result, StorageError, WorkflowError};
pub use invoice::{apply_magic_variables, ChangeSet, InvoiceSchema};
pub use logging::init_logging;
pub use models::{
    DatasetPaths, ExecutionState, Outcome, RdeInputDirPaths, RdeOutputResourcePath,
    WorkflowExecutionResults, WorkflowExecutionStatus,
};
pub use pipeline::{
    resolve_mode, DatasetCallback, Pipeline, PipelineFactory, ProcessingContext, ProcessingMode,
    Processor, UnitSource,
};
pub use workflow::{InvoiceSnapshotCache, UnitOfWork, Workflow};
