pub mod outcome;
pub mod paths;
pub mod status;

pub use outcome::Outcome;
pub use paths::{DatasetPaths, OutputDir, RdeInputDirPaths, RdeOutputResourcePath};
pub use status::{ExecutionState, WorkflowExecutionResults, WorkflowExecutionStatus};
