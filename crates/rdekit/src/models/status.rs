use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RdeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionState {
    Success,
    Failed,
}

/// Terminal record describing how one unit of work ended.
///
/// Fields are private so a status cannot be altered once built.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowExecutionStatus {
    run_id: String,
    title: String,
    status: ExecutionState,
    mode: String,
    error_code: Option<i32>,
    error_message: Option<String>,
    target: Option<PathBuf>,
    stacktrace: Option<String>,
    #[serde(skip)]
    exception_object: Option<Arc<RdeError>>,
}

impl WorkflowExecutionStatus {
    pub fn success(run_id: impl Into<String>, title: impl Into<String>, mode: &str) -> Self {
        Self {
            run_id: run_id.into(),
            title: title.into(),
            status: ExecutionState::Success,
            mode: mode.to_string(),
            error_code: None,
            error_message: None,
            target: None,
            stacktrace: None,
            exception_object: None,
        }
    }

    /// Builds a failed status from an error.
    ///
    /// Structured errors keep their own code, message and trace. Anything
    /// else is reported as an unexpected error of the given mode.
    pub fn failed(
        run_id: impl Into<String>,
        title: impl Into<String>,
        mode: &str,
        error: RdeError,
    ) -> Self {
        let error_message = if error.is_structured() {
            error.to_string()
        } else {
            format!("unexpected error in {} mode: {}", mode, error)
        };

        Self {
            run_id: run_id.into(),
            title: title.into(),
            status: ExecutionState::Failed,
            mode: mode.to_string(),
            error_code: Some(error.code()),
            error_message: Some(error_message),
            target: error.target(),
            stacktrace: Some(error.trace()),
            exception_object: Some(Arc::new(error)),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn status(&self) -> ExecutionState {
        self.status
    }

    pub fn is_success(&self) -> bool {
        self.status == ExecutionState::Success
    }

    pub fn mode(&self) -> &str {
        &self.mode
    }

    pub fn error_code(&self) -> Option<i32> {
        self.error_code
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn target(&self) -> Option<&std::path::Path> {
        self.target.as_deref()
    }

    pub fn stacktrace(&self) -> Option<&str> {
        self.stacktrace.as_deref()
    }

    pub fn exception_object(&self) -> Option<&RdeError> {
        self.exception_object.as_deref()
    }
}

/// Every status produced during one run, in unit order.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowExecutionResults {
    run_id: String,
    started_at: DateTime<Utc>,
    statuses: Vec<WorkflowExecutionStatus>,
}

impl WorkflowExecutionResults {
    pub fn new() -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            statuses: Vec::new(),
        }
    }

    pub fn push(&mut self, status: WorkflowExecutionStatus) {
        self.statuses.push(status);
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn statuses(&self) -> &[WorkflowExecutionStatus] {
        &self.statuses
    }

    pub fn failures(&self) -> impl Iterator<Item = &WorkflowExecutionStatus> {
        self.statuses.iter().filter(|s| !s.is_success())
    }

    pub fn is_success(&self) -> bool {
        self.statuses.iter().all(WorkflowExecutionStatus::is_success)
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl Default for WorkflowExecutionResults {
    fn default() -> Self {
        Self::new()
    }
}
