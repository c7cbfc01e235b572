//! Test harness for isolated workflow runs.
//!
//! Every harness owns a temp directory laid out like a dataset root. Outputs
//! are written back into the same root, as `Workflow::from_root` does.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use assert_fs::prelude::*;
use assert_fs::TempDir;
use serde_json::Value;

use rdekit::{Workflow, WorkflowError, WorkflowExecutionResults};

pub struct TestHarness {
    temp_dir: TempDir,
}

impl TestHarness {
    /// Creates the directory tree with a permissive invoice schema.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        for dir in ["inputdata", "invoice", "tasksupport"] {
            temp_dir
                .child(dir)
                .create_dir_all()
                .expect("Failed to create dataset directory");
        }
        let harness = Self { temp_dir };
        harness.write_schema(&serde_json::json!({ "type": "object" }));
        harness
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.temp_dir.path().join(rel)
    }

    pub fn write(&self, rel: &str, content: &str) -> PathBuf {
        let child = self.temp_dir.child(rel);
        if let Some(parent) = child.path().parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        child.write_str(content).expect("Failed to write file");
        child.path().to_path_buf()
    }

    pub fn write_input(&self, name: &str, content: &str) -> PathBuf {
        self.write(&format!("inputdata/{}", name), content)
    }

    pub fn write_invoice(&self, invoice: &Value) -> PathBuf {
        self.write("invoice/invoice.json", &pretty(invoice))
    }

    pub fn write_schema(&self, schema: &Value) -> PathBuf {
        self.write("tasksupport/invoice.schema.json", &pretty(schema))
    }

    pub fn write_metadata_def(&self, def: &Value) -> PathBuf {
        self.write("tasksupport/metadata-def.json", &pretty(def))
    }

    pub fn write_config(&self, yaml: &str) -> PathBuf {
        self.write("tasksupport/rdeconfig.yaml", yaml)
    }

    pub fn workflow(&self) -> Workflow {
        Workflow::from_root(self.root()).expect("Failed to build workflow")
    }

    pub fn run(&self) -> Result<WorkflowExecutionResults, WorkflowError> {
        self.workflow().run()
    }

    pub fn read_json(&self, rel: &str) -> Value {
        let content = std::fs::read_to_string(self.path(rel))
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", rel, e));
        serde_json::from_str(&content).expect("Output is not valid JSON")
    }

    /// `invoice.json` of unit `index`.
    pub fn unit_invoice(&self, index: usize) -> Value {
        self.read_json(&unit_path(index, "invoice/invoice.json"))
    }

    /// `metadata.json` of unit `index`.
    pub fn unit_metadata(&self, index: usize) -> Value {
        self.read_json(&unit_path(index, "meta/metadata.json"))
    }

    pub fn unit_file_exists(&self, index: usize, rel: &str) -> bool {
        self.path(&unit_path(index, rel)).exists()
    }
}

pub fn unit_path(index: usize, rel: &str) -> String {
    if index == 0 {
        rel.to_string()
    } else {
        format!("divided/{:04}/{}", index, rel)
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).expect("Failed to serialize JSON")
}
