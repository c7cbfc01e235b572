use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{error, info, warn};

use crate::config::find_config;
use crate::error::{RdeError, WorkflowError};
use crate::models::{
    Outcome, RdeInputDirPaths, RdeOutputResourcePath, WorkflowExecutionResults,
    WorkflowExecutionStatus,
};
use crate::pipeline::{DatasetCallback, PipelineFactory, ProcessingContext, ProcessingMode};
use crate::sanitize;
use crate::storage;

use super::snapshot::InvoiceSnapshotCache;
use super::units::{discover_units, UnitOfWork};

const TEMP_DIR: &str = "temp";
const INVOICE_ORG_FILE_NAME: &str = "invoice_org.json";

/// Runs every unit of work found in an input tree.
pub struct Workflow {
    srcpaths: RdeInputDirPaths,
    output_root: PathBuf,
    callback: Option<DatasetCallback>,
}

impl Workflow {
    pub fn new<P: AsRef<Path>>(srcpaths: RdeInputDirPaths, output_root: P) -> Self {
        Self {
            srcpaths,
            output_root: output_root.as_ref().to_path_buf(),
            callback: None,
        }
    }

    /// Standard layout: `inputdata/`, `invoice/` and `tasksupport/` under
    /// `root`, outputs written back into `root`. Configuration is read from
    /// `tasksupport/rdeconfig.{yaml,yml,json}` when present.
    pub fn from_root<P: AsRef<Path>>(root: P) -> Result<Self, WorkflowError> {
        let root = root.as_ref();
        let tasksupport = root.join("tasksupport");
        let (config, source) = find_config(&tasksupport)?;
        match source {
            Some(path) => info!("Loaded config from {}", sanitize::redact_path(&path)),
            None => info!("No rdeconfig found, using defaults"),
        }

        let srcpaths = RdeInputDirPaths::new(
            root.join("inputdata"),
            root.join("invoice"),
            tasksupport,
            config,
        );
        Ok(Self::new(srcpaths, root))
    }

    pub fn with_callback(mut self, callback: DatasetCallback) -> Self {
        self.callback = Some(callback);
        self
    }

    pub fn srcpaths(&self) -> &RdeInputDirPaths {
        &self.srcpaths
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    pub fn temp_dir(&self) -> PathBuf {
        self.output_root.join(TEMP_DIR)
    }

    pub fn invoice_org(&self) -> PathBuf {
        self.temp_dir().join(INVOICE_ORG_FILE_NAME)
    }

    /// Snapshots the invoice, discovers units and runs them in order.
    pub fn run(&self) -> Result<WorkflowExecutionResults, WorkflowError> {
        self.snapshot_invoice()?;
        let units = discover_units(&self.srcpaths, &self.temp_dir())?;
        info!(
            "Discovered {} unit(s) in {}",
            units.len(),
            sanitize::hash_path(&self.srcpaths.inputdata)
        );

        let factory = PipelineFactory::new(Arc::new(InvoiceSnapshotCache::new()));
        self.run_units(&factory, units)
    }

    /// Runs `units` in order. A failure aborts the run unless the unit is in
    /// `MultiDataTile` mode and `multidata_tile.ignore_errors` is set.
    pub fn run_units(
        &self,
        factory: &PipelineFactory,
        units: Vec<UnitOfWork>,
    ) -> Result<WorkflowExecutionResults, WorkflowError> {
        let ignore_errors = self.srcpaths.config.multidata_tile.ignore_errors;
        let mut results = WorkflowExecutionResults::new();

        for unit in units {
            let index = unit.index;
            let status = match self.run_unit(factory, unit) {
                Outcome::Success(status) => status,
                Outcome::Failure(error) => {
                    error!("Unit {} could not be set up, aborting run: {}", index, error);
                    return Err(WorkflowError::Rde(error));
                }
            };

            if status.is_success() {
                info!("Unit {} finished in {} mode", status.run_id(), status.mode());
                results.push(status);
                continue;
            }

            let message = status.error_message().unwrap_or_default().to_string();
            if ignore_errors && status.mode() == ProcessingMode::MultiDataTile.as_str() {
                warn!(
                    "Unit {} failed with code {:?}, continuing: {}",
                    status.run_id(),
                    status.error_code(),
                    message
                );
                results.push(status);
                continue;
            }
            error!("Unit {} failed, aborting run: {}", status.run_id(), message);
            return Err(WorkflowError::UnitFailed(Box::new(status)));
        }
        Ok(results)
    }

    /// Builds the context for one unit and executes its pipeline.
    ///
    /// `Success` carries the status the pipeline reported, which may be a
    /// failed one. `Failure` means the unit's output directories could not be
    /// created and no pipeline ran.
    pub fn run_unit(
        &self,
        factory: &PipelineFactory,
        unit: UnitOfWork,
    ) -> Outcome<WorkflowExecutionStatus, RdeError> {
        let resource_paths = RdeOutputResourcePath::for_unit(
            &self.output_root,
            unit.index,
            self.srcpaths.invoice_schema_json(),
            self.invoice_org(),
            unit.rawfiles,
        );
        if let Err(e) = resource_paths.create_dirs() {
            return Outcome::Failure(RdeError::from(e));
        }

        let mut ctx = ProcessingContext::new(
            unit.index.to_string(),
            self.srcpaths.clone(),
            resource_paths,
            unit.source,
            self.callback.clone(),
        );
        let pipeline = factory.create(ctx.mode());
        Outcome::Success(pipeline.execute(&mut ctx))
    }

    /// Copies the user's invoice to `temp/invoice_org.json` before any unit
    /// rewrites `invoice/invoice.json`.
    fn snapshot_invoice(&self) -> Result<(), RdeError> {
        let src = self.srcpaths.default_invoice_json();
        if !src.is_file() {
            warn!("No invoice.json in {}", sanitize::redact_path(&self.srcpaths.invoice));
            return Ok(());
        }
        storage::copy_file(&src, &self.invoice_org())?;
        Ok(())
    }
}
