use std::sync::Arc;

use crate::error::RdeError;
use crate::processor::{
    DataNameVariableApplier, DatasetCallbackRunner, DescriptionUpdater, ExcelInvoiceInitializer,
    InvoiceValidator, MetadataValidator, RdeFormatFileCopier, SmartTableFileCopier,
    SmartTableInvoiceInitializer, StandardInvoiceInitializer, StandardRawFileCopier,
    ThumbnailGenerator,
};
use crate::workflow::InvoiceSnapshotCache;

use super::mode::ProcessingMode;
use super::runner::Pipeline;

/// Builds the fixed processor sequence of each mode.
pub struct PipelineFactory {
    snapshots: Arc<InvoiceSnapshotCache>,
}

impl PipelineFactory {
    pub fn new(snapshots: Arc<InvoiceSnapshotCache>) -> Self {
        Self { snapshots }
    }

    pub fn snapshots(&self) -> &Arc<InvoiceSnapshotCache> {
        &self.snapshots
    }

    pub fn create(&self, mode: ProcessingMode) -> Pipeline {
        match mode {
            ProcessingMode::Invoice | ProcessingMode::MultiDataTile => {
                Self::with_tail(
                    Pipeline::new()
                        .add(StandardInvoiceInitializer)
                        .add(StandardRawFileCopier),
                )
            }
            ProcessingMode::RdeFormat => {
                Self::with_tail(
                    Pipeline::new()
                        .add(StandardInvoiceInitializer)
                        .add(RdeFormatFileCopier),
                )
            }
            ProcessingMode::ExcelInvoice => {
                Self::with_tail(
                    Pipeline::new()
                        .add(ExcelInvoiceInitializer)
                        .add(StandardRawFileCopier),
                )
            }
            ProcessingMode::SmartTableInvoice => Pipeline::new()
                .add(SmartTableInvoiceInitializer::new(self.snapshots.clone()))
                .add(SmartTableFileCopier)
                .add(DescriptionUpdater)
                .add(InvoiceValidator)
                .add(MetadataValidator)
                .add(DatasetCallbackRunner)
                .add(ThumbnailGenerator),
        }
    }

    /// Looks a mode up by name (case-insensitive).
    pub fn create_by_name(&self, name: &str) -> Result<Pipeline, RdeError> {
        Ok(self.create(name.parse()?))
    }

    fn with_tail(head: Pipeline) -> Pipeline {
        head.add(DescriptionUpdater)
            .add(DataNameVariableApplier)
            .add(InvoiceValidator)
            .add(MetadataValidator)
            .add(DatasetCallbackRunner)
            .add(ThumbnailGenerator)
    }
}
