use crate::error::RdeError;
use crate::invoice::apply_magic_variables;
use crate::pipeline::{ProcessingContext, Processor};

/// Resolves `${...}` in `basic.dataName` when `system.magic_variable` is on.
pub struct DataNameVariableApplier;

impl Processor for DataNameVariableApplier {
    fn name(&self) -> &'static str {
        "DataNameVariableApplier"
    }

    fn process(&self, ctx: &mut ProcessingContext) -> Result<(), RdeError> {
        if !ctx.srcpaths.config.system.magic_variable {
            return Ok(());
        }
        let metadata = ctx.metadata_dst();
        let changes = apply_magic_variables(
            &ctx.invoice_dst(),
            ctx.primary_rawfile(),
            Some(metadata.as_path()),
            true,
        )?;
        if let Some(name) = changes.get("basic.dataName") {
            tracing::info!(unit = %ctx.index, data_name = %name, "Applied magic variables");
        }
        Ok(())
    }
}
