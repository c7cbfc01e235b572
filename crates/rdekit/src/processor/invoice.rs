use tracing::debug;

use crate::error::RdeError;
use crate::invoice::{self, ExcelInvoiceFile, InvoiceSchema};
use crate::pipeline::{ProcessingContext, Processor};
use crate::storage;

/// Copies the original invoice snapshot to the unit's `invoice.json`.
pub struct StandardInvoiceInitializer;

impl Processor for StandardInvoiceInitializer {
    fn name(&self) -> &'static str {
        "StandardInvoiceInitializer"
    }

    fn process(&self, ctx: &mut ProcessingContext) -> Result<(), RdeError> {
        let src = &ctx.resource_paths.invoice_org;
        if !src.is_file() {
            return Err(RdeError::MissingInvoiceSnapshot(src.clone()));
        }
        let dst = ctx.invoice_dst();
        storage::copy_file(src, &dst)?;
        debug!(unit = %ctx.index, "Copied original invoice");
        Ok(())
    }
}

/// Builds the unit's invoice from one data row of the Excel invoice.
pub struct ExcelInvoiceInitializer;

impl ExcelInvoiceInitializer {
    fn overwrite(&self, ctx: &ProcessingContext, index: usize) -> Result<(), RdeError> {
        let file = ctx.excel_file().ok_or_else(|| RdeError::ExcelInvoiceRow {
            index,
            message: "no Excel invoice file for this unit".to_string(),
        })?;

        let src = &ctx.resource_paths.invoice_org;
        let mut base = if src.is_file() {
            invoice::load_invoice(src)?
        } else {
            invoice::empty_invoice()
        };

        let schema_path = &ctx.resource_paths.invoice_schema_json;
        let schema = if schema_path.is_file() {
            Some(InvoiceSchema::load(schema_path)?)
        } else {
            None
        };

        ExcelInvoiceFile::new(file).overwrite(&mut base, index, schema.as_ref())?;
        invoice::save_invoice(&ctx.invoice_dst(), &base)
    }
}

impl Processor for ExcelInvoiceInitializer {
    fn name(&self) -> &'static str {
        "ExcelInvoiceInitializer"
    }

    fn process(&self, ctx: &mut ProcessingContext) -> Result<(), RdeError> {
        let index = ctx.excel_index()?;
        self.overwrite(ctx, index).map_err(|error| {
            if error.is_structured() {
                error
            } else {
                RdeError::ExcelInvoiceRow {
                    index,
                    message: error.to_string(),
                }
            }
        })
    }
}
