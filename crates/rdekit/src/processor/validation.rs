use crate::error::RdeError;
use crate::invoice::{self, InvoiceSchema};
use crate::metadata::MetadataDocument;
use crate::pipeline::{ProcessingContext, Processor};

/// Validates the unit's `invoice.json` against `invoice.schema.json`.
pub struct InvoiceValidator;

impl Processor for InvoiceValidator {
    fn name(&self) -> &'static str {
        "InvoiceValidator"
    }

    fn process(&self, ctx: &mut ProcessingContext) -> Result<(), RdeError> {
        let schema_path = &ctx.resource_paths.invoice_schema_json;
        if !schema_path.is_file() {
            return Err(RdeError::InvalidSchema {
                path: schema_path.clone(),
                message: "schema file not found".to_string(),
            });
        }
        let schema = InvoiceSchema::load(schema_path)?;
        let invoice_path = ctx.invoice_dst();
        let document = invoice::load_invoice(&invoice_path)?;
        schema.validate(&document, &invoice_path)
    }
}

/// Checks the shape of `metadata.json` when the unit produced one.
pub struct MetadataValidator;

impl Processor for MetadataValidator {
    fn name(&self) -> &'static str {
        "MetadataValidator"
    }

    fn process(&self, ctx: &mut ProcessingContext) -> Result<(), RdeError> {
        let path = ctx.metadata_dst();
        if !path.is_file() {
            return Ok(());
        }
        MetadataDocument::load(&path)?
            .validate()
            .map_err(|message| RdeError::MetadataValidation { path, message })
    }
}
