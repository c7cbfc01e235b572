//! Concrete pipeline steps.

pub mod datasets;
pub mod descriptions;
pub mod files;
pub mod invoice;
pub mod smarttable;
pub mod thumbnails;
pub mod validation;
pub mod variables;

pub use datasets::DatasetCallbackRunner;
pub use descriptions::DescriptionUpdater;
pub use files::{RdeFormatFileCopier, SmartTableFileCopier, StandardRawFileCopier};
pub use invoice::{ExcelInvoiceInitializer, StandardInvoiceInitializer};
pub use smarttable::SmartTableInvoiceInitializer;
pub use thumbnails::ThumbnailGenerator;
pub use validation::{InvoiceValidator, MetadataValidator};
pub use variables::DataNameVariableApplier;
