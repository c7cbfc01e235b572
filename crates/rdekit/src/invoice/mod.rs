//! Invoice documents.
//!
//! An invoice is a JSON object with `basic`, `custom` and `sample` sections.
//! Key order is preserved on rewrite (`serde_json/preserve_order`).

pub mod excel;
pub mod magic;
pub mod mapping;
pub mod schema;

use std::path::Path;

use serde_json::{json, Map, Value};

use crate::error::RdeError;
use crate::storage;

pub use excel::{ExcelInvoiceFile, ExcelInvoiceTable};
pub use magic::{apply_magic_variables, contains_placeholder, ChangeSet};
pub use mapping::{apply_column, ColumnKey};
pub use schema::{cast_value, InvoiceSchema, ValueType};

pub const SECTION_BASIC: &str = "basic";
pub const SECTION_CUSTOM: &str = "custom";
pub const SECTION_SAMPLE: &str = "sample";

/// Skeleton used when no prior invoice exists.
pub fn empty_invoice() -> Value {
    json!({ "basic": {}, "custom": {}, "sample": {} })
}

/// Returns the named section, replacing a missing or non-object value with `{}`.
pub fn section_mut<'a>(invoice: &'a mut Value, name: &str) -> &'a mut Map<String, Value> {
    if !invoice.is_object() {
        *invoice = Value::Object(Map::new());
    }
    let root = match invoice {
        Value::Object(map) => map,
        _ => unreachable!("invoice was normalised to an object"),
    };
    let section = root
        .entry(name.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !section.is_object() {
        *section = Value::Object(Map::new());
    }
    match section {
        Value::Object(map) => map,
        _ => unreachable!("section was normalised to an object"),
    }
}

pub fn data_name(invoice: &Value) -> Option<&str> {
    invoice
        .get(SECTION_BASIC)
        .and_then(|basic| basic.get("dataName"))
        .and_then(Value::as_str)
}

pub fn load_invoice(path: &Path) -> Result<Value, RdeError> {
    let invoice = storage::read_json(path)?;
    if !invoice.is_object() {
        return Err(RdeError::InvalidInvoice {
            path: path.to_path_buf(),
            message: "top level must be an object".to_string(),
        });
    }
    Ok(invoice)
}

pub fn save_invoice(path: &Path, invoice: &Value) -> Result<(), RdeError> {
    storage::write_json(path, invoice)
}
