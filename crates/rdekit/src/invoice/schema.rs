use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::{Number, Value};

use crate::error::RdeError;
use crate::storage;

/// Scalar types a schema can declare for an invoice field or metadata key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    String,
    Integer,
    Number,
    Boolean,
}

impl ValueType {
    pub fn from_schema_type(name: &str) -> Option<Self> {
        match name {
            "string" => Some(ValueType::String),
            "integer" => Some(ValueType::Integer),
            "number" => Some(ValueType::Number),
            "boolean" => Some(ValueType::Boolean),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Integer => "integer",
            ValueType::Number => "number",
            ValueType::Boolean => "boolean",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Casts a cell value to `ty`. `None` when the text does not parse.
///
/// Booleans accept `true`/`false`/`1`/`0` in any case.
pub fn cast_value(raw: &str, ty: ValueType) -> Option<Value> {
    let trimmed = raw.trim();
    match ty {
        ValueType::String => Some(Value::String(raw.to_string())),
        ValueType::Integer => trimmed.parse::<i64>().ok().map(Value::from),
        ValueType::Number => trimmed
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number),
        ValueType::Boolean => match trimmed.to_ascii_lowercase().as_str() {
            "true" | "1" => Some(Value::Bool(true)),
            "false" | "0" => Some(Value::Bool(false)),
            _ => None,
        },
    }
}

/// `invoice.schema.json` from the task-support directory.
#[derive(Debug, Clone)]
pub struct InvoiceSchema {
    path: PathBuf,
    document: Value,
}

impl InvoiceSchema {
    pub fn load(path: &Path) -> Result<Self, RdeError> {
        let document = storage::read_json(path)?;
        Self::from_value(path, document)
    }

    pub fn from_value(path: &Path, document: Value) -> Result<Self, RdeError> {
        if !document.is_object() {
            return Err(RdeError::InvalidSchema {
                path: path.to_path_buf(),
                message: "top level must be an object".to_string(),
            });
        }
        Ok(Self {
            path: path.to_path_buf(),
            document,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Top-level `required` names, `None` when the list is absent or malformed.
    pub fn required_sections(&self) -> Option<Vec<String>> {
        let required = self.document.get("required")?.as_array()?;
        required
            .iter()
            .map(|name| name.as_str().map(str::to_string))
            .collect()
    }

    /// Declared scalar type of `properties.<section>.properties.<field>`.
    ///
    /// For union types the first non-null member wins.
    pub fn field_type(&self, section: &str, field: &str) -> Option<ValueType> {
        let declared = self
            .document
            .get("properties")?
            .get(section)?
            .get("properties")?
            .get(field)?
            .get("type")?;

        match declared {
            Value::String(name) => ValueType::from_schema_type(name),
            Value::Array(names) => names
                .iter()
                .filter_map(Value::as_str)
                .filter(|name| *name != "null")
                .find_map(ValueType::from_schema_type),
            _ => None,
        }
    }

    /// Casts a cell destined for `<section>.<field>`; undeclared fields stay strings.
    pub fn cast_field(&self, section: &str, field: &str, raw: &str) -> Result<Value, RdeError> {
        let Some(ty) = self.field_type(section, field) else {
            return Ok(Value::String(raw.to_string()));
        };
        cast_value(raw, ty).ok_or_else(|| RdeError::InvoiceCastFailure {
            field: format!("{}.{}", section, field),
            expected: ty.to_string(),
        })
    }

    /// Validates `instance` (read from `instance_path`) against this schema.
    pub fn validate(&self, instance: &Value, instance_path: &Path) -> Result<(), RdeError> {
        let validator =
            jsonschema::validator_for(&self.document).map_err(|e| RdeError::InvalidSchema {
                path: self.path.clone(),
                message: e.to_string(),
            })?;

        let errors: Vec<String> = validator
            .iter_errors(instance)
            .map(|e| e.to_string())
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(RdeError::InvoiceValidation {
                path: instance_path.to_path_buf(),
                errors: errors.join("; "),
            })
        }
    }
}
