use std::path::Path;

use serde_json::{json, Map, Value};

use crate::error::RdeError;
use crate::storage;

/// `metadata.json` of one unit: `{ "constant": {...}, "variable": [...] }`.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataDocument {
    document: Value,
}

impl Default for MetadataDocument {
    fn default() -> Self {
        Self {
            document: json!({ "constant": {}, "variable": [] }),
        }
    }
}

impl MetadataDocument {
    pub fn from_value(document: Value) -> Self {
        Self { document }
    }

    pub fn load(path: &Path) -> Result<Self, RdeError> {
        Ok(Self::from_value(storage::read_json(path)?))
    }

    /// Loads the document, or starts an empty one when the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, RdeError> {
        if path.is_file() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn as_value(&self) -> &Value {
        &self.document
    }

    pub fn constant_value(&self, key: &str) -> Option<&Value> {
        self.document.get("constant")?.get(key)?.get("value")
    }

    /// Replaces `constant.<key>` with `{value, unit?}`. Other keys are kept.
    pub fn upsert_constant(&mut self, key: &str, value: Value, unit: Option<&str>) {
        let mut entry = Map::new();
        entry.insert("value".to_string(), value);
        if let Some(unit) = unit {
            entry.insert("unit".to_string(), Value::String(unit.to_string()));
        }

        if !self.document.is_object() {
            self.document = json!({ "variable": [] });
        }
        if let Some(root) = self.document.as_object_mut() {
            let constant = root
                .entry("constant".to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !constant.is_object() {
                *constant = Value::Object(Map::new());
            }
            if let Some(constant) = constant.as_object_mut() {
                constant.insert(key.to_string(), Value::Object(entry));
            }
        }
    }

    /// Structural check: object `constant` whose entries carry `value`, array `variable`.
    pub fn validate(&self) -> Result<(), String> {
        let root = self
            .document
            .as_object()
            .ok_or_else(|| "top level must be an object".to_string())?;

        if let Some(constant) = root.get("constant") {
            let constant = constant
                .as_object()
                .ok_or_else(|| "'constant' must be an object".to_string())?;
            for (key, entry) in constant {
                if entry.get("value").is_none() {
                    return Err(format!("constant '{}' has no value", key));
                }
            }
        }

        if let Some(variable) = root.get("variable") {
            if !variable.is_array() {
                return Err("'variable' must be an array".to_string());
            }
        }
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<(), RdeError> {
        storage::write_json(path, &self.document)
    }
}
