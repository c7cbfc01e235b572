use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::RdeError;
use crate::invoice::ValueType;
use crate::storage;

/// Display name of a metadata key: plain, or localised `{ja, en}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryName {
    Plain(String),
    Localized { ja: Option<String>, en: Option<String> },
}

/// One parsed `metadata-def.json` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataEntry {
    pub key: String,
    pub name: Option<EntryName>,
    pub value_type: ValueType,
    pub unit: Option<String>,
    pub variable: bool,
    pub feature: bool,
}

impl MetadataEntry {
    fn parse(key: &str, raw: &Value) -> Result<Self, RdeError> {
        let invalid = |message: &str| {
            RdeError::InvalidMetadataDefinition(format!("entry '{}': {}", key, message))
        };
        let entry = raw.as_object().ok_or_else(|| invalid("must be an object"))?;

        let value_type = match entry
            .get("schema")
            .and_then(|schema| schema.get("type"))
            .and_then(Value::as_str)
        {
            Some(name) => ValueType::from_schema_type(name)
                .ok_or_else(|| invalid(&format!("unsupported schema type '{}'", name)))?,
            None => ValueType::String,
        };

        let name = match entry.get("name") {
            Some(Value::String(name)) => Some(EntryName::Plain(name.clone())),
            Some(Value::Object(names)) => Some(EntryName::Localized {
                ja: names.get("ja").and_then(Value::as_str).map(str::to_string),
                en: names.get("en").and_then(Value::as_str).map(str::to_string),
            }),
            _ => None,
        };

        Ok(Self {
            key: key.to_string(),
            name,
            value_type,
            unit: entry
                .get("unit")
                .and_then(Value::as_str)
                .filter(|unit| !unit.is_empty())
                .map(str::to_string),
            variable: entry.get("variable").is_some_and(is_truthy),
            feature: entry.get("_feature").is_some_and(is_truthy),
        })
    }

    /// `name.ja`, else `name.en`, else the plain name, else the key.
    pub fn label(&self) -> &str {
        match &self.name {
            Some(EntryName::Plain(name)) if !name.is_empty() => name,
            Some(EntryName::Localized { ja, en }) => ja
                .as_deref()
                .filter(|s| !s.is_empty())
                .or(en.as_deref().filter(|s| !s.is_empty()))
                .unwrap_or(&self.key),
            _ => &self.key,
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// `metadata-def.json`. Entries are parsed on lookup so one malformed entry
/// only fails the keys that use it.
#[derive(Debug, Clone)]
pub struct MetadataDefinition {
    path: PathBuf,
    entries: Map<String, Value>,
}

impl MetadataDefinition {
    pub fn load(path: &Path) -> Result<Self, RdeError> {
        if !path.is_file() {
            return Err(RdeError::InvalidMetadataDefinition(format!(
                "file not found: {}",
                path.display()
            )));
        }
        let document = storage::read_json(path)?;
        Self::from_value(path, document)
    }

    pub fn from_value(path: &Path, document: Value) -> Result<Self, RdeError> {
        match document {
            Value::Object(entries) => Ok(Self {
                path: path.to_path_buf(),
                entries,
            }),
            _ => Err(RdeError::InvalidMetadataDefinition(format!(
                "top level of {} must be an object",
                path.display()
            ))),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Result<Option<MetadataEntry>, RdeError> {
        self.entries
            .get(key)
            .map(|raw| MetadataEntry::parse(key, raw))
            .transpose()
    }

    /// Entries flagged `_feature`, in definition order.
    pub fn features(&self) -> Result<Vec<MetadataEntry>, RdeError> {
        let mut features = Vec::new();
        for (key, raw) in &self.entries {
            let entry = MetadataEntry::parse(key, raw)?;
            if entry.feature {
                features.push(entry);
            }
        }
        Ok(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn definition(document: Value) -> MetadataDefinition {
        MetadataDefinition::from_value(Path::new("metadata-def.json"), document).unwrap()
    }

    #[test]
    fn test_parse_entry() {
        let def = definition(json!({
            "temperature": {
                "name": { "ja": "温度", "en": "Temperature" },
                "schema": { "type": "number" },
                "unit": "K",
                "_feature": true
            }
        }));

        let entry = def.get("temperature").unwrap().unwrap();
        assert_eq!(entry.value_type, ValueType::Number);
        assert_eq!(entry.unit.as_deref(), Some("K"));
        assert_eq!(entry.label(), "温度");
        assert!(entry.feature);
        assert!(!entry.variable);
        assert!(def.get("missing").unwrap().is_none());
    }

    #[test]
    fn test_label_fallbacks() {
        let def = definition(json!({
            "a": { "name": { "en": "Alpha" } },
            "b": { "name": "Beta" },
            "c": {}
        }));
        assert_eq!(def.get("a").unwrap().unwrap().label(), "Alpha");
        assert_eq!(def.get("b").unwrap().unwrap().label(), "Beta");
        assert_eq!(def.get("c").unwrap().unwrap().label(), "c");
    }

    #[test]
    fn test_variable_truthiness() {
        let def = definition(json!({
            "on": { "variable": 1 },
            "off": { "variable": 0 },
            "text": { "variable": "yes" }
        }));
        assert!(def.get("on").unwrap().unwrap().variable);
        assert!(!def.get("off").unwrap().unwrap().variable);
        assert!(def.get("text").unwrap().unwrap().variable);
    }

    #[test]
    fn test_invalid_definitions() {
        assert!(matches!(
            MetadataDefinition::from_value(Path::new("d.json"), json!([])),
            Err(RdeError::InvalidMetadataDefinition(_))
        ));

        let def = definition(json!({ "x": { "schema": { "type": "date" } }, "y": 3 }));
        assert!(def.get("x").is_err());
        assert!(def.get("y").is_err());
    }

    #[test]
    fn test_features_in_order() {
        let def = definition(json!({
            "z": { "_feature": true },
            "a": { "_feature": false },
            "m": { "_feature": true }
        }));
        let keys: Vec<String> = def.features().unwrap().into_iter().map(|e| e.key).collect();
        assert_eq!(keys, vec!["z", "m"]);
    }
}
