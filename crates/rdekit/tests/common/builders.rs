//! Builder patterns for creating test documents programmatically.

#![allow(dead_code)]

use serde_json::{json, Map, Value};

/// Builder for `invoice.json` documents.
pub struct InvoiceBuilder {
    basic: Map<String, Value>,
    custom: Map<String, Value>,
    sample: Map<String, Value>,
}

impl InvoiceBuilder {
    pub fn new() -> Self {
        let mut basic = Map::new();
        basic.insert("dataName".to_string(), json!("dataset"));
        basic.insert("dataOwnerId".to_string(), json!("owner-0"));
        Self {
            basic,
            custom: Map::new(),
            sample: Map::new(),
        }
    }

    pub fn data_name(mut self, name: &str) -> Self {
        self.basic.insert("dataName".to_string(), json!(name));
        self
    }

    pub fn data_owner(mut self, owner: &str) -> Self {
        self.basic.insert("dataOwnerId".to_string(), json!(owner));
        self
    }

    pub fn basic(mut self, field: &str, value: Value) -> Self {
        self.basic.insert(field.to_string(), value);
        self
    }

    pub fn custom(mut self, field: &str, value: Value) -> Self {
        self.custom.insert(field.to_string(), value);
        self
    }

    pub fn sample_names(mut self, names: &[&str]) -> Self {
        self.sample.insert("names".to_string(), json!(names));
        self
    }

    pub fn sample_owner(mut self, owner: &str) -> Self {
        self.sample.insert("ownerId".to_string(), json!(owner));
        self
    }

    pub fn build(self) -> Value {
        json!({
            "basic": self.basic,
            "custom": self.custom,
            "sample": self.sample,
        })
    }
}

/// Builder for `metadata-def.json`.
pub struct MetadataDefBuilder {
    entries: Map<String, Value>,
}

impl MetadataDefBuilder {
    pub fn new() -> Self {
        Self {
            entries: Map::new(),
        }
    }

    pub fn entry(mut self, key: &str, value_type: &str) -> Self {
        self.entries
            .insert(key.to_string(), json!({ "name": { "en": key }, "schema": { "type": value_type } }));
        self
    }

    pub fn with_unit(mut self, key: &str, value_type: &str, unit: &str) -> Self {
        self.entries.insert(
            key.to_string(),
            json!({ "name": { "en": key }, "schema": { "type": value_type }, "unit": unit }),
        );
        self
    }

    pub fn variable(mut self, key: &str, value_type: &str) -> Self {
        self.entries.insert(
            key.to_string(),
            json!({ "schema": { "type": value_type }, "variable": 1 }),
        );
        self
    }

    pub fn build(self) -> Value {
        Value::Object(self.entries)
    }
}

/// Builder for SmartTable CSV sources (display row, key row, data rows).
pub struct SmartTableBuilder {
    keys: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl SmartTableBuilder {
    pub fn new(keys: &[&str]) -> Self {
        Self {
            keys: keys.iter().map(|k| k.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn row(mut self, values: &[&str]) -> Self {
        self.rows.push(values.iter().map(|v| v.to_string()).collect());
        self
    }

    pub fn build(self) -> String {
        let mut out = String::new();
        let display: Vec<String> = self.keys.iter().map(|k| format!("Display {}", k)).collect();
        for line in std::iter::once(&display)
            .chain(std::iter::once(&self.keys))
            .chain(self.rows.iter())
        {
            out.push_str(&line.join(","));
            out.push('\n');
        }
        out
    }
}
