//! Column keys shared by SmartTable sheets and Excel invoices.

use serde_json::{json, Value};

use crate::error::RdeError;

use super::schema::InvoiceSchema;
use super::{section_mut, SECTION_BASIC, SECTION_CUSTOM, SECTION_SAMPLE};

/// A parsed column key such as `basic/dataName` or `meta/temperature`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKey<'a> {
    Basic(&'a str),
    Custom(&'a str),
    /// `sample/generalAttributes.<termId>`
    GeneralAttribute(&'a str),
    /// `sample/specificAttributes.<classId>.<termId>`
    SpecificAttribute { class_id: &'a str, term_id: &'a str },
    SampleNames,
    Sample(&'a str),
    Meta(&'a str),
    /// `inputdata<N>` or `data_file_names/<x>`: names a raw file, not an invoice field.
    FileMapping,
    Unknown,
}

impl<'a> ColumnKey<'a> {
    pub fn parse(key: &'a str) -> Self {
        let key = key.trim();
        if key.starts_with("inputdata") || key.starts_with("data_file_names/") {
            return ColumnKey::FileMapping;
        }

        let Some((prefix, field)) = key.split_once('/') else {
            return ColumnKey::Unknown;
        };
        if field.is_empty() {
            return ColumnKey::Unknown;
        }

        match prefix {
            "basic" => ColumnKey::Basic(field),
            "custom" => ColumnKey::Custom(field),
            "meta" => ColumnKey::Meta(field),
            "sample" => Self::parse_sample(field),
            _ => ColumnKey::Unknown,
        }
    }

    fn parse_sample(field: &'a str) -> Self {
        if field == "names" {
            return ColumnKey::SampleNames;
        }
        if let Some(term_id) = field.strip_prefix("generalAttributes.") {
            if !term_id.is_empty() {
                return ColumnKey::GeneralAttribute(term_id);
            }
            return ColumnKey::Unknown;
        }
        if let Some(rest) = field.strip_prefix("specificAttributes.") {
            return match rest.split_once('.') {
                Some((class_id, term_id)) if !class_id.is_empty() && !term_id.is_empty() => {
                    ColumnKey::SpecificAttribute { class_id, term_id }
                }
                _ => ColumnKey::Unknown,
            };
        }
        ColumnKey::Sample(field)
    }
}

/// Writes one non-meta column value into the invoice.
///
/// Returns `false` for keys that do not target the invoice (`meta/`, file
/// mappings, unknown prefixes); the caller decides what to do with those.
pub fn apply_column(
    invoice: &mut Value,
    key: ColumnKey<'_>,
    value: &str,
    schema: Option<&InvoiceSchema>,
) -> Result<bool, RdeError> {
    match key {
        ColumnKey::Basic(field) => {
            section_mut(invoice, SECTION_BASIC).insert(field.to_string(), json!(value));
        }
        ColumnKey::Custom(field) => {
            let cast = match schema {
                Some(schema) => schema.cast_field(SECTION_CUSTOM, field, value)?,
                None => json!(value),
            };
            section_mut(invoice, SECTION_CUSTOM).insert(field.to_string(), cast);
        }
        ColumnKey::GeneralAttribute(term_id) => {
            upsert_attribute(invoice, "generalAttributes", None, term_id, value);
        }
        ColumnKey::SpecificAttribute { class_id, term_id } => {
            upsert_attribute(invoice, "specificAttributes", Some(class_id), term_id, value);
        }
        ColumnKey::SampleNames => {
            section_mut(invoice, SECTION_SAMPLE).insert("names".to_string(), json!([value]));
        }
        ColumnKey::Sample(field) => {
            section_mut(invoice, SECTION_SAMPLE).insert(field.to_string(), json!(value));
        }
        ColumnKey::Meta(_) | ColumnKey::FileMapping | ColumnKey::Unknown => return Ok(false),
    }
    Ok(true)
}

/// Updates `value` of the entry matching the ids, or appends a new entry.
fn upsert_attribute(
    invoice: &mut Value,
    list_name: &str,
    class_id: Option<&str>,
    term_id: &str,
    value: &str,
) {
    let sample = section_mut(invoice, SECTION_SAMPLE);
    let list = sample
        .entry(list_name.to_string())
        .or_insert_with(|| json!([]));
    if !list.is_array() {
        *list = json!([]);
    }
    let Some(entries) = list.as_array_mut() else {
        return;
    };

    let matches = |entry: &Value| {
        entry.get("termId").and_then(Value::as_str) == Some(term_id)
            && class_id.map_or(true, |id| {
                entry.get("classId").and_then(Value::as_str) == Some(id)
            })
    };

    if let Some(entry) = entries.iter_mut().find(|e| matches(e)) {
        if let Some(map) = entry.as_object_mut() {
            map.insert("value".to_string(), json!(value));
        }
        return;
    }

    let entry = match class_id {
        Some(class_id) => json!({ "classId": class_id, "termId": term_id, "value": value }),
        None => json!({ "termId": term_id, "value": value }),
    };
    entries.push(entry);
}
