//! `${...}` substitution in `basic.dataName`.
//!
//! Supported placeholders:
//!
//! - `${filename}`: file name of the unit's raw file
//! - `${invoice:basic:<field>}` and `${invoice:custom:<field>}`
//! - `${invoice:sample:names}`: non-empty sample names joined by `_`
//! - `${metadata:constant:<key>}`: `constant.<key>.value` of metadata.json
//!
//! A placeholder that resolves to an empty string is dropped together with
//! one neighbouring `_`, so `a_${empty}_b` becomes `a_b`.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use tracing::warn;

use crate::error::RdeError;
use crate::storage;

use super::{load_invoice, save_invoice, section_mut, SECTION_BASIC};

const DATA_NAME_FIELD: &str = "basic.dataName";

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{([^}]*)\}").expect("placeholder regex is valid"))
}

pub fn contains_placeholder(template: &str) -> bool {
    placeholder_regex().is_match(template)
}

/// Fields rewritten by one substitution pass, keyed by dotted path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    changes: Vec<(String, String)>,
}

impl ChangeSet {
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.changes.push((field.into(), value.into()));
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.changes
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.changes.iter().map(|(f, v)| (f.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// A parsed placeholder expression.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Placeholder<'a> {
    Filename,
    InvoiceField { section: &'a str, field: &'a str },
    SampleNames,
    MetadataConstant(&'a str),
}

impl<'a> Placeholder<'a> {
    fn parse(expr: &'a str) -> Result<Self, RdeError> {
        let unsupported = || RdeError::UnsupportedPlaceholder(expr.to_string());
        let parts: Vec<&str> = expr.trim().split(':').collect();

        match parts.as_slice() {
            ["filename"] => Ok(Placeholder::Filename),
            ["invoice", "sample", field] => match *field {
                "names" => Ok(Placeholder::SampleNames),
                other => Err(RdeError::UnsupportedSampleField(other.to_string())),
            },
            ["invoice", section @ ("basic" | "custom"), field] if !field.is_empty() => {
                Ok(Placeholder::InvoiceField {
                    section: *section,
                    field: *field,
                })
            }
            ["metadata", "constant", key] if !key.is_empty() => {
                Ok(Placeholder::MetadataConstant(*key))
            }
            ["metadata", "constant", ..] => Err(unsupported()),
            ["metadata", field, ..] => Err(RdeError::UnsupportedMetadataField(field.to_string())),
            _ => Err(unsupported()),
        }
    }
}

/// Resolution sources for one template.
pub struct MagicVariableResolver<'a> {
    invoice: &'a Value,
    metadata: Option<&'a Value>,
    rawfile: Option<&'a Path>,
}

impl<'a> MagicVariableResolver<'a> {
    pub fn new(invoice: &'a Value, metadata: Option<&'a Value>, rawfile: Option<&'a Path>) -> Self {
        Self {
            invoice,
            metadata,
            rawfile,
        }
    }

    /// Resolves one placeholder expression (the text between `${` and `}`).
    pub fn resolve(&self, expr: &str) -> Result<String, RdeError> {
        match Placeholder::parse(expr)? {
            Placeholder::Filename => self
                .rawfile
                .and_then(|p| p.file_name())
                .and_then(|n| n.to_str())
                .map(str::to_string)
                .ok_or(RdeError::NoRawFile),
            Placeholder::InvoiceField { section, field } => {
                let value = self
                    .invoice
                    .get(section)
                    .and_then(|s| s.get(field))
                    .ok_or_else(|| {
                        RdeError::MissingInvoiceField(format!("{}.{}", section, field))
                    })?;
                let rendered = render(value);
                if rendered.is_empty() {
                    warn!(section, field, "Magic variable resolved to an empty value");
                }
                Ok(rendered)
            }
            Placeholder::SampleNames => self.sample_names(),
            Placeholder::MetadataConstant(key) => {
                let metadata = self.metadata.ok_or(RdeError::MetadataDocumentRequired)?;
                let value = metadata
                    .get("constant")
                    .and_then(|c| c.get(key))
                    .and_then(|entry| entry.get("value"))
                    .ok_or_else(|| RdeError::MissingMetadataConstant(key.to_string()))?;
                let rendered = render(value);
                if rendered.is_empty() {
                    warn!(key = %key, "Metadata constant resolved to an empty value");
                }
                Ok(rendered)
            }
        }
    }

    fn sample_names(&self) -> Result<String, RdeError> {
        let names = self
            .invoice
            .get("sample")
            .and_then(|s| s.get("names"))
            .and_then(Value::as_array)
            .filter(|names| !names.is_empty())
            .ok_or(RdeError::EmptySampleNames)?;

        let joined = names
            .iter()
            .map(render)
            .filter(|name| !name.trim().is_empty())
            .collect::<Vec<_>>()
            .join("_");
        if joined.is_empty() {
            warn!("All sample names are blank");
        }
        Ok(joined)
    }

    /// Expands every placeholder in `template`.
    pub fn expand(&self, template: &str) -> Result<String, RdeError> {
        let mut segments = Vec::new();
        let mut last = 0;
        for captures in placeholder_regex().captures_iter(template) {
            let (Some(whole), Some(expr)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            if whole.start() > last {
                segments.push(Segment::Literal(&template[last..whole.start()]));
            }
            segments.push(Segment::Resolved(self.resolve(expr.as_str())?));
            last = whole.end();
        }
        if last < template.len() {
            segments.push(Segment::Literal(&template[last..]));
        }
        Ok(join_segments(segments))
    }
}

enum Segment<'a> {
    Literal(&'a str),
    Resolved(String),
}

/// Concatenates segments, dropping one `_` next to each empty resolved value.
fn join_segments(segments: Vec<Segment<'_>>) -> String {
    let mut out = String::new();
    let mut last_was_literal = false;
    let mut strip_next_underscore = false;

    for segment in segments {
        match segment {
            Segment::Literal(text) => {
                let text = if strip_next_underscore {
                    text.strip_prefix('_').unwrap_or(text)
                } else {
                    text
                };
                strip_next_underscore = false;
                out.push_str(text);
                last_was_literal = true;
            }
            Segment::Resolved(value) if value.is_empty() => {
                if last_was_literal && out.ends_with('_') {
                    out.pop();
                } else if out.is_empty() || out.ends_with('_') {
                    strip_next_underscore = true;
                }
                last_was_literal = false;
            }
            Segment::Resolved(value) => {
                out.push_str(&value);
                strip_next_underscore = false;
                last_was_literal = false;
            }
        }
    }
    out
}

fn render(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Resolves placeholders in the invoice's `basic.dataName`.
///
/// Without placeholders the file is left untouched and the change set is
/// empty. With `save` the rewritten invoice is written back to `invoice_path`.
pub fn apply_magic_variables(
    invoice_path: &Path,
    rawfile: Option<&Path>,
    metadata_path: Option<&Path>,
    save: bool,
) -> Result<ChangeSet, RdeError> {
    let mut invoice = load_invoice(invoice_path)?;
    let mut changes = ChangeSet::default();

    let Some(template) = super::data_name(&invoice).map(str::to_string) else {
        return Ok(changes);
    };
    if !contains_placeholder(&template) {
        return Ok(changes);
    }

    let metadata = match metadata_path {
        Some(path) if path.is_file() => Some(storage::read_json(path)?),
        _ => None,
    };

    let resolved =
        MagicVariableResolver::new(&invoice, metadata.as_ref(), rawfile).expand(&template)?;
    tracing::debug!(
        template = %crate::sanitize::truncate_value(&template, 80),
        resolved = %crate::sanitize::truncate_value(&resolved, 80),
        "Resolved data name"
    );

    section_mut(&mut invoice, SECTION_BASIC)
        .insert("dataName".to_string(), Value::String(resolved.clone()));
    changes.insert(DATA_NAME_FIELD, resolved);

    if save {
        save_invoice(invoice_path, &invoice)?;
    }
    Ok(changes)
}
