//! Metadata definitions and per-unit metadata documents.

pub mod definition;
pub mod document;

use std::path::Path;

use tracing::debug;

use crate::error::RdeError;
use crate::invoice::cast_value;

pub use definition::{EntryName, MetadataDefinition, MetadataEntry};
pub use document::MetadataDocument;

/// Casts `(key, value)` pairs from `meta/<key>` columns and upserts them into
/// `constant` of the metadata document at `metadata_path`.
///
/// Every value is cast before anything is written. Blank values are skipped;
/// when none remain the metadata file is not touched. Returns the number of
/// constants written.
pub fn apply_meta_columns(
    columns: &[(String, String)],
    def_path: &Path,
    metadata_path: &Path,
) -> Result<usize, RdeError> {
    let columns: Vec<&(String, String)> = columns
        .iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .collect();
    if columns.is_empty() {
        return Ok(0);
    }

    let definition = MetadataDefinition::load(def_path)?;
    let mut casted = Vec::with_capacity(columns.len());
    for (key, raw) in columns {
        let entry = definition
            .get(key)?
            .ok_or_else(|| RdeError::UnknownMetadataKey(key.clone()))?;
        if entry.variable {
            return Err(RdeError::VariableMetadataUnsupported(key.clone()));
        }
        let value = cast_value(raw, entry.value_type).ok_or_else(|| RdeError::CastFailure {
            key: key.clone(),
            expected: entry.value_type.to_string(),
        })?;
        casted.push((entry, value));
    }

    let mut document = MetadataDocument::load_or_default(metadata_path)?;
    for (entry, value) in &casted {
        document.upsert_constant(&entry.key, value.clone(), entry.unit.as_deref());
    }
    document.save(metadata_path)?;

    debug!(count = casted.len(), "Wrote metadata constants");
    Ok(casted.len())
}
