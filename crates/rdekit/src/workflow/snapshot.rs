use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::SystemTime;

use serde_json::Value;

use crate::error::{RdeError, StorageError};
use crate::invoice;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fingerprint {
    len: u64,
    modified: Option<SystemTime>,
}

impl Fingerprint {
    fn of(path: &Path) -> Result<Option<Self>, StorageError> {
        match std::fs::metadata(path) {
            Ok(meta) => Ok(Some(Self {
                len: meta.len(),
                modified: meta.modified().ok(),
            })),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::ReadFile {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }
}

struct CachedSnapshot {
    fingerprint: Fingerprint,
    invoice: Value,
}

/// Parsed base-invoice snapshots shared by the units of one run.
///
/// Entries are revalidated against file length and modification time on
/// every lookup, so a snapshot rewritten between units is re-read.
#[derive(Default)]
pub struct InvoiceSnapshotCache {
    entries: Mutex<HashMap<PathBuf, CachedSnapshot>>,
}

impl InvoiceSnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The parsed snapshot at `path`, `None` when the file does not exist.
    pub fn get(&self, path: &Path) -> Result<Option<Value>, RdeError> {
        let Some(fingerprint) = Fingerprint::of(path)? else {
            self.invalidate(path);
            return Ok(None);
        };

        let mut entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(cached) = entries.get(path) {
            if cached.fingerprint == fingerprint {
                tracing::trace!(file = %crate::sanitize::redact_path(path), "Invoice snapshot cache hit");
                return Ok(Some(cached.invoice.clone()));
            }
        }

        let invoice = invoice::load_invoice(path)?;
        entries.insert(
            path.to_path_buf(),
            CachedSnapshot {
                fingerprint,
                invoice: invoice.clone(),
            },
        );
        Ok(Some(invoice))
    }

    pub fn invalidate(&self, path: &Path) {
        self.entries
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .remove(path);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_snapshot_is_none() {
        let temp = tempfile::tempdir().unwrap();
        let cache = InvoiceSnapshotCache::new();
        assert!(cache.get(&temp.path().join("invoice_org.json")).unwrap().is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cached_until_file_changes() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("invoice_org.json");
        std::fs::write(&path, r#"{"basic":{"dataName":"a"}}"#).unwrap();
        let cache = InvoiceSnapshotCache::new();

        assert_eq!(cache.get(&path).unwrap().unwrap()["basic"]["dataName"], "a");
        assert_eq!(cache.len(), 1);

        std::fs::write(&path, r#"{"basic":{"dataName":"changed"}}"#).unwrap();
        assert_eq!(
            cache.get(&path).unwrap().unwrap(),
            json!({"basic": {"dataName": "changed"}})
        );
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_removed_file_drops_entry() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("invoice_org.json");
        std::fs::write(&path, "{}").unwrap();
        let cache = InvoiceSnapshotCache::new();
        cache.get(&path).unwrap();

        std::fs::remove_file(&path).unwrap();
        assert!(cache.get(&path).unwrap().is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalid_snapshot_is_error() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("invoice_org.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            InvoiceSnapshotCache::new().get(&path),
            Err(RdeError::Json { .. })
        ));
    }
}
