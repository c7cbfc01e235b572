use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::Value;
use walkdir::WalkDir;

use crate::error::{RdeError, StorageError};

pub fn ensure_directory(path: &Path) -> Result<(), StorageError> {
    if !path.exists() {
        std::fs::create_dir_all(path).map_err(|e| StorageError::CreateDirectory {
            path: path.to_path_buf(),
            source: e,
        })?;
    }
    Ok(())
}

/// Copies `src` to `dst`, creating the parent directory of `dst` first.
pub fn copy_file(src: &Path, dst: &Path) -> Result<(), StorageError> {
    if let Some(parent) = dst.parent() {
        ensure_directory(parent)?;
    }
    std::fs::copy(src, dst).map_err(|e| StorageError::CopyFile {
        from: src.to_path_buf(),
        to: dst.to_path_buf(),
        source: e,
    })?;
    Ok(())
}

/// Copies `src` into `directory`, keeping its file name. Returns the new path.
pub fn copy_into(src: &Path, directory: &Path) -> Result<PathBuf, StorageError> {
    let name = src.file_name().ok_or_else(|| StorageError::CopyFile {
        from: src.to_path_buf(),
        to: directory.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "source has no file name"),
    })?;
    let dst = directory.join(name);
    copy_file(src, &dst)?;
    Ok(dst)
}

/// Lists regular files below `directory`, sorted by path.
/// A missing directory yields an empty list.
pub fn list_files(directory: &Path) -> Result<Vec<PathBuf>, StorageError> {
    if !directory.exists() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(directory).sort_by_file_name() {
        let entry = entry.map_err(|e| StorageError::ScanDirectory {
            path: directory.to_path_buf(),
            source: e,
        })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

pub fn read_json(path: &Path) -> Result<Value, RdeError> {
    let content = std::fs::read_to_string(path).map_err(|e| StorageError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_str(&content).map_err(|e| RdeError::Json {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Writes pretty-printed JSON. The document is written to a sibling temp file
/// first and renamed over the destination so readers never see half a file.
pub fn write_json(path: &Path, value: &Value) -> Result<(), RdeError> {
    if let Some(parent) = path.parent() {
        ensure_directory(parent)?;
    }

    let mut body = serde_json::to_vec_pretty(value).map_err(|e| RdeError::Json {
        path: path.to_path_buf(),
        source: e,
    })?;
    body.push(b'\n');

    let tmp_path = path.with_extension("json.tmp");
    let write_err = |e: std::io::Error| StorageError::WriteFile {
        path: path.to_path_buf(),
        source: e,
    };

    let mut file = std::fs::File::create(&tmp_path).map_err(write_err)?;
    file.write_all(&body).map_err(write_err)?;
    file.sync_all().map_err(write_err)?;
    drop(file);

    std::fs::rename(&tmp_path, path).map_err(write_err)?;
    Ok(())
}
