//! Raw content cache and its manifest.

use log::{debug, info};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::write_atomically;
use crate::error_handling::StorageError;

fn cache_file_name(id: &str) -> String {
    format!("{id}.txt")
}

/// Creates `dir` if needed and removes the files a previous cycle left in it.
///
/// Subdirectories are left alone.
pub fn prepare_cache_dir(dir: &Path) -> Result<(), StorageError> {
    fs::create_dir_all(dir)?;
    let mut removed = 0usize;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            fs::remove_file(entry.path())?;
            removed += 1;
        }
    }
    if removed > 0 {
        debug!("Cleared {removed} cached files from {}", dir.display());
    }
    Ok(())
}

/// Stores the raw content of a consumed source as `<dir>/<id>.txt`.
pub fn write_cache_file(dir: &Path, id: &str, body: &str) -> Result<PathBuf, StorageError> {
    let path = dir.join(cache_file_name(id));
    fs::write(&path, body)?;
    Ok(path)
}

/// Reference to a cached source: `<base_url>/<id>.txt` when a base URL is
/// configured, otherwise the local cache path.
pub fn manifest_entry(base_url: Option<&str>, dir: &Path, id: &str) -> String {
    match base_url.map(str::trim).filter(|b| !b.is_empty()) {
        Some(base) => format!("{}/{}", base.trim_end_matches('/'), cache_file_name(id)),
        None => dir.join(cache_file_name(id)).display().to_string(),
    }
}

/// Writes the manifest, one entry per line.
pub fn write_manifest(path: &Path, entries: &[String]) -> Result<(), StorageError> {
    write_atomically(path, |file| {
        for entry in entries {
            writeln!(file, "{entry}")?;
        }
        Ok(())
    })?;
    info!("Wrote {} manifest entries to {}", entries.len(), path.display());
    Ok(())
}
