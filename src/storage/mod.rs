//! File collaborators of a collection cycle.
//!
//! - `ledger`: the source ledger (CSV), read at cycle start and rewritten at
//!   the end
//! - `cache`: raw content of consumed sources and the manifest pointing at it
//! - `package`: the YAML node package and the final source list

mod cache;
mod ledger;
mod package;

pub use cache::{manifest_entry, prepare_cache_dir, write_cache_file, write_manifest};
pub use ledger::{load_ledger, save_ledger};
pub use package::{write_package, write_source_list};

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error_handling::StorageError;

fn temp_path_for(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

/// Writes `path` through a temporary sibling and a rename.
///
/// Missing parent directories are created. On failure the temporary file is
/// removed and `path` is left untouched.
pub(crate) fn write_atomically<F>(path: &Path, write: F) -> Result<(), StorageError>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<(), StorageError>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let tmp = temp_path_for(path);
    let result = (|| -> Result<(), StorageError> {
        let mut file = BufWriter::new(File::create(&tmp)?);
        write(&mut file)?;
        file.flush()?;
        file.get_ref().sync_all()?;
        drop(file);
        fs::rename(&tmp, path)?;
        Ok(())
    })();
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}
