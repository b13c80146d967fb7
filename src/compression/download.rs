//! Saves a download unit to disk.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::errors::{DomainError, DomainResult};

use super::packager::DownloadUnit;

/// Write the unit's bytes under its suggested filename in `dest_dir`.
///
/// The bytes go through a named temporary file in the destination
/// directory which is persisted into place; the temporary handle is
/// released either way. `None` is a no-op. No durability confirmation
/// is attempted beyond the write itself.
pub fn trigger(unit: Option<DownloadUnit>, dest_dir: &Path) -> DomainResult<Option<PathBuf>> {
    let Some(unit) = unit else {
        return Ok(None);
    };

    let mut tmp = NamedTempFile::new_in(dest_dir)
        .map_err(|e| DomainError::File(format!("Failed to create temp file: {}", e)))?;
    tmp.write_all(&unit.data)
        .map_err(|e| DomainError::File(format!("Failed to write download: {}", e)))?;

    let dest = dest_dir.join(&unit.filename);
    tmp.persist(&dest)
        .map_err(|e| DomainError::File(format!("Failed to persist download: {}", e)))?;

    log::info!("Saved {} ({} bytes)", dest.display(), unit.data.len());
    Ok(Some(dest))
}
