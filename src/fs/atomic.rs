//! Atomic file replacement for shared store values.
//!
//! All writes follow the same pattern:
//! 1. Write content to a temporary file in the same directory
//! 2. Sync the file to disk (fsync)
//! 3. Rename it over the target
//!
//! Several instances may write the same key at once, so the temporary name
//! carries the process id and a per-process sequence number. `std::fs::rename`
//! replaces an existing target on every supported platform.

use crate::error::{RefreshError, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Atomically write bytes to a file.
///
/// The target is never observed in a partial state: readers see either the
/// previous content or the new content.
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| {
            RefreshError::StoreError(format!(
                "failed to create directory '{}': {}",
                parent.display(),
                e
            ))
        })?;
    }

    let temp_path = generate_temp_path(path)?;
    write_and_sync(&temp_path, content)?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        RefreshError::StoreError(format!(
            "failed to atomically replace '{}': {}",
            path.display(),
            e
        ))
    })?;

    Ok(())
}

/// Atomically write a string to a file.
pub fn atomic_write_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    atomic_write(path, content.as_bytes())
}

/// Temp name pattern: `.{filename}.{pid}.{seq}.tmp`, next to the target.
fn generate_temp_path(target: &Path) -> Result<PathBuf> {
    let parent = target.parent().unwrap_or(Path::new("."));
    let filename = target
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| RefreshError::StoreError("invalid file path".to_string()))?;

    let seq = TEMP_SEQ.fetch_add(1, Ordering::Relaxed);
    let temp_name = format!(".{}.{}.{}.tmp", filename, std::process::id(), seq);
    Ok(parent.join(temp_name))
}

fn write_and_sync(path: &Path, content: &[u8]) -> Result<()> {
    let mut file = File::create(path).map_err(|e| {
        RefreshError::StoreError(format!(
            "failed to create temporary file '{}': {}",
            path.display(),
            e
        ))
    })?;

    file.write_all(content).map_err(|e| {
        let _ = fs::remove_file(path);
        RefreshError::StoreError(format!("failed to write to temporary file: {}", e))
    })?;

    file.sync_all().map_err(|e| {
        let _ = fs::remove_file(path);
        RefreshError::StoreError(format!("failed to sync temporary file to disk: {}", e))
    })?;

    Ok(())
}
