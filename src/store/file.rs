//! Directory-backed shared store.
//!
//! Each key is a file inside the store directory whose content is the raw
//! value. Writes go through [`atomic_write_file`] so a concurrent reader sees
//! either the old or the new value, never a torn one.

use super::SharedStore;
use crate::error::{RefreshError, Result};
use crate::fs::atomic_write_file;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Store whose keys are files in one shared directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`. The directory is created on first write.
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn key_path(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(key))
    }
}

/// Keys must be plain, visible file names.
pub(crate) fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(RefreshError::UserError(
            "store key must not be empty".to_string(),
        ));
    }
    if key.starts_with('.') || key.contains(['/', '\\']) {
        return Err(RefreshError::UserError(format!(
            "store key '{}' must be a plain file name (no path separators or leading dot)",
            key
        )));
    }
    Ok(())
}

impl SharedStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let path = self.key_path(key).ok()?;
        match fs::read_to_string(&path) {
            Ok(value) => Some(value),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(
                    event = "store.read_failed",
                    path = %path.display(),
                    error = %e,
                    "treating unreadable store value as absent"
                );
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key)?;
        atomic_write_file(&path, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(RefreshError::StoreError(format!(
                "failed to remove '{}': {}",
                path.display(),
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_set_then_get() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path().join("store"));

        store.set("shared_refresh_lock", "true").unwrap();

        assert_eq!(store.get("shared_refresh_lock").as_deref(), Some("true"));
        assert!(temp_dir.path().join("store/shared_refresh_lock").exists());
    }

    #[test]
    fn test_get_missing_key_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());

        assert_eq!(store.get("nothing_here"), None);
    }

    #[test]
    fn test_two_handles_share_directory() {
        let temp_dir = TempDir::new().unwrap();
        let first = FileStore::new(temp_dir.path());
        let second = FileStore::new(temp_dir.path());

        first.set("k", "1").unwrap();
        assert_eq!(second.get("k").as_deref(), Some("1"));

        second.remove("k").unwrap();
        assert_eq!(first.get("k"), None);
    }

    #[test]
    fn test_remove_missing_key_is_ok() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());

        assert!(store.remove("absent").is_ok());
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());

        assert!(store.set("../escape", "x").is_err());
        assert!(store.set(".hidden", "x").is_err());
        assert!(store.set("", "x").is_err());
        assert_eq!(store.get("../escape"), None);
    }
}
