//! State root resolution for globalrefresh.
//!
//! Every instance that should coordinate must resolve the same state root:
//! the shared store lives inside it (unless `store_dir` is absolute), next to
//! the config file and the audit event log.
//!
//! Layout (default root `.globalrefresh/` under the working directory):
//! - `config.yaml`
//! - `store/`: one file per lock key
//! - `events/events.ndjson`

use crate::clock::Clock;
use crate::config::Config;
use crate::error::{RefreshError, Result};
use crate::locks::LockStore;
use crate::store::FileStore;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Default state directory name, relative to the working directory.
pub const DEFAULT_STATE_DIR: &str = ".globalrefresh";

/// Resolved paths for one state root. All paths are absolute.
#[derive(Debug, Clone)]
pub struct RefreshContext {
    pub root: PathBuf,
}

impl RefreshContext {
    /// Resolve the state root: an explicit `home` wins, otherwise
    /// `.globalrefresh/` under the current working directory.
    pub fn resolve(home: Option<&Path>) -> Result<Self> {
        let cwd = env::current_dir().map_err(|e| {
            RefreshError::UserError(format!("failed to get current working directory: {}", e))
        })?;

        Ok(match home {
            Some(home) => Self::from_root(cwd.join(home)),
            None => Self::resolve_from(&cwd),
        })
    }

    /// Resolve the default state root beneath a specific directory.
    pub fn resolve_from<P: AsRef<Path>>(cwd: P) -> Self {
        Self::from_root(cwd.as_ref().join(DEFAULT_STATE_DIR))
    }

    pub fn from_root<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Whether `init` has written a config file here.
    pub fn is_initialized(&self) -> bool {
        self.config_path().exists()
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join("config.yaml")
    }

    pub fn events_dir(&self) -> PathBuf {
        self.root.join("events")
    }

    pub fn events_file(&self) -> PathBuf {
        self.events_dir().join("events.ndjson")
    }

    /// Load the config for this root, defaulting when no file exists.
    pub fn load_config(&self) -> Result<Config> {
        Config::load_or_default(self.config_path())
    }

    /// Open the file-backed lock store described by `config`.
    pub fn open_lock_store(&self, config: &Config, clock: Arc<dyn Clock>) -> LockStore {
        let store = FileStore::new(config.store_path(&self.root));
        LockStore::new(Arc::new(store), clock).with_keys(config.lock_keys())
    }
}
