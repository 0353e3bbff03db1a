//! Config loading, validation, and derived values.

use super::model::Config;
use crate::error::{RefreshError, Result};
use crate::locks::LockKeys;
use crate::scheduler::SchedulerConfig;
use crate::store::validate_key;
use std::path::{Path, PathBuf};

impl Config {
    /// Load config from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            RefreshError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Load config from a YAML file, falling back to defaults when the file
    /// does not exist. A file that exists but is invalid is still an error.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // serde_yaml rejects an empty document for a struct; treat it as all defaults.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(yaml).map_err(|e| {
            RefreshError::UserError(format!("failed to parse config YAML: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            RefreshError::UserError(format!("failed to serialize config to YAML: {}", e))
        })
    }

    /// Validate config values.
    ///
    /// - `default_interval_ms` must be positive
    /// - `lock_expiration_ms`, when set, must be positive
    /// - lock keys must be valid, distinct store keys
    /// - `store_dir` must be non-empty
    pub fn validate(&self) -> Result<()> {
        if self.default_interval_ms == 0 {
            return Err(RefreshError::UserError(
                "config validation failed: default_interval_ms must be greater than 0".to_string(),
            ));
        }

        if self.lock_expiration_ms == Some(0) {
            return Err(RefreshError::UserError(
                "config validation failed: lock_expiration_ms must be greater than 0 (use null to disable expiry)"
                    .to_string(),
            ));
        }

        for key in [&self.lock_key, &self.lock_timestamp_key] {
            validate_key(key).map_err(|e| {
                RefreshError::UserError(format!("config validation failed: {}", e))
            })?;
        }

        if self.lock_key == self.lock_timestamp_key {
            return Err(RefreshError::UserError(
                "config validation failed: lock_key and lock_timestamp_key must differ".to_string(),
            ));
        }

        if self.store_dir.trim().is_empty() {
            return Err(RefreshError::UserError(
                "config validation failed: store_dir must be non-empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Store key layout for the lock.
    pub fn lock_keys(&self) -> LockKeys {
        LockKeys {
            flag: self.lock_key.clone(),
            timestamp: self.lock_timestamp_key.clone(),
        }
    }

    /// Scheduler configuration in effect before the host sends any.
    pub fn initial_scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            lock_freshness_window_ms: self.lock_expiration_ms,
            ..SchedulerConfig::default()
        }
    }

    /// Resolve `store_dir` against the state root.
    pub fn store_path(&self, root: &Path) -> PathBuf {
        let dir = Path::new(&self.store_dir);
        if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            root.join(dir)
        }
    }
}
