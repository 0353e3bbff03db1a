//! Config struct definition and default implementation.

use crate::locks::{DEFAULT_LOCK_EXPIRATION_MS, DEFAULT_LOCK_KEY, DEFAULT_LOCK_TIMESTAMP_KEY};
use crate::scheduler::DEFAULT_INTERVAL_MS;
use serde::{Deserialize, Serialize};

/// Configuration for a globalrefresh state root.
///
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // Scheduler settings
    // =========================================================================
    /// Tick period used when the host sends no interval.
    pub default_interval_ms: u64,

    // =========================================================================
    // Lock settings
    // =========================================================================
    /// Freshness window for the shared lock; `null` disables expiry.
    ///
    /// Used by the `lock` commands and as the scheduler's window until the
    /// host sends its own.
    pub lock_expiration_ms: Option<u64>,

    /// Store key holding the lock flag.
    pub lock_key: String,

    /// Store key holding the lock timestamp.
    pub lock_timestamp_key: String,

    // =========================================================================
    // Storage settings
    // =========================================================================
    /// Shared store directory, relative to the state root unless absolute.
    pub store_dir: String,

    /// Whether to append audit events to `events/events.ndjson`.
    pub events_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_interval_ms: DEFAULT_INTERVAL_MS,
            lock_expiration_ms: Some(DEFAULT_LOCK_EXPIRATION_MS),
            lock_key: DEFAULT_LOCK_KEY.to_string(),
            lock_timestamp_key: DEFAULT_LOCK_TIMESTAMP_KEY.to_string(),
            store_dir: "store".to_string(),
            events_enabled: true,
        }
    }
}
