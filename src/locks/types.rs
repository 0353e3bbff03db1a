//! Lock key layout and persisted record.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Store key holding the lock flag.
pub const DEFAULT_LOCK_KEY: &str = "shared_refresh_lock";

/// Store key holding the lock timestamp.
pub const DEFAULT_LOCK_TIMESTAMP_KEY: &str = "shared_refresh_lock_timestamp";

/// Freshness window applied when none is configured explicitly.
pub const DEFAULT_LOCK_EXPIRATION_MS: u64 = 30_000;

/// The pair of store keys a lock is persisted under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockKeys {
    pub flag: String,
    pub timestamp: String,
}

impl Default for LockKeys {
    fn default() -> Self {
        Self {
            flag: DEFAULT_LOCK_KEY.to_string(),
            timestamp: DEFAULT_LOCK_TIMESTAMP_KEY.to_string(),
        }
    }
}

/// Lock state as persisted in the shared store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LockRecord {
    /// Whether the flag key reads exactly `"true"`.
    pub held: bool,

    /// Epoch milliseconds of the last write; 0 when missing or unparseable.
    pub acquired_at_millis: i64,

    /// Whether either key exists in the store.
    pub recorded: bool,
}

impl LockRecord {
    /// Age of the record relative to `now`.
    pub fn age_millis(&self, now: i64) -> i64 {
        now.saturating_sub(self.acquired_at_millis)
    }

    /// Whether the record has outlived `window`. `None` never expires.
    pub fn is_stale(&self, now: i64, window: Option<u64>) -> bool {
        match window {
            Some(window) => {
                let window = i64::try_from(window).unwrap_or(i64::MAX);
                self.age_millis(now) > window
            }
            None => false,
        }
    }

    /// Format the age as a human-readable string.
    pub fn age_string(&self, now: i64) -> String {
        let age = Duration::milliseconds(self.age_millis(now));
        let days = age.num_days();
        let hours = age.num_hours();
        let minutes = age.num_minutes();
        let seconds = age.num_seconds();

        if days > 0 {
            format!("{}d {}h", days, hours % 24)
        } else if hours > 0 {
            format!("{}h {}m", hours, minutes % 60)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds % 60)
        } else {
            format!("{}s", seconds.max(0))
        }
    }
}

impl std::fmt::Display for LockRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.recorded {
            return write!(f, "unset");
        }
        write!(
            f,
            "{} (written at {} ms)",
            if self.held { "held" } else { "free" },
            self.acquired_at_millis
        )
    }
}
