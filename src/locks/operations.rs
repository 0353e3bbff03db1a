//! Lock store operations.

use super::types::{LockKeys, LockRecord};
use crate::clock::Clock;
use crate::error::Result;
use crate::store::SharedStore;
use std::sync::Arc;

/// Parse a persisted timestamp as base-10 epoch milliseconds.
///
/// Missing or garbled values read as 0, which is maximally stale.
pub fn parse_timestamp(raw: Option<&str>) -> i64 {
    raw.and_then(|value| value.trim().parse::<i64>().ok()).unwrap_or(0)
}

/// Lock persisted in a shared store.
#[derive(Clone)]
pub struct LockStore {
    store: Arc<dyn SharedStore>,
    clock: Arc<dyn Clock>,
    keys: LockKeys,
}

impl std::fmt::Debug for LockStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockStore")
            .field("keys", &self.keys)
            .finish_non_exhaustive()
    }
}

impl LockStore {
    /// Create a lock store using the default key layout.
    pub fn new(store: Arc<dyn SharedStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            keys: LockKeys::default(),
        }
    }

    /// Use a custom key layout.
    pub fn with_keys(mut self, keys: LockKeys) -> Self {
        self.keys = keys;
        self
    }

    pub fn keys(&self) -> &LockKeys {
        &self.keys
    }

    pub fn now_millis(&self) -> i64 {
        self.clock.now_millis()
    }

    /// Check whether the lock is currently held and fresh.
    ///
    /// A stale record is cleared from the store as a side effect and reads
    /// as unlocked. Never fails: a clear that cannot be written is logged and
    /// the lock still reads as unlocked.
    pub fn is_locked(&self, freshness_window_ms: Option<u64>) -> bool {
        let timestamp = parse_timestamp(self.store.get(&self.keys.timestamp).as_deref());
        let stamped = LockRecord {
            held: false,
            acquired_at_millis: timestamp,
            recorded: true,
        };
        let now = self.clock.now_millis();

        if stamped.is_stale(now, freshness_window_ms) {
            if let Err(e) = self.clear() {
                tracing::warn!(
                    event = "lock.stale_clear_failed",
                    error = %e,
                    "failed to clear stale lock record"
                );
            } else {
                tracing::debug!(
                    event = "lock.stale_cleared",
                    age_ms = stamped.age_millis(now),
                    window_ms = freshness_window_ms,
                );
            }
            return false;
        }

        self.store.get(&self.keys.flag).as_deref() == Some("true")
    }

    /// Write the lock flag together with a fresh timestamp.
    ///
    /// The timestamp is refreshed even when clearing, which restarts the
    /// freshness window for the unlocked record too.
    pub fn set_lock(&self, held: bool) -> Result<()> {
        let now = self.clock.now_millis();
        self.store.set(&self.keys.flag, if held { "true" } else { "false" })?;
        self.store.set(&self.keys.timestamp, &now.to_string())?;

        tracing::debug!(event = "lock.set", held, at_ms = now);
        Ok(())
    }

    /// Take the lock if it is not currently held.
    ///
    /// Check-then-act without atomicity: returns `false` when another
    /// instance holds a fresh lock, `true` after writing a held record.
    pub fn try_acquire(&self, freshness_window_ms: Option<u64>) -> Result<bool> {
        if self.is_locked(freshness_window_ms) {
            return Ok(false);
        }
        self.set_lock(true)?;
        Ok(true)
    }

    /// Release the lock. Equivalent to `set_lock(false)`.
    pub fn release(&self) -> Result<()> {
        self.set_lock(false)
    }

    /// Remove both keys from the store.
    pub fn clear(&self) -> Result<()> {
        self.store.remove(&self.keys.flag)?;
        self.store.remove(&self.keys.timestamp)?;
        Ok(())
    }

    /// Read the persisted record without applying freshness rules.
    pub fn snapshot(&self) -> LockRecord {
        let flag = self.store.get(&self.keys.flag);
        let timestamp = self.store.get(&self.keys.timestamp);

        LockRecord {
            held: flag.as_deref() == Some("true"),
            acquired_at_millis: parse_timestamp(timestamp.as_deref()),
            recorded: flag.is_some() || timestamp.is_some(),
        }
    }
}
