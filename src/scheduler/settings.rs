//! Scheduler configuration and its change tracking.

use crate::locks::DEFAULT_LOCK_EXPIRATION_MS;
use crate::protocol::StartRefresh;

/// Active refresh configuration, mutated only through the setters below.
///
/// Every setter reports whether its field actually changed so the scheduler
/// can tell a real reconfiguration from the host re-sending the same values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Tick period; `None` or 0 means "use the default interval".
    pub tick_interval_ms: Option<u64>,

    /// Tick limit; `None` or 0 means unlimited.
    pub tick_limit: Option<u64>,

    pub instance_key: Option<String>,

    /// Lock freshness window; `None` disables expiry.
    pub lock_freshness_window_ms: Option<u64>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: None,
            tick_limit: None,
            instance_key: None,
            lock_freshness_window_ms: Some(DEFAULT_LOCK_EXPIRATION_MS),
        }
    }
}

impl SchedulerConfig {
    pub fn set_interval(&mut self, interval_ms: Option<u64>) -> bool {
        let changed = self.tick_interval_ms != interval_ms;
        self.tick_interval_ms = interval_ms;
        changed
    }

    pub fn set_key(&mut self, key: Option<String>) -> bool {
        let changed = self.instance_key != key;
        self.instance_key = key;
        changed
    }

    pub fn set_limit(&mut self, limit: Option<u64>) -> bool {
        let changed = self.tick_limit != limit;
        self.tick_limit = limit;
        changed
    }

    pub fn set_lock_expiration(&mut self, window_ms: Option<u64>) -> bool {
        let changed = self.lock_freshness_window_ms != window_ms;
        self.lock_freshness_window_ms = window_ms;
        changed
    }

    /// Apply a `start_refresh` request field by field.
    ///
    /// All four setters always run, in order; the result is true if any of
    /// them changed its field.
    pub fn apply(&mut self, request: StartRefresh) -> bool {
        let interval = self.set_interval(request.interval);
        let key = self.set_key(request.key);
        let limit = self.set_limit(request.refresh_limit);
        let expiration = self.set_lock_expiration(request.lock_expiration);
        interval | key | limit | expiration
    }

    /// Tick period to use, substituting `default_ms` for a missing or zero value.
    pub fn effective_interval(&self, default_ms: u64) -> u64 {
        self.tick_interval_ms
            .filter(|&ms| ms > 0)
            .unwrap_or(default_ms)
            .max(1)
    }

    /// Tick limit to enforce, if any.
    pub fn effective_limit(&self) -> Option<u64> {
        self.tick_limit.filter(|&limit| limit > 0)
    }
}
