//! Wall-clock source shared by the lock store and the scheduler.
//!
//! Lock timestamps are epoch milliseconds so that every instance sharing a
//! store agrees on their meaning.

use chrono::Utc;

/// Source of the current time in epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

/// Clock backed by the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Manually advanced clock. Clones share the same instant.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: std::sync::Arc<std::sync::atomic::AtomicI64>,
}

#[cfg(test)]
impl ManualClock {
    pub fn at(millis: i64) -> Self {
        let clock = Self::default();
        clock.set(millis);
        clock
    }

    pub fn set(&self, millis: i64) {
        self.now.store(millis, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn advance(&self, millis: i64) {
        self.now.fetch_add(millis, std::sync::atomic::Ordering::SeqCst);
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(std::sync::atomic::Ordering::SeqCst)
    }
}
