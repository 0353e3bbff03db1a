//! Refresh scheduler.
//!
//! Owns the active configuration, the tick counter, and at most one
//! repeating timer. States:
//!
//! - **Idle**: no timer. The next configuration-changed signal starts one,
//!   whether or not anything changed.
//! - **Running**: one timer. A signal with `has_changed` replaces the timer
//!   immediately using the latest configuration; a signal without changes is
//!   ignored so identical re-sends from the host cause no churn.
//!
//! Each tick consults the [`LockStore`]. While the lock is held nothing
//! happens; otherwise the counter advances and the new count is reported to
//! the host, until the configured limit is reached and the timer stops.
//!
//! The counter is never reset by reconfiguration.

mod settings;
mod timer;


pub use settings::SchedulerConfig;
pub use timer::IntervalTimer;

use crate::error::Result;
use crate::host::Host;
use crate::locks::LockStore;
use crate::protocol::{HostMessage, OutboundMessage, StartRefresh};

/// Tick period used when the host does not send one.
pub const DEFAULT_INTERVAL_MS: u64 = 5_000;

/// Largest count reported to the host; counts clamp here instead of wrapping.
///
/// 2^53 - 1 is the largest integer a JSON number round-trips exactly.
pub const MAX_COUNT: u64 = (1 << 53) - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
}

/// Signal raised after a configuration request has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigChanged {
    pub active: bool,
    pub has_changed: bool,
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The shared lock was held; nothing advanced.
    Locked,
    /// The count advanced and was reported to the host.
    Emitted(u64),
    /// The count reached the limit; the timer stopped without reporting.
    LimitReached(u64),
    /// No timer was active.
    Inactive,
}

/// Periodic refresh driver for one component instance.
#[derive(Debug)]
pub struct RefreshScheduler {
    config: SchedulerConfig,
    lock: LockStore,
    count: u64,
    timer: Option<IntervalTimer>,
    default_interval_ms: u64,
    timers_started: u64,
}

impl RefreshScheduler {
    pub fn new(lock: LockStore) -> Self {
        Self {
            config: SchedulerConfig::default(),
            lock,
            count: 0,
            timer: None,
            default_interval_ms: DEFAULT_INTERVAL_MS,
            timers_started: 0,
        }
    }

    /// Override the tick period used when the host sends none.
    pub fn with_default_interval(mut self, interval_ms: u64) -> Self {
        self.default_interval_ms = interval_ms.max(1);
        self
    }

    /// Start from a specific configuration instead of the defaults.
    pub fn with_config(mut self, config: SchedulerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn state(&self) -> SchedulerState {
        if self.timer.is_some() {
            SchedulerState::Running
        } else {
            SchedulerState::Idle
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn timer(&self) -> Option<&IntervalTimer> {
        self.timer.as_ref()
    }

    pub fn lock(&self) -> &LockStore {
        &self.lock
    }

    /// Deadline of the next tick, if a timer is running.
    pub fn next_deadline(&self) -> Option<i64> {
        self.timer.as_ref().map(IntervalTimer::next_due_ms)
    }

    /// Handle one request from the host.
    ///
    /// `set_lock` only touches the lock store; `start_refresh` applies the
    /// configuration and then runs the start/restart policy.
    pub fn handle_message(&mut self, message: HostMessage) -> Result<()> {
        match message {
            HostMessage::SetLock { lock_state } => self.lock.set_lock(lock_state),
            HostMessage::StartRefresh(request) => {
                let signal = self.apply_start_refresh(request);
                self.on_config_changed(signal);
                Ok(())
            }
            HostMessage::Unrecognized => Ok(()),
        }
    }

    /// Apply a `start_refresh` request and report whether anything changed.
    pub fn apply_start_refresh(&mut self, request: StartRefresh) -> ConfigChanged {
        let has_changed = self.config.apply(request);
        tracing::debug!(
            event = "scheduler.config_applied",
            has_changed,
            interval_ms = self.config.tick_interval_ms,
            limit = self.config.tick_limit,
            key = self.config.instance_key.as_deref(),
            lock_expiration_ms = self.config.lock_freshness_window_ms,
        );
        ConfigChanged {
            active: true,
            has_changed,
        }
    }

    /// React to a configuration-changed signal.
    pub fn on_config_changed(&mut self, signal: ConfigChanged) {
        self.start_refresh_interval(signal.has_changed);
    }

    /// Start the timer, or restart it if the configuration changed.
    ///
    /// Returns whether a new timer was created.
    pub fn start_refresh_interval(&mut self, has_changed: bool) -> bool {
        if let Some(current) = &self.timer {
            if !has_changed {
                return false;
            }
            tracing::info!(
                event = "scheduler.timer_cancelled",
                timer_id = current.id(),
                reason = "config_changed",
            );
            self.timer = None;
        }

        let period_ms = self.config.effective_interval(self.default_interval_ms);
        let limit = self.config.effective_limit();
        let now = self.lock.now_millis();

        self.timers_started += 1;
        let timer = IntervalTimer::start(self.timers_started, period_ms, limit, now);
        tracing::info!(
            event = "scheduler.timer_started",
            timer_id = timer.id(),
            period_ms,
            limit,
            count = self.count,
        );
        self.timer = Some(timer);
        true
    }

    /// Fire the timer if its deadline has passed.
    ///
    /// Returns `None` when nothing was due.
    pub fn run_due(&mut self, host: &mut dyn Host) -> Result<Option<TickOutcome>> {
        let now = self.lock.now_millis();
        let Some(timer) = self.timer.as_mut() else {
            return Ok(None);
        };
        if !timer.is_due(now) {
            return Ok(None);
        }
        timer.advance(now);
        self.tick(host).map(Some)
    }

    /// Run one tick body.
    pub fn tick(&mut self, host: &mut dyn Host) -> Result<TickOutcome> {
        let Some(limit) = self.timer.as_ref().map(IntervalTimer::limit) else {
            return Ok(TickOutcome::Inactive);
        };

        if self.lock.is_locked(self.config.lock_freshness_window_ms) {
            tracing::debug!(event = "scheduler.tick_locked", count = self.count);
            return Ok(TickOutcome::Locked);
        }

        self.count = self.count.saturating_add(1).min(MAX_COUNT);
        let count = self.count;

        match limit {
            Some(limit) if count >= limit => {
                self.timer = None;
                tracing::info!(event = "scheduler.limit_reached", count, limit);
                Ok(TickOutcome::LimitReached(count))
            }
            _ => {
                host.send(&OutboundMessage::update(count))?;
                tracing::debug!(event = "scheduler.tick_emitted", count);
                Ok(TickOutcome::Emitted(count))
            }
        }
    }
}
