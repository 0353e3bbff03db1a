//! Audit event log for globalrefresh.
//!
//! Events are appended in NDJSON format (one JSON object per line) to
//! `events/events.ndjson` under the state root. They record interventions on
//! the shared lock and runtime start/stop, so an operator can tell which
//! instance held or cleared the lock and when.
//!
//! # Event Format
//!
//! - `ts`: RFC3339 timestamp
//! - `action`: what happened (init, lock_set, lock_clear, run_start, ...)
//! - `actor`: the owner string (e.g., `user@HOST`)
//! - `pid`: process id of the writer
//! - `details`: freeform object with action-specific details

use crate::context::RefreshContext;
use crate::error::{RefreshError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;

/// Actions that can be logged as events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    /// State root initialized
    Init,
    /// Lock flag written explicitly
    LockSet,
    /// Lock acquired via check-then-set
    LockAcquire,
    /// Lock released
    LockRelease,
    /// Lock keys removed manually
    LockClear,
    /// Widget runtime started
    RunStart,
    /// Widget runtime exited
    RunStop,
}

impl std::fmt::Display for EventAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventAction::Init => write!(f, "init"),
            EventAction::LockSet => write!(f, "lock_set"),
            EventAction::LockAcquire => write!(f, "lock_acquire"),
            EventAction::LockRelease => write!(f, "lock_release"),
            EventAction::LockClear => write!(f, "lock_clear"),
            EventAction::RunStart => write!(f, "run_start"),
            EventAction::RunStop => write!(f, "run_stop"),
        }
    }
}

/// An event record for the audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub ts: DateTime<Utc>,
    pub action: EventAction,
    pub actor: String,
    pub pid: u32,
    pub details: Value,
}

impl Event {
    /// Create a new event stamped with the current time and actor.
    pub fn new(action: EventAction) -> Self {
        Self {
            ts: Utc::now(),
            action,
            actor: get_actor_string(),
            pid: std::process::id(),
            details: Value::Object(serde_json::Map::new()),
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    /// Serialize the event to a single-line JSON string.
    pub fn to_ndjson_line(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| {
            RefreshError::UserError(format!("failed to serialize event to JSON: {}", e))
        })
    }
}

fn get_actor_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}

/// Append an event to the log, creating the file if needed.
pub fn append_event(ctx: &RefreshContext, event: &Event) -> Result<()> {
    let events_file = ctx.events_file();
    let json_line = event.to_ndjson_line()?;

    let events_dir = ctx.events_dir();
    if !events_dir.exists() {
        fs::create_dir_all(&events_dir).map_err(|e| {
            RefreshError::UserError(format!(
                "failed to create events directory '{}': {}",
                events_dir.display(),
                e
            ))
        })?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&events_file)
        .map_err(|e| {
            RefreshError::UserError(format!(
                "failed to open events file '{}': {}",
                events_file.display(),
                e
            ))
        })?;

    writeln!(file, "{}", json_line).map_err(|e| {
        RefreshError::UserError(format!(
            "failed to write event to '{}': {}",
            events_file.display(),
            e
        ))
    })?;

    Ok(())
}

/// Append an event if the log is enabled; failures are logged, not raised.
///
/// The audit trail never blocks a lock operation that already happened.
pub fn record_event(ctx: &RefreshContext, enabled: bool, event: Event) {
    if !enabled {
        return;
    }
    if let Err(e) = append_event(ctx, &event) {
        tracing::warn!(
            event = "events.append_failed",
            action = %event.action,
            error = %e,
        );
    }
}

/// Read all events from the log. Unparseable lines are skipped.
#[cfg(test)]
pub fn read_events(ctx: &RefreshContext) -> Result<Vec<Event>> {
    let events_file = ctx.events_file();
    if !events_file.exists() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(&events_file).map_err(|e| {
        RefreshError::UserError(format!(
            "failed to read events file '{}': {}",
            events_file.display(),
            e
        ))
    })?;

    Ok(content
        .lines()
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_event_creation() {
        let event = Event::new(EventAction::LockSet);

        assert_eq!(event.action, EventAction::LockSet);
        assert!(!event.actor.is_empty());
        assert_eq!(event.pid, std::process::id());
        let age = Utc::now().signed_duration_since(event.ts);
        assert!(age.num_minutes() < 1);
    }

    #[test]
    fn test_event_serialization_is_single_line() {
        let event = Event::new(EventAction::LockClear).with_details(json!({"forced": true}));

        let json_line = event.to_ndjson_line().unwrap();

        assert!(!json_line.contains('\n'));
        assert!(json_line.contains("\"lock_clear\""));
        let parsed: Event = serde_json::from_str(&json_line).unwrap();
        assert_eq!(parsed.details["forced"], true);
    }

    #[test]
    fn test_event_action_display_matches_serde() {
        for action in [
            EventAction::Init,
            EventAction::LockSet,
            EventAction::LockAcquire,
            EventAction::LockRelease,
            EventAction::LockClear,
            EventAction::RunStart,
            EventAction::RunStop,
        ] {
            let serialized = serde_json::to_value(action).unwrap();
            assert_eq!(serialized, Value::String(action.to_string()));
        }
    }

    #[test]
    fn test_append_and_read_events() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = RefreshContext::from_root(temp_dir.path());
        assert!(read_events(&ctx).unwrap().is_empty());

        append_event(&ctx, &Event::new(EventAction::RunStart)).unwrap();
        append_event(
            &ctx,
            &Event::new(EventAction::LockSet).with_details(json!({"held": true})),
        )
        .unwrap();

        let events = read_events(&ctx).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].action, EventAction::RunStart);
        assert_eq!(events[1].details["held"], true);
    }

    #[test]
    fn test_read_events_skips_garbage_lines() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = RefreshContext::from_root(temp_dir.path());
        append_event(&ctx, &Event::new(EventAction::Init)).unwrap();
        let mut file = OpenOptions::new()
            .append(true)
            .open(ctx.events_file())
            .unwrap();
        writeln!(file, "not json").unwrap();

        assert_eq!(read_events(&ctx).unwrap().len(), 1);
    }

    #[test]
    fn test_record_event_disabled_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = RefreshContext::from_root(temp_dir.path());

        record_event(&ctx, false, Event::new(EventAction::LockSet));

        assert!(!ctx.events_file().exists());
    }
}
