//! Implementation of the `globalrefresh lock` subcommands.
//!
//! Operator tools for inspecting and intervening on the shared lock record:
//! `status`, `set`, `acquire`, `release` and `clear --force`.

use crate::cli::LockAction;
use crate::clock::SystemClock;
use crate::config::Config;
use crate::context::RefreshContext;
use crate::error::{RefreshError, Result};
use crate::events::{Event, EventAction, record_event};
use crate::locks::LockStore;
use chrono::DateTime;
use serde_json::json;
use std::sync::Arc;

pub fn cmd_lock(ctx: &RefreshContext, action: LockAction) -> Result<()> {
    let config = ctx.load_config()?;
    let lock = ctx.open_lock_store(&config, Arc::new(SystemClock));

    match action {
        LockAction::Status => {
            print!("{}", format_status(&lock, config.lock_expiration_ms));
        }
        LockAction::Set(args) => {
            lock.set_lock(args.state)?;
            record(ctx, &config, EventAction::LockSet, &lock);
            println!("Lock set to {}.", args.state);
        }
        LockAction::Acquire => {
            acquire(&lock, config.lock_expiration_ms)?;
            record(ctx, &config, EventAction::LockAcquire, &lock);
            println!("Lock acquired.");
        }
        LockAction::Release => {
            lock.release()?;
            record(ctx, &config, EventAction::LockRelease, &lock);
            println!("Lock released.");
        }
        LockAction::Clear(args) => {
            if !args.force {
                return Err(RefreshError::UserError(
                    "refusing to clear the lock without --force".to_string(),
                ));
            }
            lock.clear()?;
            record(ctx, &config, EventAction::LockClear, &lock);
            println!("Lock record cleared.");
        }
    }

    Ok(())
}

/// Acquire the lock or fail with a lock error naming the current holder record.
fn acquire(lock: &LockStore, window: Option<u64>) -> Result<()> {
    if lock.try_acquire(window)? {
        return Ok(());
    }

    let record = lock.snapshot();
    Err(RefreshError::LockError(format!(
        "lock is held (age {}); try again later or run `globalrefresh lock clear --force`",
        record.age_string(lock.now_millis())
    )))
}

/// Render the persisted record without clearing anything.
fn format_status(lock: &LockStore, window: Option<u64>) -> String {
    let record = lock.snapshot();
    let now = lock.now_millis();
    let keys = lock.keys();

    let mut out = String::new();
    out.push_str(&format!("Flag key:      {}\n", keys.flag));
    out.push_str(&format!("Timestamp key: {}\n", keys.timestamp));

    if !record.recorded {
        out.push_str("State:         unset\n");
        return out;
    }

    let written = DateTime::from_timestamp_millis(record.acquired_at_millis)
        .map(|ts| ts.to_rfc3339())
        .unwrap_or_else(|| "invalid".to_string());
    let freshness = match window {
        Some(window) if record.is_stale(now, Some(window)) => {
            format!("stale (window {} ms)", window)
        }
        Some(window) => format!("fresh (window {} ms)", window),
        None => "never expires".to_string(),
    };

    out.push_str(&format!(
        "State:         {}\n",
        if record.held { "held" } else { "free" }
    ));
    out.push_str(&format!("Written:       {}\n", written));
    out.push_str(&format!("Age:           {}\n", record.age_string(now)));
    out.push_str(&format!("Freshness:     {}\n", freshness));
    out
}

fn record(ctx: &RefreshContext, config: &Config, action: EventAction, lock: &LockStore) {
    let snapshot = lock.snapshot();
    record_event(
        ctx,
        config.events_enabled,
        Event::new(action).with_details(json!({
            "held": snapshot.held,
            "at_ms": snapshot.acquired_at_millis,
            "flag_key": lock.keys().flag,
        })),
    );
}
