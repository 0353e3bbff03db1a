//! Implementation of the `globalrefresh run` command.
//!
//! Binds a scheduler over the file-backed shared store to stdin/stdout and
//! runs the widget event loop until the host closes its input and the
//! scheduler goes idle.

use crate::cli::RunArgs;
use crate::clock::SystemClock;
use crate::config::Config;
use crate::context::RefreshContext;
use crate::error::Result;
use crate::events::{Event, EventAction, record_event};
use crate::host::StdioHost;
use crate::protocol::{HostMessage, StartRefresh};
use crate::runtime::{Runtime, spawn_line_reader};
use crate::scheduler::RefreshScheduler;
use serde_json::json;
use std::io::{self, BufReader};
use std::sync::Arc;

pub fn cmd_run(ctx: &RefreshContext, args: RunArgs) -> Result<()> {
    let config = ctx.load_config()?;
    let lock = ctx.open_lock_store(&config, Arc::new(SystemClock));
    let mut scheduler = RefreshScheduler::new(lock)
        .with_default_interval(config.default_interval_ms)
        .with_config(config.initial_scheduler_config());

    if args.wants_start() {
        scheduler.handle_message(HostMessage::StartRefresh(start_request(&args, &config)))?;
    }

    tracing::info!(
        event = "run.started",
        root = %ctx.root.display(),
        store = %config.store_path(&ctx.root).display(),
    );
    record_event(
        ctx,
        config.events_enabled,
        Event::new(EventAction::RunStart).with_details(json!({
            "interval": args.interval,
            "limit": args.limit,
            "key": args.key,
        })),
    );

    let mut runtime = Runtime::new(scheduler, StdioHost::new(io::stdout().lock()));
    let result = runtime.run(spawn_line_reader(BufReader::new(io::stdin())));

    let details = match &result {
        Ok(summary) => json!({
            "count": summary.final_count,
            "lines": summary.lines_handled,
        }),
        Err(e) => json!({
            "count": runtime.scheduler().count(),
            "error": e.to_string(),
        }),
    };
    record_event(
        ctx,
        config.events_enabled,
        Event::new(EventAction::RunStop).with_details(details),
    );
    tracing::info!(event = "run.stopped", count = runtime.scheduler().count());

    result.map(|_| ())
}

/// Build the startup `start_refresh` request from CLI flags.
///
/// Without an explicit expiration flag the configured window applies.
fn start_request(args: &RunArgs, config: &Config) -> StartRefresh {
    let lock_expiration = if args.no_lock_expiration {
        None
    } else {
        args.lock_expiration.or(config.lock_expiration_ms)
    };

    StartRefresh {
        interval: args.interval,
        key: args.key.clone(),
        refresh_limit: args.limit,
        lock_expiration,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> RunArgs {
        RunArgs {
            interval: Some(2000),
            limit: Some(10),
            key: Some("comp".to_string()),
            lock_expiration: None,
            no_lock_expiration: false,
        }
    }

    #[test]
    fn test_start_request_uses_configured_expiration() {
        let mut config = Config::default();
        config.lock_expiration_ms = Some(45_000);

        let request = start_request(&args(), &config);

        assert_eq!(request.interval, Some(2000));
        assert_eq!(request.refresh_limit, Some(10));
        assert_eq!(request.key.as_deref(), Some("comp"));
        assert_eq!(request.lock_expiration, Some(45_000));
    }

    #[test]
    fn test_start_request_flag_overrides_config() {
        let mut run_args = args();
        run_args.lock_expiration = Some(5_000);

        let request = start_request(&run_args, &Config::default());

        assert_eq!(request.lock_expiration, Some(5_000));
    }

    #[test]
    fn test_start_request_disables_expiration() {
        let mut run_args = args();
        run_args.no_lock_expiration = true;

        let request = start_request(&run_args, &Config::default());

        assert_eq!(request.lock_expiration, None);
    }
}
