//! Implementation of the `globalrefresh init` command.
//!
//! Creates the state root with a default `config.yaml`, the shared store
//! directory, and the events directory. Running it again is harmless unless
//! `--force` is given, which rewrites the config with defaults.

use crate::cli::InitArgs;
use crate::config::Config;
use crate::context::RefreshContext;
use crate::error::{RefreshError, Result};
use crate::events::{Event, EventAction, record_event};
use crate::fs::atomic_write_file;
use serde_json::json;
use std::fs;
use std::path::Path;

pub fn cmd_init(ctx: &RefreshContext, args: InitArgs) -> Result<()> {
    let written = init_state_root(ctx, args.force)?;
    let config = ctx.load_config()?;

    if written {
        println!("Initialized globalrefresh state.");
    } else {
        println!("globalrefresh state already initialized (use --force to rewrite config).");
    }
    println!();
    println!("Root:   {}", ctx.root.display());
    println!("Config: {}", ctx.config_path().display());
    println!("Store:  {}", config.store_path(&ctx.root).display());
    println!("Events: {}", ctx.events_file().display());

    Ok(())
}

/// Create the state layout. Returns whether the config file was written.
pub(crate) fn init_state_root(ctx: &RefreshContext, force: bool) -> Result<bool> {
    let write_config = force || !ctx.is_initialized();

    if write_config {
        let yaml = Config::default().to_yaml()?;
        atomic_write_file(ctx.config_path(), &yaml)?;
    }

    let config = ctx.load_config()?;
    create_dir(&config.store_path(&ctx.root))?;
    create_dir(&ctx.events_dir())?;

    if write_config {
        record_event(
            ctx,
            config.events_enabled,
            Event::new(EventAction::Init).with_details(json!({
                "root": ctx.root.display().to_string(),
                "force": force,
            })),
        );
    }

    Ok(write_config)
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| {
        RefreshError::UserError(format!(
            "failed to create directory '{}': {}",
            path.display(),
            e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::read_events;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_layout() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = RefreshContext::resolve_from(temp_dir.path());

        assert!(init_state_root(&ctx, false).unwrap());

        assert!(ctx.config_path().exists());
        assert!(ctx.root.join("store").is_dir());
        assert!(ctx.events_dir().is_dir());
        assert_eq!(ctx.load_config().unwrap(), Config::default());

        let events = read_events(&ctx).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action, EventAction::Init);
    }

    #[test]
    fn test_init_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = RefreshContext::resolve_from(temp_dir.path());
        init_state_root(&ctx, false).unwrap();
        fs::write(ctx.config_path(), "default_interval_ms: 1234\n").unwrap();

        assert!(!init_state_root(&ctx, false).unwrap());
        assert_eq!(ctx.load_config().unwrap().default_interval_ms, 1234);
        assert_eq!(read_events(&ctx).unwrap().len(), 1);
    }

    #[test]
    fn test_init_force_rewrites_config() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = RefreshContext::resolve_from(temp_dir.path());
        init_state_root(&ctx, false).unwrap();
        fs::write(ctx.config_path(), "default_interval_ms: 1234\n").unwrap();

        assert!(init_state_root(&ctx, true).unwrap());
        assert_eq!(ctx.load_config().unwrap(), Config::default());
    }

    #[test]
    fn test_init_rejects_invalid_existing_config() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = RefreshContext::resolve_from(temp_dir.path());
        fs::create_dir_all(&ctx.root).unwrap();
        fs::write(ctx.config_path(), "default_interval_ms: 0\n").unwrap();

        assert!(init_state_root(&ctx, false).is_err());
    }
}
