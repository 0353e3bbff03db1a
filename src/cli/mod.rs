//! CLI argument parsing for globalrefresh.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// globalrefresh: periodic refresh driver coordinated through a shared lock.
///
/// Every instance pointed at the same state root shares one lock. While the
/// lock is held and fresh, no instance advances its refresh counter.
#[derive(Parser, Debug)]
#[command(name = "globalrefresh")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// State root holding config, shared store and event log.
    #[arg(long, global = true, env = "GLOBALREFRESH_HOME")]
    pub home: Option<PathBuf>,

    /// Enable debug diagnostics on stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for globalrefresh.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize a state root with the default configuration.
    Init(InitArgs),

    /// Run the widget over stdin/stdout.
    ///
    /// Reads host requests as newline-delimited JSON on stdin and writes
    /// component messages to stdout.
    Run(RunArgs),

    /// Inspect or change the shared lock.
    Lock(LockCommand),
}

/// Arguments for the `init` command.
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Overwrite an existing config file.
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `run` command.
///
/// Any start flag applies a `start_refresh` request before reading stdin.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Tick interval in milliseconds.
    #[arg(long)]
    pub interval: Option<u64>,

    /// Stop once the count reaches this value.
    #[arg(long)]
    pub limit: Option<u64>,

    /// Instance key.
    #[arg(long)]
    pub key: Option<String>,

    /// Lock freshness window in milliseconds.
    #[arg(long, conflicts_with = "no_lock_expiration")]
    pub lock_expiration: Option<u64>,

    /// Never treat a held lock as stale.
    #[arg(long, action = ArgAction::SetTrue)]
    pub no_lock_expiration: bool,
}

impl RunArgs {
    /// Whether any flag asks for an immediate start.
    pub fn wants_start(&self) -> bool {
        self.interval.is_some()
            || self.limit.is_some()
            || self.key.is_some()
            || self.lock_expiration.is_some()
            || self.no_lock_expiration
    }
}

/// Lock subcommands.
#[derive(Parser, Debug)]
pub struct LockCommand {
    #[command(subcommand)]
    pub action: LockAction,
}

/// Available lock actions.
#[derive(Subcommand, Debug)]
pub enum LockAction {
    /// Show the persisted lock record and whether it is fresh.
    Status,

    /// Write the lock flag with a fresh timestamp.
    Set(LockSetArgs),

    /// Take the lock if it is not held; fails with exit code 4 otherwise.
    Acquire,

    /// Release the lock.
    Release,

    /// Remove both lock keys from the store.
    ///
    /// Requires --force flag to prevent accidental clearing.
    Clear(LockClearArgs),
}

/// Arguments for the `lock set` command.
#[derive(Parser, Debug)]
pub struct LockSetArgs {
    /// New lock state.
    #[arg(action = ArgAction::Set)]
    pub state: bool,
}

/// Arguments for the `lock clear` command.
#[derive(Parser, Debug)]
pub struct LockClearArgs {
    /// Force clearing the lock (required for safety).
    #[arg(long)]
    pub force: bool,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_debug_assert() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_init() {
        let cli = Cli::try_parse_from(["globalrefresh", "init"]).unwrap();
        assert!(matches!(cli.command, Command::Init(InitArgs { force: false })));
    }

    #[test]
    fn parse_run_without_flags() {
        let cli = Cli::try_parse_from(["globalrefresh", "run"]).unwrap();
        let Command::Run(args) = cli.command else {
            panic!("Expected Run command");
        };
        assert!(!args.wants_start());
    }

    #[test]
    fn parse_run_full() {
        let cli = Cli::try_parse_from([
            "globalrefresh",
            "--home",
            "/tmp/shared",
            "run",
            "--interval",
            "5000",
            "--limit",
            "100",
            "--key",
            "comp12",
            "--lock-expiration",
            "20000",
        ])
        .unwrap();

        assert_eq!(cli.home, Some(PathBuf::from("/tmp/shared")));
        let Command::Run(args) = cli.command else {
            panic!("Expected Run command");
        };
        assert_eq!(args.interval, Some(5000));
        assert_eq!(args.limit, Some(100));
        assert_eq!(args.key.as_deref(), Some("comp12"));
        assert_eq!(args.lock_expiration, Some(20000));
        assert!(args.wants_start());
    }

    #[test]
    fn parse_run_expiration_flags_conflict() {
        let result = Cli::try_parse_from([
            "globalrefresh",
            "run",
            "--lock-expiration",
            "1000",
            "--no-lock-expiration",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn parse_lock_set() {
        let cli = Cli::try_parse_from(["globalrefresh", "lock", "set", "true"]).unwrap();
        let Command::Lock(LockCommand {
            action: LockAction::Set(args),
        }) = cli.command
        else {
            panic!("Expected lock set");
        };
        assert!(args.state);

        assert!(Cli::try_parse_from(["globalrefresh", "lock", "set", "maybe"]).is_err());
    }

    #[test]
    fn parse_lock_clear_force() {
        let cli = Cli::try_parse_from(["globalrefresh", "lock", "clear", "--force"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Lock(LockCommand {
                action: LockAction::Clear(LockClearArgs { force: true })
            })
        ));
    }

    #[test]
    fn parse_global_verbose_after_subcommand() {
        let cli = Cli::try_parse_from(["globalrefresh", "lock", "status", "-v"]).unwrap();
        assert!(cli.verbose);
    }
}
