//! Command implementations for globalrefresh.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations.

mod init;
mod lock;
mod run;

use crate::cli::{Cli, Command};
use crate::context::RefreshContext;
use crate::error::Result;

/// Dispatch a command to its implementation.
pub fn dispatch(cli: Cli) -> Result<()> {
    let ctx = RefreshContext::resolve(cli.home.as_deref())?;

    match cli.command {
        Command::Init(args) => init::cmd_init(&ctx, args),
        Command::Run(args) => run::cmd_run(&ctx, args),
        Command::Lock(lock_cmd) => lock::cmd_lock(&ctx, lock_cmd.action),
    }
}
