//! Error types for the globalrefresh CLI.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.
//! The lock and scheduler core never surface these for malformed shared data;
//! they only appear when the store itself cannot be written or the host
//! channel breaks.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for globalrefresh operations.
#[derive(Error, Debug)]
pub enum RefreshError {
    /// User provided invalid arguments or configuration.
    #[error("{0}")]
    UserError(String),

    /// The shared key/value store could not be written.
    #[error("Shared store failure: {0}")]
    StoreError(String),

    /// Reading from or writing to the host channel failed.
    #[error("Host channel failure: {0}")]
    HostError(String),

    /// The shared lock is held by another instance.
    #[error("Lock acquisition failed: {0}")]
    LockError(String),
}

impl RefreshError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            RefreshError::UserError(_) => exit_codes::USER_ERROR,
            RefreshError::StoreError(_) => exit_codes::STORE_FAILURE,
            RefreshError::HostError(_) => exit_codes::HOST_FAILURE,
            RefreshError::LockError(_) => exit_codes::LOCK_FAILURE,
        }
    }
}

/// Result type alias for globalrefresh operations.
pub type Result<T> = std::result::Result<T, RefreshError>;
