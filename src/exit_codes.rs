//! Exit code constants for the globalrefresh CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, invalid config)
//! - 2: Shared store failure
//! - 3: Host channel I/O failure
//! - 4: Lock is held by another instance

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments or an invalid config file.
pub const USER_ERROR: i32 = 1;

/// Shared store failure: a lock key could not be written or removed.
pub const STORE_FAILURE: i32 = 2;

/// Host channel failure: stdin/stdout could not be read or written.
pub const HOST_FAILURE: i32 = 3;

/// Lock acquisition failure: the shared lock is held and still fresh.
pub const LOCK_FAILURE: i32 = 4;
