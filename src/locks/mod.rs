//! Lock store for cross-instance refresh coordination.
//!
//! The lock lives in a [`SharedStore`](crate::store::SharedStore) under two
//! well-known keys:
//! - the flag key (default `shared_refresh_lock`) holding `"true"` or `"false"`
//! - the timestamp key (default `shared_refresh_lock_timestamp`) holding the
//!   epoch milliseconds of the last write
//!
//! # Freshness
//!
//! A record older than the configured freshness window is stale. Querying a
//! stale record clears both keys and reports "unlocked", so a holder that
//! crashed without releasing cannot block every other instance forever.
//! A window of `None` disables expiry.
//!
//! # Consistency
//!
//! This is a polling, optimistic lock. [`LockStore::try_acquire`] reads and
//! then writes; two instances can both observe "unlocked" in between. An
//! occasional double refresh is acceptable for this workload.

mod operations;
mod types;


// Re-export public API
pub use operations::{LockStore, parse_timestamp};
pub use types::{
    DEFAULT_LOCK_EXPIRATION_MS, DEFAULT_LOCK_KEY, DEFAULT_LOCK_TIMESTAMP_KEY, LockKeys, LockRecord,
};
