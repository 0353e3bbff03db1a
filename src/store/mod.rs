//! Shared key/value medium for cross-instance coordination.
//!
//! Every instance that should coordinate points at the same store (the same
//! directory for [`FileStore`], or clones of one [`MemoryStore`]). The store is
//! unsynchronized: any instance may read or write any key at any time.

mod file;
mod memory;

pub use file::FileStore;
pub(crate) use file::validate_key;
pub use memory::MemoryStore;

use crate::error::Result;

/// String-valued key/value storage shared between instances.
pub trait SharedStore: Send + Sync {
    /// Read a value. Missing or unreadable values are `None`.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a value. Removing an absent key succeeds.
    fn remove(&self, key: &str) -> Result<()>;
}
