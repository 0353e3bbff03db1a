//! Filesystem utilities for globalrefresh.
//!
//! The file-backed shared store relies on atomic replacement so that another
//! instance polling the same key never observes a half-written value.

pub mod atomic;

pub use atomic::atomic_write_file;
