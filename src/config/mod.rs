//! Configuration model for globalrefresh.
//!
//! This module defines the Config struct that represents
//! `.globalrefresh/config.yaml`. It supports forward-compatible YAML parsing
//! (unknown fields are ignored), defaults for missing fields, and validation.

mod model;
mod operations;


// Re-export public API
pub use model::Config;
