//! # Biolife IO
//!
//! I/O and persistence layer for the Biolife simulation.
//!
//! This crate provides:
//! - Structured error handling with custom error types
//! - Validated JSON serialization helpers
//! - Snapshot files, plain or gzip-compressed

/// Error types and result aliases for I/O operations
pub mod error;
/// Snapshot save and load
pub mod persistence;
/// Validated serialization helpers for JSON
pub mod serialization;

pub use error::{IoError, Result};
pub use persistence::{is_gzip, load_snapshot, save_snapshot};
pub use serialization::{from_json, read_json_file, to_json, to_json_pretty, write_json_file};
