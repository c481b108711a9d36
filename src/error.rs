//! Domain errors raised while locating snapshots and reading their tables.
//!
//! Application-level plumbing wraps these in `anyhow` with file context;
//! the variants here are what callers match on to decide between skipping
//! and aborting.

use crate::models::TableKind;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the snapshot locator and the table extractors.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// A selected snapshot file name carries no `YYYY-MM-DD_HH-MM-SS` timestamp.
    #[error("no capture timestamp in snapshot file name: {}", .0.display())]
    MalformedFilename(PathBuf),

    /// The table does not have the rows, cells or values its layout requires.
    #[error("{table} table has an unexpected shape: {reason}")]
    UnexpectedTableShape { table: TableKind, reason: String },
}

impl ConvertError {
    pub fn shape(table: TableKind, reason: impl Into<String>) -> Self {
        ConvertError::UnexpectedTableShape {
            table,
            reason: reason.into(),
        }
    }
}
