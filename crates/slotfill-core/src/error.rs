//! Errors that abort a run.
//!
//! Per-record conditions (unmatched anchors, filled slots, structural
//! anomalies) never surface here; they are collected in the
//! [`EnrichReport`](crate::report::EnrichReport).

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("input is empty")]
    EmptyInput,

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid `{field}` pattern: {source}")]
    InvalidPattern {
        field: String,
        #[source]
        source: regex::Error,
    },

    #[error("overlapping edits on line {line_no}")]
    PatchConflict { line_no: usize },
}

pub type Result<T, E = EnrichError> = std::result::Result<T, E>;
