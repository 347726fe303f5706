//! Error type for configuration and environment failures.
//!
//! Matching outcomes (including "no match") are never errors; only problems
//! that must stop a run before or during setup are represented here.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("similarity threshold must be between 0.1 and 1.0, got {0}")]
    InvalidThreshold(f64),

    #[error("similarity threshold must be a number, got '{0}'")]
    ThresholdNotNumber(String),

    #[error("record source is missing column '{column}' (found: {found})")]
    MissingColumn { column: String, found: String },

    #[error("invalid name template '{template}': {reason}")]
    InvalidTemplate { template: String, reason: String },

    #[error("cannot read record source: {0}")]
    Csv(#[from] csv::Error),

    #[error("cannot list source directory {path:?}: {source}")]
    SourceDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot create output directory {path:?}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsafe output directory: {0}")]
    UnsafeOutput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
