//! Title matching library - shared modules for all binaries.
//!
//! Matches files in a directory against `(id, title)` records, exact match
//! first and fuzzy similarity second, and reports files without a record and
//! records without a file.

pub mod config;
pub mod error;
pub mod executor;
pub mod listing;
pub mod matcher;
pub mod models;
pub mod progress;
pub mod reconcile;
pub mod records;
pub mod rename;
pub mod report;
pub mod safety;
pub mod scoring;

pub use error::{Error, Result};
pub use matcher::match_stem;
pub use models::{
    Candidate, MatchKind, MatchResult, ReconciliationReport, Record, RecordSet, Threshold,
};
pub use reconcile::reconcile;
pub use rename::{plan, plan_all, NameTemplate, PlannedRename};
pub use scoring::similarity;
