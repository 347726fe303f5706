//! Validated run configuration and input loading.
//!
//! Everything that can be rejected up front (threshold, columns, template)
//! is checked here, before any matching starts.

use log::info;
use std::path::PathBuf;

use crate::error::Result;
use crate::listing::{list_candidates, ListOptions};
use crate::models::{Candidate, RecordSet, Threshold};
use crate::records::{load_records, RecordColumns};
use crate::rename::NameTemplate;

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub records_path: PathBuf,
    pub source_dir: PathBuf,
    pub columns: RecordColumns,
    pub threshold: Threshold,
    pub list: ListOptions,
    pub template: NameTemplate,
}

/// Records and candidates for one run, fully loaded.
#[derive(Debug, Clone)]
pub struct Inputs {
    pub records: RecordSet,
    pub candidates: Vec<Candidate>,
    /// Record rows dropped for a missing id or title.
    pub skipped_records: usize,
}

impl RunConfig {
    pub fn new(records_path: impl Into<PathBuf>, source_dir: impl Into<PathBuf>) -> Self {
        Self {
            records_path: records_path.into(),
            source_dir: source_dir.into(),
            columns: RecordColumns::default(),
            threshold: Threshold::default(),
            list: ListOptions::default(),
            template: NameTemplate::default(),
        }
    }

    /// Read the record source and list the source directory.
    ///
    /// Fails on a missing column or an unreadable source directory; the
    /// caller gets nothing partial.
    pub fn load_inputs(&self) -> Result<Inputs> {
        let load = load_records(&self.records_path, &self.columns)?;
        let raw_count = load.records.len();
        let records = RecordSet::new(load.records);
        info!(
            "Read {} records ({} unique titles, {} rows skipped)",
            raw_count,
            records.len(),
            load.skipped
        );

        let candidates = list_candidates(&self.source_dir, &self.list)?;
        info!(
            "Found {} candidate files in {:?}",
            candidates.len(),
            self.source_dir
        );

        Ok(Inputs {
            records,
            candidates,
            skipped_records: load.skipped,
        })
    }
}
