//! Core data models for title matching.
//!
//! Records come from the external record source, candidates from a single
//! directory listing. Everything here is immutable once a run starts.

use rustc_hash::FxHashMap;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

// ============================================================================
// Records
// ============================================================================

/// A labeled reference entry: identifier plus title.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Record {
    pub id: String,
    pub title: String,
}

impl Record {
    /// Build a record, trimming surrounding whitespace from both fields.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into().trim().to_string(),
            title: title.into().trim().to_string(),
        }
    }
}

/// Title-keyed view of the records for one run.
///
/// Titles are unique. A repeated title keeps the ranking position of its first
/// occurrence but takes the id of its last occurrence (mapping overwrite).
#[derive(Clone, Debug, Default)]
pub struct RecordSet {
    records: Vec<Record>,
    by_title: FxHashMap<String, usize>,
}

impl RecordSet {
    pub fn new(records: impl IntoIterator<Item = Record>) -> Self {
        let mut set = Self::default();
        for record in records {
            set.insert(record);
        }
        set
    }

    fn insert(&mut self, record: Record) {
        let key = record.title.trim().to_string();
        match self.by_title.get(&key) {
            Some(&idx) => self.records[idx].id = record.id,
            None => {
                self.by_title.insert(key, self.records.len());
                self.records.push(record);
            }
        }
    }

    /// Case-sensitive lookup on the trimmed title.
    pub fn get_exact(&self, title: &str) -> Option<&Record> {
        self.by_title.get(title.trim()).map(|&idx| &self.records[idx])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<Record> for RecordSet {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ============================================================================
// Candidates
// ============================================================================

/// A file from the source directory, decomposed into stem and extension.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub file_name: String,
    pub stem: String,
    /// Extension including the leading dot, or empty.
    pub extension: String,
}

impl Candidate {
    pub fn new(file_name: impl Into<String>) -> Self {
        let file_name = file_name.into();
        let (stem, extension) = split_extension(&file_name);
        let (stem, extension) = (stem.to_string(), extension.to_string());
        Self {
            file_name,
            stem,
            extension,
        }
    }
}

/// Split a filename at its last dot.
///
/// Leading dots do not start an extension, so `.bashrc` has none and
/// `archive.tar.gz` splits into `archive.tar` + `.gz`.
pub fn split_extension(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(dot) if file_name[..dot].chars().any(|c| c != '.') => {
            (&file_name[..dot], &file_name[dot..])
        }
        _ => (file_name, ""),
    }
}

// ============================================================================
// Match Results
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Exact,
    Fuzzy,
    None,
}

impl MatchKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchKind::Exact => "exact",
            MatchKind::Fuzzy => "fuzzy",
            MatchKind::None => "none",
        }
    }
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of matching one candidate.
///
/// For `MatchKind::None`, `score` is the best score seen below the threshold
/// (0.0 when there were no records to compare against).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MatchResult {
    pub candidate: Candidate,
    pub record: Option<Record>,
    pub score: f64,
    pub kind: MatchKind,
}

impl MatchResult {
    pub fn is_match(&self) -> bool {
        self.kind != MatchKind::None
    }
}

/// Bidirectional accounting for one run.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ReconciliationReport {
    /// Matched candidates in candidate order.
    pub assignments: Vec<MatchResult>,
    /// Candidates with no record, in candidate order.
    pub unmatched_files: Vec<Candidate>,
    /// Records no candidate matched, in record-set order.
    pub unmatched_records: Vec<Record>,
}

// ============================================================================
// Threshold
// ============================================================================

/// Minimum fuzzy similarity, validated to lie in `[0.1, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Threshold(f64);

impl Threshold {
    pub const MIN: f64 = 0.1;
    pub const MAX: f64 = 1.0;
    pub const DEFAULT: f64 = 0.6;

    pub fn new(value: f64) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(Error::InvalidThreshold(value))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl FromStr for Threshold {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let value: f64 = s
            .trim()
            .parse()
            .map_err(|_| Error::ThresholdNotNumber(s.to_string()))?;
        Self::new(value)
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
