//! Run summary: counts, text rendering and the JSON report.

use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::executor::{CopyFailure, CopyOutcome};
use crate::models::{MatchKind, ReconciliationReport, Record, Threshold};
use crate::rename::PlannedRename;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub exact: usize,
    pub fuzzy: usize,
    pub unmatched_files: usize,
    pub unmatched_records: usize,
    /// Files actually written, by kind. `None` when nothing was copied (dry run).
    pub copied_exact: Option<usize>,
    pub copied_fuzzy: Option<usize>,
    pub copy_failures: usize,
}

impl Summary {
    pub fn matched(&self) -> usize {
        self.exact + self.fuzzy
    }

    pub fn copied(&self) -> Option<usize> {
        Some(self.copied_exact? + self.copied_fuzzy?)
    }
}

/// Count matches by kind. Copied counts and failures come from `outcome`
/// when a copy ran.
pub fn summarize(report: &ReconciliationReport, outcome: Option<&CopyOutcome>) -> Summary {
    let count = |kind: MatchKind| report.assignments.iter().filter(|a| a.kind == kind).count();
    Summary {
        exact: count(MatchKind::Exact),
        fuzzy: count(MatchKind::Fuzzy),
        unmatched_files: report.unmatched_files.len(),
        unmatched_records: report.unmatched_records.len(),
        copied_exact: outcome.map(|o| o.exact),
        copied_fuzzy: outcome.map(|o| o.fuzzy),
        copy_failures: outcome.map_or(0, |o| o.failures.len()),
    }
}

/// Everything a front end needs to show or persist about one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub threshold: Threshold,
    pub output_dir: Option<PathBuf>,
    pub summary: Summary,
    pub assignments: Vec<PlannedRename>,
    pub unmatched_files: Vec<String>,
    pub unmatched_records: Vec<Record>,
    pub copy_failures: Vec<CopyFailure>,
}

impl RunReport {
    pub fn new(
        threshold: Threshold,
        report: &ReconciliationReport,
        plan: Vec<PlannedRename>,
        outcome: Option<&CopyOutcome>,
        output_dir: Option<&Path>,
    ) -> Self {
        Self {
            threshold,
            output_dir: output_dir.map(Path::to_path_buf),
            summary: summarize(report, outcome),
            assignments: plan,
            unmatched_files: report
                .unmatched_files
                .iter()
                .map(|c| c.file_name.clone())
                .collect(),
            unmatched_records: report.unmatched_records.clone(),
            copy_failures: outcome.map(|o| o.failures.clone()).unwrap_or_default(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Human-readable summary, one section per outcome.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let s = &self.summary;

        let _ = writeln!(out, "{:=<60}", "");
        let _ = writeln!(out, "Matching complete (threshold {})", self.threshold);
        let _ = writeln!(out, "  Matched: {}", s.matched());
        let _ = writeln!(out, "    exact: {}", s.exact);
        let _ = writeln!(out, "    fuzzy: {}", s.fuzzy);
        if let (Some(exact), Some(fuzzy)) = (s.copied_exact, s.copied_fuzzy) {
            let _ = writeln!(out, "  Copied: {} (exact {}, fuzzy {})", exact + fuzzy, exact, fuzzy);
        }
        if let Some(dir) = &self.output_dir {
            let _ = writeln!(out, "  Output: {}", dir.display());
        }
        let _ = writeln!(out, "  Unmatched files: {}", s.unmatched_files);
        let _ = writeln!(out, "  Records without a file: {}", s.unmatched_records);
        if s.copy_failures > 0 {
            let _ = writeln!(out, "  Copy failures: {}", s.copy_failures);
        }
        let _ = writeln!(out, "{:=<60}", "");

        if !self.unmatched_files.is_empty() {
            let _ = writeln!(out, "\nUnmatched files:");
            for name in &self.unmatched_files {
                let _ = writeln!(out, "  - {name}");
            }
        }

        if !self.unmatched_records.is_empty() {
            let _ = writeln!(out, "\nRecords without a file:");
            for record in &self.unmatched_records {
                let _ = writeln!(out, "  - [{}] {}", record.id, record.title);
            }
        }

        if !self.copy_failures.is_empty() {
            let _ = writeln!(out, "\nCopy failures:");
            for failure in &self.copy_failures {
                let _ = writeln!(out, "  - {}: {}", failure.original, failure.error);
            }
        }

        out
    }
}

/// Preview lines in the form `001. original → new (kind, score)`.
pub fn render_preview(plan: &[PlannedRename]) -> String {
    let mut out = String::new();
    for (i, p) in plan.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:03}. {} → {} ({}, {:.2})",
            i + 1,
            p.original,
            p.new_name,
            p.kind,
            p.score
        );
    }
    out
}
