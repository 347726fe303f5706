//! Output filename planning for matched candidates.
//!
//! The default rule prefixes the record id to the original filename:
//! `{id}_{original}`. Other layouts can be expressed as a [`NameTemplate`].
//! [`plan_all`] additionally guarantees that no two planned names collide.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::{split_extension, MatchKind, MatchResult, ReconciliationReport};

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([^{}]*)\}").unwrap());

pub const DEFAULT_TEMPLATE: &str = "{id}_{original}";
pub const DEFAULT_INDEX_WIDTH: usize = 3;
pub const MAX_INDEX_WIDTH: usize = 6;
pub const DEFAULT_START_INDEX: usize = 1;
pub const MAX_START_INDEX: usize = 9999;

// ============================================================================
// Single Assignment
// ============================================================================

/// New filename for one assignment under the default rule.
///
/// Returns `None` for results without a matched record.
pub fn plan(assignment: &MatchResult) -> Option<String> {
    assignment
        .record
        .as_ref()
        .map(|record| format!("{}_{}", record.id, assignment.candidate.file_name))
}

// ============================================================================
// Templates
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Id,
    Original,
    Name,
    Ext,
    Date,
    Index,
}

/// Parsed filename template.
///
/// Placeholders: `{id}`, `{original}` (full original filename), `{name}`
/// (stem), `{ext}` (lower-cased extension without the dot), `{date}`
/// (`YYYYMMDD`) and `{index}` (position counted from the start index,
/// zero-padded to the index width).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameTemplate {
    segments: Vec<Segment>,
    index_width: usize,
    start_index: usize,
}

/// Values substituted into a template for one file.
#[derive(Debug, Clone)]
pub struct RenameContext<'a> {
    pub id: &'a str,
    pub original: &'a str,
    pub date: NaiveDate,
    /// Zero-based position among the assignments.
    pub index: usize,
}

impl NameTemplate {
    pub fn parse(template: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidTemplate {
            template: template.to_string(),
            reason: reason.to_string(),
        };

        if template.trim().is_empty() {
            return Err(invalid("template is empty"));
        }
        if template.contains(['/', '\\']) {
            return Err(invalid("template must not contain path separators"));
        }

        let mut segments = Vec::new();
        let mut last = 0;
        for caps in PLACEHOLDER.captures_iter(template) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            if whole.start() > last {
                segments.push(Segment::Literal(template[last..whole.start()].to_string()));
            }
            let segment = match &caps[1] {
                "id" => Segment::Id,
                "original" => Segment::Original,
                "name" => Segment::Name,
                "ext" => Segment::Ext,
                "date" => Segment::Date,
                "index" => Segment::Index,
                other => return Err(invalid(&format!("unknown placeholder {{{other}}}"))),
            };
            segments.push(segment);
            last = whole.end();
        }
        if last < template.len() {
            segments.push(Segment::Literal(template[last..].to_string()));
        }

        if segments
            .iter()
            .any(|s| matches!(s, Segment::Literal(text) if text.contains(['{', '}'])))
        {
            return Err(invalid("unbalanced braces"));
        }

        let distinguishing = segments.iter().any(|s| {
            matches!(
                s,
                Segment::Id | Segment::Original | Segment::Name | Segment::Index
            )
        });
        if !distinguishing {
            return Err(invalid(
                "template needs at least one of {id}, {original}, {name}, {index}",
            ));
        }

        Ok(Self {
            segments,
            index_width: DEFAULT_INDEX_WIDTH,
            start_index: DEFAULT_START_INDEX,
        })
    }

    /// Zero-padding width for `{index}`, 1 to 6 digits.
    pub fn with_index_width(mut self, width: usize) -> Result<Self> {
        if !(1..=MAX_INDEX_WIDTH).contains(&width) {
            return Err(Error::InvalidTemplate {
                template: format!("--index-width {width}"),
                reason: format!("index width must be between 1 and {MAX_INDEX_WIDTH}"),
            });
        }
        self.index_width = width;
        Ok(self)
    }

    /// Number given to the first assignment, 1 to 9999.
    pub fn with_start_index(mut self, start: usize) -> Result<Self> {
        if !(1..=MAX_START_INDEX).contains(&start) {
            return Err(Error::InvalidTemplate {
                template: format!("--start-index {start}"),
                reason: format!("start index must be between 1 and {MAX_START_INDEX}"),
            });
        }
        self.start_index = start;
        Ok(self)
    }

    pub fn render(&self, ctx: &RenameContext<'_>) -> String {
        let (name, ext) = split_extension(ctx.original);
        let mut out = String::with_capacity(ctx.original.len() + ctx.id.len() + 8);

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Id => out.push_str(ctx.id),
                Segment::Original => out.push_str(ctx.original),
                Segment::Name => out.push_str(name),
                Segment::Ext => out.push_str(&ext.trim_start_matches('.').to_lowercase()),
                Segment::Date => out.push_str(&ctx.date.format("%Y%m%d").to_string()),
                Segment::Index => {
                    let number = self.start_index + ctx.index;
                    out.push_str(&format!("{:0width$}", number, width = self.index_width))
                }
            }
        }

        out
    }
}

impl Default for NameTemplate {
    fn default() -> Self {
        Self {
            segments: vec![
                Segment::Id,
                Segment::Literal("_".to_string()),
                Segment::Original,
            ],
            index_width: DEFAULT_INDEX_WIDTH,
            start_index: DEFAULT_START_INDEX,
        }
    }
}

// ============================================================================
// Whole Report
// ============================================================================

/// One entry of the assignment stream handed to the copy executor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedRename {
    pub original: String,
    pub new_name: String,
    pub record_id: String,
    pub kind: MatchKind,
    pub score: f64,
}

/// Plan names for every assignment in the report.
///
/// A name that is already taken gets `_2`, `_3`, ... inserted before its
/// extension until it is unique.
pub fn plan_all(
    report: &ReconciliationReport,
    template: &NameTemplate,
    date: NaiveDate,
) -> Vec<PlannedRename> {
    let mut taken: FxHashSet<String> = FxHashSet::default();
    let mut planned = Vec::with_capacity(report.assignments.len());

    let matched = report
        .assignments
        .iter()
        .filter_map(|a| a.record.as_ref().map(|record| (a, record)));

    for (index, (assignment, record)) in matched.enumerate() {
        let ctx = RenameContext {
            id: &record.id,
            original: &assignment.candidate.file_name,
            date,
            index,
        };
        let new_name = disambiguate(template.render(&ctx), &taken);
        taken.insert(new_name.clone());

        planned.push(PlannedRename {
            original: assignment.candidate.file_name.clone(),
            new_name,
            record_id: record.id.clone(),
            kind: assignment.kind,
            score: assignment.score,
        });
    }

    planned
}

fn disambiguate(name: String, taken: &FxHashSet<String>) -> String {
    if !taken.contains(&name) {
        return name;
    }
    let (stem, ext) = split_extension(&name);
    let mut n = 2;
    loop {
        let candidate = format!("{stem}_{n}{ext}");
        if !taken.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
