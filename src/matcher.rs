//! Exact-then-fuzzy matching of one filename stem against the record set.

use log::debug;

use crate::models::{Candidate, MatchKind, MatchResult, Record, RecordSet, Threshold};
use crate::scoring::{similarity, EXACT_SCORE};

/// Borrowed outcome of [`match_stem`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StemMatch<'a> {
    pub record: Option<&'a Record>,
    pub score: f64,
    pub kind: MatchKind,
}

/// Match a stem against every record title.
///
/// 1. Exact: trimmed stem equals a trimmed title (case-sensitive). Threshold
///    is not consulted.
/// 2. Fuzzy: the first record with the highest score at or above the
///    threshold. A later record only replaces the current best with a
///    strictly greater score, so ties go to the earlier record.
///
/// With no record reaching the threshold the result is `MatchKind::None` and
/// `score` holds the closest score seen.
pub fn match_stem<'a>(stem: &str, records: &'a RecordSet, threshold: Threshold) -> StemMatch<'a> {
    let stem = stem.trim();

    if let Some(record) = records.get_exact(stem) {
        return StemMatch {
            record: Some(record),
            score: EXACT_SCORE,
            kind: MatchKind::Exact,
        };
    }

    let mut best: Option<&Record> = None;
    let mut best_score = 0.0;
    let mut closest = 0.0_f64;

    for record in records {
        let score = similarity(stem, &record.title);
        closest = closest.max(score);
        if score > best_score && score >= threshold.value() {
            best = Some(record);
            best_score = score;
        }
    }

    match best {
        Some(record) => StemMatch {
            record: Some(record),
            score: best_score,
            kind: MatchKind::Fuzzy,
        },
        None => StemMatch {
            record: None,
            score: closest,
            kind: MatchKind::None,
        },
    }
}

/// Match a candidate by its stem and package the owned result.
pub fn match_candidate(
    candidate: &Candidate,
    records: &RecordSet,
    threshold: Threshold,
) -> MatchResult {
    let found = match_stem(&candidate.stem, records, threshold);

    match found.record {
        Some(record) => debug!(
            "{} match ({:.2}): {} -> {}",
            found.kind, found.score, candidate.file_name, record.title
        ),
        None => debug!(
            "no match (closest {:.2}): {}",
            found.score, candidate.file_name
        ),
    }

    MatchResult {
        candidate: candidate.clone(),
        record: found.record.cloned(),
        score: found.score,
        kind: found.kind,
    }
}
