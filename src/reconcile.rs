//! Batch reconciliation of candidates against records.
//!
//! Every candidate is matched exactly once. Assignments, unmatched files and
//! the set of matched titles are all derived from that single table of
//! results, so the two unmatched sets can never disagree with each other.

use log::info;
use rayon::prelude::*;
use rustc_hash::FxHashSet;

use crate::matcher::match_candidate;
use crate::models::{Candidate, MatchResult, ReconciliationReport, RecordSet, Threshold};

/// Reconcile candidates against records.
///
/// Candidates keep the order they were supplied in; sort them first if the
/// report order matters.
pub fn reconcile(
    records: &RecordSet,
    candidates: &[Candidate],
    threshold: Threshold,
) -> ReconciliationReport {
    reconcile_observed(records, candidates, threshold, |_| {})
}

/// Same as [`reconcile`], calling `observer` once per matched-or-not candidate.
///
/// Matching runs in parallel, so the observer sees candidates in no
/// particular order and must be `Sync`. The returned report is always in
/// candidate order.
pub fn reconcile_observed<F>(
    records: &RecordSet,
    candidates: &[Candidate],
    threshold: Threshold,
    observer: F,
) -> ReconciliationReport
where
    F: Fn(&MatchResult) + Sync,
{
    info!(
        "Matching {} files against {} records (threshold {})",
        candidates.len(),
        records.len(),
        threshold
    );

    let results: Vec<MatchResult> = candidates
        .par_iter()
        .map(|candidate| {
            let result = match_candidate(candidate, records, threshold);
            observer(&result);
            result
        })
        .collect();

    build_report(records, results)
}

/// Split resolved results into the report's three collections.
fn build_report(records: &RecordSet, results: Vec<MatchResult>) -> ReconciliationReport {
    let matched_titles: FxHashSet<String> = results
        .iter()
        .filter_map(|r| r.record.as_ref().map(|rec| rec.title.clone()))
        .collect();

    let (assignments, unmatched): (Vec<MatchResult>, Vec<MatchResult>) =
        results.into_iter().partition(MatchResult::is_match);

    let unmatched_records = records
        .iter()
        .filter(|r| !matched_titles.contains(&r.title))
        .cloned()
        .collect();

    ReconciliationReport {
        assignments,
        unmatched_files: unmatched.into_iter().map(|r| r.candidate).collect(),
        unmatched_records,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MatchKind, Record};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn records(pairs: &[(&str, &str)]) -> RecordSet {
        pairs.iter().map(|(id, title)| Record::new(*id, *title)).collect()
    }

    fn candidates(names: &[&str]) -> Vec<Candidate> {
        names.iter().map(|n| Candidate::new(*n)).collect()
    }

    fn threshold(v: f64) -> Threshold {
        Threshold::new(v).unwrap()
    }

    #[test]
    fn test_exact_scenario() {
        let report = reconcile(
            &records(&[("001", "Deep Learning Survey")]),
            &candidates(&["Deep Learning Survey.pdf"]),
            threshold(0.6),
        );
        assert_eq!(report.assignments.len(), 1);
        assert_eq!(report.assignments[0].kind, MatchKind::Exact);
        assert!(report.unmatched_files.is_empty());
        assert!(report.unmatched_records.is_empty());
    }

    #[test]
    fn test_unmatched_scenario() {
        let report = reconcile(
            &records(&[("003", "Quantum Computing")]),
            &candidates(&["Unrelated Paper.pdf"]),
            threshold(0.6),
        );
        assert!(report.assignments.is_empty());
        assert_eq!(report.unmatched_files, candidates(&["Unrelated Paper.pdf"]));
        assert_eq!(report.unmatched_records, vec![Record::new("003", "Quantum Computing")]);
    }

    #[test]
    fn test_counts_add_up_and_order_is_kept() {
        let set = records(&[
            ("001", "Deep Learning Survey"),
            ("002", "Neural Network Basics"),
            ("003", "Quantum Computing"),
        ]);
        let files = candidates(&[
            "zzz.txt",
            "neural_network_basic.pdf",
            "Deep Learning Survey.pdf",
            "notes",
            "deep learning survey (1).pdf",
        ]);
        let report = reconcile(&set, &files, threshold(0.5));

        assert_eq!(
            report.assignments.len() + report.unmatched_files.len(),
            files.len()
        );
        let assigned: Vec<&str> = report
            .assignments
            .iter()
            .map(|a| a.candidate.file_name.as_str())
            .collect();
        assert_eq!(
            assigned,
            vec![
                "neural_network_basic.pdf",
                "Deep Learning Survey.pdf",
                "deep learning survey (1).pdf"
            ]
        );
        assert_eq!(report.unmatched_files, candidates(&["zzz.txt", "notes"]));
        assert_eq!(report.unmatched_records, vec![Record::new("003", "Quantum Computing")]);
    }

    #[test]
    fn test_unmatched_records_disjoint_from_matched_titles() {
        let set = records(&[("1", "Alpha Paper"), ("2", "Beta Paper"), ("3", "Gamma Study")]);
        let files = candidates(&["alpha paper.pdf", "Alpha Paper.docx"]);
        let report = reconcile(&set, &files, threshold(0.9));

        let matched: FxHashSet<&str> = report
            .assignments
            .iter()
            .filter_map(|a| a.record.as_ref().map(|r| r.title.as_str()))
            .collect();
        assert!(report
            .unmatched_records
            .iter()
            .all(|r| !matched.contains(r.title.as_str())));
        assert_eq!(report.unmatched_records.len(), 2);
    }

    #[test]
    fn test_idempotent() {
        let set = records(&[("1", "Alpha Paper"), ("2", "Beta Paper")]);
        let files = candidates(&["alpha.pdf", "beta paper.pdf", "other.pdf"]);
        let first = reconcile(&set, &files, threshold(0.5));
        let second = reconcile(&set, &files, threshold(0.5));
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_inputs() {
        let report = reconcile(&RecordSet::default(), &[], threshold(0.6));
        assert_eq!(report, ReconciliationReport::default());

        let report = reconcile(&RecordSet::default(), &candidates(&["a.pdf"]), threshold(0.6));
        assert_eq!(report.unmatched_files.len(), 1);
    }

    #[test]
    fn test_observer_sees_every_candidate() {
        let seen = AtomicUsize::new(0);
        let files = candidates(&["a.pdf", "b.pdf", "c.pdf"]);
        reconcile_observed(&records(&[("1", "a")]), &files, threshold(0.6), |_| {
            seen.fetch_add(1, Ordering::Relaxed);
        });
        assert_eq!(seen.load(Ordering::Relaxed), 3);
    }
}
