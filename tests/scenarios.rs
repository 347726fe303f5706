use chrono::{Local, TimeZone};
use std::fs;
use tempfile::TempDir;

use title_match::config::RunConfig;
use title_match::executor::{execute, prepare_run_dir};
use title_match::report::{summarize, RunReport};
use title_match::{
    plan, plan_all, reconcile, Candidate, Error, MatchKind, NameTemplate, Record, RecordSet,
    Threshold,
};

fn records(pairs: &[(&str, &str)]) -> RecordSet {
    pairs.iter().map(|(id, title)| Record::new(*id, *title)).collect()
}

fn candidates(names: &[&str]) -> Vec<Candidate> {
    names.iter().map(|n| Candidate::new(*n)).collect()
}

// -------------------------------------------------------------------------
// Single-record scenarios
// -------------------------------------------------------------------------

#[test]
fn exact_title_gets_id_prefix() {
    let report = reconcile(
        &records(&[("001", "Deep Learning Survey")]),
        &candidates(&["Deep Learning Survey.pdf"]),
        Threshold::new(0.6).unwrap(),
    );

    assert_eq!(report.assignments.len(), 1);
    let a = &report.assignments[0];
    assert_eq!(a.kind, MatchKind::Exact);
    assert_eq!(a.score, 1.0);
    assert_eq!(plan(a).as_deref(), Some("001_Deep Learning Survey.pdf"));
}

#[test]
fn close_title_is_fuzzy_match() {
    let report = reconcile(
        &records(&[("002", "Neural Network Basics")]),
        &candidates(&["neural_network_basic.pdf"]),
        Threshold::new(0.5).unwrap(),
    );

    assert_eq!(report.assignments.len(), 1);
    let a = &report.assignments[0];
    assert_eq!(a.kind, MatchKind::Fuzzy);
    assert!(a.score > 0.5 && a.score < 1.0);
    assert_eq!(plan(a).as_deref(), Some("002_neural_network_basic.pdf"));
}

#[test]
fn unrelated_file_and_record_both_unmatched() {
    let report = reconcile(
        &records(&[("003", "Quantum Computing")]),
        &candidates(&["Unrelated Paper.pdf"]),
        Threshold::new(0.6).unwrap(),
    );

    assert!(report.assignments.is_empty());
    assert_eq!(report.unmatched_files, candidates(&["Unrelated Paper.pdf"]));
    let titles: Vec<&str> = report
        .unmatched_records
        .iter()
        .map(|r| r.title.as_str())
        .collect();
    assert_eq!(titles, vec!["Quantum Computing"]);
}

#[test]
fn threshold_below_range_rejected() {
    assert!(matches!(Threshold::new(0.05), Err(Error::InvalidThreshold(v)) if v == 0.05));
    assert!(matches!("0.05".parse::<Threshold>(), Err(Error::InvalidThreshold(_))));
}

// -------------------------------------------------------------------------
// End-to-end run on disk
// -------------------------------------------------------------------------

#[test]
fn full_run_copies_matches_and_reports_the_rest() {
    let root = TempDir::new().unwrap();
    let source = root.path().join("papers");
    fs::create_dir(&source).unwrap();
    for name in [
        "Deep Learning Survey.pdf",
        "neural_network_basic.pdf",
        "Unrelated Paper.pdf",
        "notes.txt",
    ] {
        fs::write(source.join(name), name.as_bytes()).unwrap();
    }
    fs::create_dir(source.join("drafts")).unwrap();

    let records_path = root.path().join("records.csv");
    fs::write(
        &records_path,
        "id,title\n001,Deep Learning Survey\n002,Neural Network Basics\n003,Quantum Computing\n,Missing Id\n",
    )
    .unwrap();

    let mut config = RunConfig::new(&records_path, &source);
    config.threshold = Threshold::new(0.5).unwrap();
    config.list.extensions = Some(vec!["pdf".to_string()]);

    let inputs = config.load_inputs().unwrap();
    assert_eq!(inputs.skipped_records, 1);
    assert_eq!(inputs.candidates.len(), 3);

    let report = reconcile(&inputs.records, &inputs.candidates, config.threshold);
    assert_eq!(
        report.assignments.len() + report.unmatched_files.len(),
        inputs.candidates.len()
    );

    let now = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
    let planned = plan_all(&report, &NameTemplate::default(), now.date_naive());
    let run_dir = prepare_run_dir(&root.path().join("out"), &source, now).unwrap();
    let outcome = execute(&planned, &source, &run_dir, |_| {});

    assert_eq!(outcome.exact, 1);
    assert_eq!(outcome.fuzzy, 1);
    assert!(outcome.failures.is_empty());
    assert_eq!(
        fs::read(run_dir.join("002_neural_network_basic.pdf")).unwrap(),
        b"neural_network_basic.pdf"
    );
    assert!(run_dir.join("001_Deep Learning Survey.pdf").exists());

    let summary = summarize(&report, Some(&outcome));
    assert_eq!(summary.unmatched_files, 1);
    assert_eq!(summary.unmatched_records, 1);
    assert_eq!(summary.copied(), Some(2));

    let run = RunReport::new(config.threshold, &report, planned, Some(&outcome), Some(&run_dir));
    let text = run.render_text();
    assert!(text.contains("Unrelated Paper.pdf"));
    assert!(text.contains("Quantum Computing"));

    // A second run in the same second must not reuse the populated directory
    assert!(matches!(
        prepare_run_dir(&root.path().join("out"), &source, now),
        Err(Error::UnsafeOutput(_))
    ));
}

#[test]
fn record_id_cannot_place_copy_outside_run_dir() {
    let root = TempDir::new().unwrap();
    let source = root.path().join("papers");
    fs::create_dir(&source).unwrap();
    fs::write(source.join("Paper.pdf"), b"paper").unwrap();

    let report = reconcile(
        &records(&[("../../escaped", "Paper")]),
        &candidates(&["Paper.pdf"]),
        Threshold::default(),
    );
    let now = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
    let planned = plan_all(&report, &NameTemplate::default(), now.date_naive());
    assert_eq!(planned[0].new_name, "../../escaped_Paper.pdf");

    let run_dir = prepare_run_dir(&root.path().join("out"), &source, now).unwrap();
    let outcome = execute(&planned, &source, &run_dir, |_| {});

    assert_eq!(outcome.copied(), 0);
    assert_eq!(outcome.failures.len(), 1);
    assert!(!root.path().join("escaped_Paper.pdf").exists());
    assert_eq!(fs::read_dir(&run_dir).unwrap().count(), 0);
}
