use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use log::{info, warn};
use std::path::PathBuf;
use std::time::Instant;

use title_match::config::RunConfig;
use title_match::executor::{execute, prepare_run_dir};
use title_match::listing::{parse_extensions, ListOptions, SortOrder};
use title_match::progress::{
    copy_progress, create_progress_bar, create_spinner, format_duration, log_progress,
    set_log_only,
};
use title_match::reconcile::reconcile_observed;
use title_match::records::{RecordColumns, DEFAULT_ID_COLUMN, DEFAULT_TITLE_COLUMN};
use title_match::rename::{
    plan_all, NameTemplate, DEFAULT_INDEX_WIDTH, DEFAULT_START_INDEX, DEFAULT_TEMPLATE,
};
use title_match::report::{render_preview, RunReport};
use title_match::Threshold;

#[derive(Parser)]
#[command(name = "title-match")]
#[command(about = "Match files to (id, title) records and copy them under id-prefixed names")]
struct Args {
    /// CSV file with the id and title columns
    records: PathBuf,

    /// Directory holding the files to match (not searched recursively)
    source: PathBuf,

    /// Directory that receives the timestamped output folder
    output: PathBuf,

    /// Minimum fuzzy similarity, 0.1 to 1.0
    #[arg(long, default_value_t = Threshold::default())]
    threshold: Threshold,

    #[arg(long, default_value = DEFAULT_ID_COLUMN)]
    id_column: String,

    #[arg(long, default_value = DEFAULT_TITLE_COLUMN)]
    title_column: String,

    /// Only consider these extensions (comma-separated, e.g. "pdf,docx")
    #[arg(long, default_value = "")]
    ext: String,

    /// Order in which files are matched and reported
    #[arg(long, value_enum, default_value_t = SortOrder::Name)]
    sort: SortOrder,

    /// Output name template ({id} {original} {name} {ext} {date} {index})
    #[arg(long, default_value = DEFAULT_TEMPLATE)]
    template: String,

    /// Zero-padding width for {index}, 1 to 6
    #[arg(long, default_value_t = DEFAULT_INDEX_WIDTH)]
    index_width: usize,

    /// Number given to the first file in {index}, 1 to 9999
    #[arg(long, default_value_t = DEFAULT_START_INDEX)]
    start_index: usize,

    /// Print the planned renames without copying anything
    #[arg(long)]
    dry_run: bool,

    /// Write the full report as JSON to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Hide progress bars and log progress lines instead
    #[arg(long)]
    log_only: bool,

    #[arg(long, default_value = "0")]
    workers: usize,

    /// Enable debug logging (every match decision)
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
    set_log_only(args.log_only);

    if args.workers > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(args.workers)
            .build_global()
            .context("Failed to set thread pool size")?;
    }

    let start = Instant::now();

    let mut config = RunConfig::new(&args.records, &args.source);
    config.threshold = args.threshold;
    config.columns = RecordColumns {
        id: args.id_column.clone(),
        title: args.title_column.clone(),
    };
    config.list = ListOptions {
        extensions: parse_extensions(&args.ext),
        sort: args.sort,
    };
    config.template = NameTemplate::parse(&args.template)
        .context("Invalid --template")?
        .with_index_width(args.index_width)
        .context("Invalid --index-width")?
        .with_start_index(args.start_index)
        .context("Invalid --start-index")?;

    info!("Using similarity threshold {}", config.threshold);

    let spinner = create_spinner("Loading records and listing files");
    let inputs = config.load_inputs().context("Failed to load inputs")?;
    spinner.finish_with_message(format!(
        "Loaded {} records, {} files",
        inputs.records.len(),
        inputs.candidates.len()
    ));
    if inputs.skipped_records > 0 {
        warn!(
            "{} record rows skipped (missing id or title)",
            inputs.skipped_records
        );
    }

    let total = inputs.candidates.len() as u64;
    let pb = create_progress_bar(total, "Phase 1: Matching files");
    let report = reconcile_observed(&inputs.records, &inputs.candidates, config.threshold, |_| {
        pb.inc(1);
        log_progress("Matching", pb.position(), total, 100);
    });
    pb.finish_with_message(format!(
        "Phase 1: Matched {} of {} files",
        report.assignments.len(),
        inputs.candidates.len()
    ));

    let now = Local::now();
    let plan = plan_all(&report, &config.template, now.date_naive());

    let run = if args.dry_run {
        println!("\nPlanned renames (dry run):");
        print!("{}", render_preview(&plan));
        RunReport::new(config.threshold, &report, plan, None, None)
    } else {
        let run_dir = prepare_run_dir(&args.output, &config.source_dir, now)
            .context("Failed to prepare output directory")?;

        let pb = create_progress_bar(plan.len() as u64, "Phase 2: Copying files");
        let outcome = execute(
            &plan,
            &config.source_dir,
            &run_dir,
            copy_progress(&pb, plan.len() as u64),
        );
        pb.finish_with_message(format!(
            "Phase 2: Copied {} files ({} failed)",
            outcome.copied(),
            outcome.failures.len()
        ));

        RunReport::new(
            config.threshold,
            &report,
            plan,
            Some(&outcome),
            Some(&run_dir),
        )
    };

    println!();
    print!("{}", run.render_text());
    println!("  Elapsed: {}", format_duration(start.elapsed()));

    if let Some(path) = &args.report {
        let json = run.to_json().context("Failed to serialize report")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report to {:?}", path))?;
        info!("Report written to {:?}", path);
    }

    Ok(())
}
