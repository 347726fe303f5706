//! Run reconciliation at a range of thresholds and compare the outcomes.
//! Usage: threshold-sweep <records.csv> <source_dir> [--from 0.1 --to 1.0 --step 0.1]

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;

use title_match::config::RunConfig;
use title_match::listing::{parse_extensions, ListOptions, SortOrder};
use title_match::reconcile::reconcile;
use title_match::records::{RecordColumns, DEFAULT_ID_COLUMN, DEFAULT_TITLE_COLUMN};
use title_match::report::summarize;
use title_match::Threshold;

#[derive(Parser)]
#[command(name = "threshold-sweep")]
#[command(about = "Compare match counts across similarity thresholds")]
struct Args {
    records: PathBuf,

    source: PathBuf,

    #[arg(long, default_value_t = Threshold::MIN)]
    from: f64,

    #[arg(long, default_value_t = Threshold::MAX)]
    to: f64,

    #[arg(long, default_value_t = 0.1)]
    step: f64,

    #[arg(long, default_value = DEFAULT_ID_COLUMN)]
    id_column: String,

    #[arg(long, default_value = DEFAULT_TITLE_COLUMN)]
    title_column: String,

    /// Only consider these extensions (comma-separated)
    #[arg(long, default_value = "")]
    ext: String,
}

/// Thresholds from `from` to `to` inclusive, rounded to avoid float drift.
fn steps(from: f64, to: f64, step: f64) -> Result<Vec<Threshold>> {
    if step <= 0.0 {
        bail!("--step must be positive, got {}", step);
    }
    let from = Threshold::new(from).context("Invalid --from")?;
    let to = Threshold::new(to).context("Invalid --to")?;
    if from > to {
        bail!("--from ({}) is greater than --to ({})", from, to);
    }

    let count = ((to.value() - from.value()) / step + 1e-9).floor() as usize;
    (0..=count)
        .map(|i| {
            let value = ((from.value() + step * i as f64) * 1000.0).round() / 1000.0;
            Threshold::new(value.min(Threshold::MAX)).context("Invalid threshold step")
        })
        .collect()
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();
    let thresholds = steps(args.from, args.to, args.step)?;

    let mut config = RunConfig::new(&args.records, &args.source);
    config.columns = RecordColumns {
        id: args.id_column,
        title: args.title_column,
    };
    config.list = ListOptions {
        extensions: parse_extensions(&args.ext),
        sort: SortOrder::Name,
    };

    eprintln!("Loading records and listing files...");
    let inputs = config.load_inputs().context("Failed to load inputs")?;
    eprintln!(
        "  {} records, {} files",
        inputs.records.len(),
        inputs.candidates.len()
    );

    let start = Instant::now();

    println!(
        "{:>9}  {:>6}  {:>6}  {:>15}  {:>17}",
        "threshold", "exact", "fuzzy", "unmatched files", "unmatched records"
    );
    println!("{:-<61}", "");
    for threshold in thresholds {
        let report = reconcile(&inputs.records, &inputs.candidates, threshold);
        let s = summarize(&report, None);
        println!(
            "{:>9.2}  {:>6}  {:>6}  {:>15}  {:>17}",
            threshold.value(),
            s.exact,
            s.fuzzy,
            s.unmatched_files,
            s.unmatched_records
        );
    }

    eprintln!("\nDone in {:.2}s", start.elapsed().as_secs_f64());
    Ok(())
}
