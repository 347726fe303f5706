//! Copy executor: writes each planned rename into a fresh run directory.
//!
//! A failed copy is recorded and the run moves on to the next file. Only a
//! run directory that cannot be prepared stops the whole batch.

use chrono::{DateTime, Local};
use log::{info, warn};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};
use crate::models::MatchKind;
use crate::rename::PlannedRename;
use crate::safety::validate_run_dir;

pub const RUN_DIR_PREFIX: &str = "renamed_";

/// Progress notifications for the presentation layer.
#[derive(Debug)]
pub enum CopyEvent<'a> {
    Copied {
        rename: &'a PlannedRename,
        target: &'a Path,
    },
    Failed {
        rename: &'a PlannedRename,
        error: &'a io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopyFailure {
    pub original: String,
    pub new_name: String,
    pub error: String,
}

/// Tally of one copy pass. Only successful copies are counted as exact or fuzzy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CopyOutcome {
    pub exact: usize,
    pub fuzzy: usize,
    pub failures: Vec<CopyFailure>,
}

impl CopyOutcome {
    pub fn copied(&self) -> usize {
        self.exact + self.fuzzy
    }
}

/// `renamed_YYYYmmdd_HHMMSS`
pub fn run_dir_name(now: DateTime<Local>) -> String {
    format!("{}{}", RUN_DIR_PREFIX, now.format("%Y%m%d_%H%M%S"))
}

/// Create the timestamped run directory under `output_root`.
pub fn prepare_run_dir(
    output_root: &Path,
    source_dir: &Path,
    now: DateTime<Local>,
) -> Result<PathBuf> {
    let run_dir = output_root.join(run_dir_name(now));
    validate_run_dir(&run_dir, source_dir)?;

    fs::create_dir_all(&run_dir).map_err(|source| Error::OutputDir {
        path: run_dir.clone(),
        source,
    })?;

    info!("Created output directory: {:?}", run_dir);
    Ok(run_dir)
}

/// Copy every planned file from `source_dir` to `run_dir` under its new name.
///
/// Existing targets are never overwritten, and a new name that is not a
/// single plain filename is refused. Both count as failures.
pub fn execute<F>(
    plan: &[PlannedRename],
    source_dir: &Path,
    run_dir: &Path,
    mut observer: F,
) -> CopyOutcome
where
    F: FnMut(CopyEvent<'_>),
{
    let mut outcome = CopyOutcome::default();

    for rename in plan {
        let source = source_dir.join(&rename.original);
        let copied = target_in(run_dir, &rename.new_name)
            .and_then(|target| copy_new(&source, &target).map(|()| target));

        match copied {
            Ok(target) => {
                match rename.kind {
                    MatchKind::Exact => {
                        info!("exact match: {} -> {}", rename.original, rename.new_name);
                        outcome.exact += 1;
                    }
                    MatchKind::Fuzzy => {
                        info!(
                            "fuzzy match ({:.2}): {} -> {}",
                            rename.score, rename.original, rename.new_name
                        );
                        outcome.fuzzy += 1;
                    }
                    MatchKind::None => {}
                }
                observer(CopyEvent::Copied {
                    rename,
                    target: &target,
                });
            }
            Err(error) => {
                warn!("failed to copy {}: {}", rename.original, error);
                observer(CopyEvent::Failed {
                    rename,
                    error: &error,
                });
                outcome.failures.push(CopyFailure {
                    original: rename.original.clone(),
                    new_name: rename.new_name.clone(),
                    error: error.to_string(),
                });
            }
        }
    }

    outcome
}

/// `run_dir/name`, provided `name` cannot step outside `run_dir`.
fn target_in(run_dir: &Path, name: &str) -> io::Result<PathBuf> {
    let mut components = Path::new(name).components();
    let plain = !name.contains(['/', '\\'])
        && matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );
    if !plain {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{name:?} is not a plain file name"),
        ));
    }
    Ok(run_dir.join(name))
}

fn copy_new(source: &Path, target: &Path) -> io::Result<()> {
    if target.exists() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} already exists", target.display()),
        ));
    }
    fs::copy(source, target).map(|_| ())
}
