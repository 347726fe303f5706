//! Safety checks that keep the copy step away from the source files.
//!
//! Copies always go to a fresh run directory. These checks make sure that
//! directory can never be the source directory and never already holds files
//! that a copy could clobber.

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Validates that a run directory is safe to copy into.
///
/// Checks:
/// - The run directory cannot be the source directory
/// - The run directory, if it already exists, must be empty
///
/// # Arguments
/// * `run_dir` - Directory that will receive the renamed copies
/// * `source_dir` - Directory the candidates were listed from
///
/// # Returns
/// * `Ok(())` if the run directory is safe
/// * `Err(Error::UnsafeOutput)` with a descriptive message if a check fails
pub fn validate_run_dir(run_dir: &Path, source_dir: &Path) -> Result<()> {
    if same_dir(run_dir, source_dir) {
        return Err(Error::UnsafeOutput(format!(
            "output '{}' cannot be the same as source '{}'",
            run_dir.display(),
            source_dir.display()
        )));
    }

    if run_dir.is_dir() {
        let mut entries = fs::read_dir(run_dir)?;
        if entries.next().is_some() {
            return Err(Error::UnsafeOutput(format!(
                "output '{}' already exists and is not empty",
                run_dir.display()
            )));
        }
    } else if run_dir.exists() {
        return Err(Error::UnsafeOutput(format!(
            "output '{}' exists and is not a directory",
            run_dir.display()
        )));
    }

    Ok(())
}

/// Compare two directories, resolving symlinks and `..` when both exist.
fn same_dir(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_fresh_run_dir_is_safe() {
        let root = TempDir::new().unwrap();
        let source = root.path().join("source");
        fs::create_dir(&source).unwrap();
        let run_dir = root.path().join("out").join("renamed_20240101_000000");
        assert!(validate_run_dir(&run_dir, &source).is_ok());
    }

    #[test]
    fn test_empty_existing_run_dir_is_safe() {
        let root = TempDir::new().unwrap();
        let run_dir = root.path().join("out");
        fs::create_dir(&run_dir).unwrap();
        assert!(validate_run_dir(&run_dir, &root.path().join("source")).is_ok());
    }

    #[test]
    fn test_run_dir_equals_source() {
        let root = TempDir::new().unwrap();
        let source = root.path().join("source");
        fs::create_dir(&source).unwrap();
        let aliased = source.join("..").join("source");

        let result = validate_run_dir(&aliased, &source);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("cannot be the same as source"));
    }

    #[test]
    fn test_non_empty_run_dir_blocked() {
        let root = TempDir::new().unwrap();
        let run_dir = root.path().join("out");
        fs::create_dir(&run_dir).unwrap();
        fs::write(run_dir.join("001_paper.pdf"), b"x").unwrap();

        let result = validate_run_dir(&run_dir, &root.path().join("source"));
        assert!(result.unwrap_err().to_string().contains("not empty"));
    }

    #[test]
    fn test_run_dir_is_file_blocked() {
        let root = TempDir::new().unwrap();
        let run_dir = root.path().join("out");
        fs::write(&run_dir, b"x").unwrap();
        assert!(validate_run_dir(&run_dir, &root.path().join("source")).is_err());
    }
}
