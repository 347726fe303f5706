//! Candidate discovery: one directory level, regular files only.

use log::{debug, warn};
use std::fs;
use std::path::Path;
use std::time::SystemTime;

use crate::error::{Error, Result};
use crate::models::Candidate;

/// Order applied to the directory listing before matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SortOrder {
    /// Whatever order the filesystem returns
    Listing,
    /// File name, case-insensitive, A to Z
    #[default]
    Name,
    /// File name, case-insensitive, Z to A
    NameDesc,
    /// Modification time, oldest first
    Modified,
    /// Modification time, newest first
    ModifiedDesc,
    /// File size, smallest first
    Size,
    /// File size, largest first
    SizeDesc,
}

#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Lower-case extensions without the dot; `None` accepts every file.
    pub extensions: Option<Vec<String>>,
    pub sort: SortOrder,
}

/// Parse a comma-separated extension list such as `"pdf, .DOCX"`.
///
/// An empty list means no filtering.
pub fn parse_extensions(exts: &str) -> Option<Vec<String>> {
    let parsed: Vec<String> = exts
        .split(',')
        .map(|s| s.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .collect();
    if parsed.is_empty() {
        None
    } else {
        Some(parsed)
    }
}

struct Listed {
    candidate: Candidate,
    modified: SystemTime,
    size: u64,
}

/// List the files directly inside `dir` as candidates.
///
/// Subdirectories are not entered. Entries whose names are not valid UTF-8
/// or whose metadata cannot be read are skipped with a warning.
pub fn list_candidates(dir: &Path, options: &ListOptions) -> Result<Vec<Candidate>> {
    let entries = fs::read_dir(dir).map_err(|source| Error::SourceDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut listed = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("Skipping unreadable entry in {:?}: {}", dir, e);
                continue;
            }
        };
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let Some(file_name) = entry.file_name().to_str().map(str::to_string) else {
            warn!("Skipping non UTF-8 file name: {:?}", entry.file_name());
            continue;
        };

        let candidate = Candidate::new(file_name);
        if !accepts(&candidate, options.extensions.as_deref()) {
            continue;
        }

        let metadata = match fs::metadata(&path) {
            Ok(m) => m,
            Err(e) => {
                warn!("Skipping {:?}: {}", path, e);
                continue;
            }
        };

        listed.push(Listed {
            candidate,
            modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
            size: metadata.len(),
        });
    }

    sort_listed(&mut listed, options.sort);
    debug!("Listed {} candidate files in {:?}", listed.len(), dir);

    Ok(listed.into_iter().map(|l| l.candidate).collect())
}

fn accepts(candidate: &Candidate, extensions: Option<&[String]>) -> bool {
    match extensions {
        None => true,
        Some(exts) => {
            let ext = candidate.extension.trim_start_matches('.').to_ascii_lowercase();
            !ext.is_empty() && exts.contains(&ext)
        }
    }
}

fn sort_listed(listed: &mut [Listed], order: SortOrder) {
    let name_key = |l: &Listed| l.candidate.file_name.to_lowercase();
    match order {
        SortOrder::Listing => {}
        SortOrder::Name => listed.sort_by_cached_key(name_key),
        SortOrder::NameDesc => {
            listed.sort_by_cached_key(name_key);
            listed.reverse();
        }
        SortOrder::Modified => listed.sort_by(|a, b| {
            a.modified
                .cmp(&b.modified)
                .then_with(|| a.candidate.file_name.cmp(&b.candidate.file_name))
        }),
        SortOrder::ModifiedDesc => listed.sort_by(|a, b| {
            b.modified
                .cmp(&a.modified)
                .then_with(|| a.candidate.file_name.cmp(&b.candidate.file_name))
        }),
        SortOrder::Size => listed.sort_by(|a, b| {
            a.size
                .cmp(&b.size)
                .then_with(|| a.candidate.file_name.cmp(&b.candidate.file_name))
        }),
        SortOrder::SizeDesc => listed.sort_by(|a, b| {
            b.size
                .cmp(&a.size)
                .then_with(|| a.candidate.file_name.cmp(&b.candidate.file_name))
        }),
    }
}
