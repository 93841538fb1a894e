//! Directory scanning: turns directory entries into retention candidates.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use retention::CandidateFile;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

/// What to collect from the target directory.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Only file names starting with this prefix become candidates
    pub prefix: Option<String>,
    /// Descend into subdirectories
    pub recursive: bool,
}

/// Candidates found in a directory plus the entries that had to be skipped.
#[derive(Debug, Default)]
pub struct ScanReport {
    pub candidates: Vec<CandidateFile>,
    /// Recoverable problems (unreadable timestamps or subdirectories)
    pub warnings: Vec<Error>,
    /// Entries left out on purpose: non-regular files and prefix mismatches
    pub ignored: usize,
}

/// Scan `dir` for regular files matching `options`.
///
/// Fails only when `dir` itself is missing, not a directory or unreadable.
/// Symlinks are never followed and never become candidates.
pub fn scan(dir: &Path, options: &ScanOptions) -> Result<ScanReport> {
    check_directory(dir)?;

    let max_depth = if options.recursive { usize::MAX } else { 1 };
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(max_depth)
        .follow_links(false)
        .sort_by_file_name();

    let mut report = ScanReport::default();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().unwrap_or(dir).to_path_buf();
                log::warn!("Skipping unreadable entry {}: {e}", path.display());
                report.warnings.push(Error::Unreadable {
                    path,
                    source: io::Error::from(e),
                });
                continue;
            }
        };

        if !entry.file_type().is_file() {
            log::debug!("Ignoring non-regular entry {}", entry.path().display());
            report.ignored += 1;
            continue;
        }

        if !matches_prefix(entry.file_name(), options.prefix.as_deref()) {
            report.ignored += 1;
            continue;
        }

        match modified_at(&entry) {
            Ok(modified_at) => {
                report
                    .candidates
                    .push(CandidateFile::new(entry.into_path(), modified_at));
            }
            Err(source) => {
                log::warn!(
                    "Skipping {}: cannot read modification time: {source}",
                    entry.path().display()
                );
                report.warnings.push(Error::Timestamp {
                    path: entry.into_path(),
                    source,
                });
            }
        }
    }

    log::debug!(
        "Scanned {}: {} candidate(s), {} ignored, {} warning(s)",
        dir.display(),
        report.candidates.len(),
        report.ignored,
        report.warnings.len()
    );

    Ok(report)
}

fn check_directory(dir: &Path) -> Result<()> {
    let metadata = fs::metadata(dir).map_err(|e| Error::from_dir_io(dir, e))?;
    if !metadata.is_dir() {
        return Err(Error::NotADirectory(dir.to_path_buf()));
    }
    fs::read_dir(dir).map_err(|e| Error::from_dir_io(dir, e))?;
    Ok(())
}

/// Exact, case-sensitive prefix match on the raw file name.
fn matches_prefix(name: &OsStr, prefix: Option<&str>) -> bool {
    prefix.is_none_or(|prefix| name.as_encoded_bytes().starts_with(prefix.as_bytes()))
}

fn modified_at(entry: &DirEntry) -> io::Result<DateTime<Utc>> {
    let modified = entry.metadata().map_err(io::Error::from)?.modified()?;
    Ok(DateTime::<Utc>::from(modified))
}

// ============================================================================
// Tests
// ============================================================================
