//! Removal of the files the retention selector did not keep.

use crate::error::Error;
use retention::CandidateFile;
use std::fs;
use std::path::PathBuf;

/// Result of a prune pass.
///
/// Modeled on a bulk operation result: every file is attempted, failures are
/// collected instead of aborting the batch.
#[derive(Debug, Default)]
pub struct PruneReport {
    /// Files removed (or that would be removed in a dry run)
    pub removed: Vec<PathBuf>,
    /// Total bytes affected
    pub bytes: u64,
    /// Files that could not be removed
    pub errors: Vec<Error>,
    pub dry_run: bool,
}

impl PruneReport {
    fn add_success(&mut self, path: PathBuf, bytes: u64) {
        self.removed.push(path);
        self.bytes += bytes;
    }

    fn add_failure(&mut self, error: Error) {
        self.errors.push(error);
    }

    /// Number of files that failed
    pub fn failed(&self) -> usize {
        self.errors.len()
    }

    /// Check if all removals succeeded
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Total files attempted
    pub fn total(&self) -> usize {
        self.removed.len() + self.errors.len()
    }
}

/// Remove every file in `files`, or only record them when `dry_run` is set.
pub fn prune(files: &[CandidateFile], dry_run: bool) -> PruneReport {
    let mut report = PruneReport {
        dry_run,
        ..PruneReport::default()
    };

    for file in files {
        let bytes = fs::symlink_metadata(&file.path)
            .map(|m| m.len())
            .unwrap_or(0);

        if dry_run {
            log::info!("Would remove {}", file.path.display());
            report.add_success(file.path.clone(), bytes);
            continue;
        }

        match fs::remove_file(&file.path) {
            Ok(()) => {
                log::info!("Removed {}", file.path.display());
                report.add_success(file.path.clone(), bytes);
            }
            Err(source) => {
                log::warn!("Failed to remove {}: {source}", file.path.display());
                report.add_failure(Error::Deletion {
                    path: file.path.clone(),
                    source,
                });
            }
        }
    }

    report
}

// ============================================================================
// Tests
// ============================================================================
