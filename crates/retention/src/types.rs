use crate::bucket::Bucket;
use crate::classify;
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A file under consideration for retention.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CandidateFile {
    /// Path to the file, unique within a scan
    pub path: PathBuf,
    /// Last modification time
    pub modified_at: DateTime<Utc>,
}

impl CandidateFile {
    /// Create a new CandidateFile
    pub fn new(path: impl Into<PathBuf>, modified_at: DateTime<Utc>) -> Self {
        Self {
            path: path.into(),
            modified_at,
        }
    }

    /// Age of the file at `now`
    pub fn age(&self, now: DateTime<Utc>) -> TimeDelta {
        classify::age(self.modified_at, now)
    }
}

/// Partition of the candidates into files to keep and files to delete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RetentionResult {
    /// The representative chosen for each bucket that had an eligible file
    pub keep: BTreeMap<Bucket, CandidateFile>,
    /// Every other candidate, sorted by path
    pub delete: Vec<CandidateFile>,
}

impl RetentionResult {
    /// Returns true if `path` was chosen by some bucket
    pub fn is_kept(&self, path: &Path) -> bool {
        self.keep.values().any(|f| f.path == path)
    }

    /// Bucket that kept `path`, if any
    pub fn bucket_of(&self, path: &Path) -> Option<Bucket> {
        self.keep
            .iter()
            .find(|(_, f)| f.path == path)
            .map(|(bucket, _)| *bucket)
    }

    /// Kept files, youngest bucket first
    pub fn kept(&self) -> impl Iterator<Item = &CandidateFile> {
        self.keep.values()
    }

    /// Total number of candidates that went through selection
    pub fn total(&self) -> usize {
        self.keep.len() + self.delete.len()
    }

    /// Returns true if nothing would be deleted
    pub fn is_noop(&self) -> bool {
        self.delete.is_empty()
    }
}
