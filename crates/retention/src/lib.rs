//! # retention
//!
//! Age-bucket retention selection for directories of timestamped backups.
//!
//! Given a set of files and a reference instant, the selector keeps one
//! representative per bucket and marks every other file for deletion:
//!
//! | Bucket   | Eligible ages         |
//! |----------|-----------------------|
//! | `Day1`   | 1 day .. 7 days       |
//! | `Week1`  | 7 days .. 30 days     |
//! | `Month1` | 30 days .. 365 days   |
//! | `Year1`  | 365 days .. 730 days  |
//! | `Year2`  | 730 days and older    |
//!
//! Lower bounds are inclusive. Within a bucket the youngest eligible file
//! wins, i.e. the latest copy that is already at least the bucket's age.
//! Files younger than one day are never kept.
//!
//! ## Purity
//!
//! This crate never touches the filesystem. The caller scans, supplies the
//! reference time, and acts on [`RetentionResult::delete`].
//!
//! ## Example
//!
//! ```
//! use chrono::{TimeDelta, Utc};
//! use retention::{Bucket, CandidateFile, select};
//!
//! let now = Utc::now();
//! let files = vec![
//!     CandidateFile::new("backup-a.tar", now - TimeDelta::hours(30)),
//!     CandidateFile::new("backup-b.tar", now - TimeDelta::days(3)),
//!     CandidateFile::new("backup-c.tar", now - TimeDelta::hours(2)),
//! ];
//!
//! let result = select(files, now);
//! assert_eq!(result.keep[&Bucket::Day1].path.to_str(), Some("backup-a.tar"));
//! assert_eq!(result.delete.len(), 2);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

/// The fixed bucket schedule.
pub mod bucket;
/// Per-file age classification.
pub mod classify;
/// Bucket contention and the keep/delete partition.
pub mod select;
/// Candidate and result types.
pub mod types;

pub use bucket::{Bucket, BucketRule, SCHEDULE};
pub use classify::{Classification, Fit, classify};
pub use select::{select, select_parallel};
pub use types::{CandidateFile, RetentionResult};
