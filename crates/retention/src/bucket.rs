use chrono::TimeDelta;
use serde::Serialize;
use std::fmt;

/// A fixed retention slot keyed by relative age.
///
/// Variants are declared youngest first, so the derived `Ord` sorts buckets
/// from `Day1` to `Year2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    /// The copy from one day ago.
    Day1,
    /// The copy from one week ago.
    Week1,
    /// The copy from one month ago.
    Month1,
    /// The copy from one year ago.
    Year1,
    /// The copy from two years ago or older.
    Year2,
}

impl Bucket {
    /// All buckets, youngest first.
    pub const ALL: [Bucket; 5] = [
        Bucket::Day1,
        Bucket::Week1,
        Bucket::Month1,
        Bucket::Year1,
        Bucket::Year2,
    ];

    /// The schedule row describing this bucket.
    pub fn rule(self) -> &'static BucketRule {
        &SCHEDULE[self as usize]
    }

    /// Minimum age a file must have reached to represent this bucket.
    pub fn target_age(self) -> TimeDelta {
        self.rule().target_age()
    }

    /// Human-readable name, e.g. "1 week".
    pub fn label(self) -> &'static str {
        match self {
            Bucket::Day1 => "1 day",
            Bucket::Week1 => "1 week",
            Bucket::Month1 => "1 month",
            Bucket::Year1 => "1 year",
            Bucket::Year2 => "2 years",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of the retention schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketRule {
    /// Bucket this row describes.
    pub bucket: Bucket,
    /// Inclusive lower bound of the bucket's age range, in whole days.
    pub target_days: i64,
}

impl BucketRule {
    /// Target age as a duration.
    pub fn target_age(&self) -> TimeDelta {
        TimeDelta::days(self.target_days)
    }
}

/// The retention schedule, youngest bucket first.
///
/// Each bucket covers `[target_days, next.target_days)`; the last row has no
/// upper bound.
pub static SCHEDULE: [BucketRule; 5] = [
    BucketRule {
        bucket: Bucket::Day1,
        target_days: 1,
    },
    BucketRule {
        bucket: Bucket::Week1,
        target_days: 7,
    },
    BucketRule {
        bucket: Bucket::Month1,
        target_days: 30,
    },
    BucketRule {
        bucket: Bucket::Year1,
        target_days: 365,
    },
    BucketRule {
        bucket: Bucket::Year2,
        target_days: 730,
    },
];
