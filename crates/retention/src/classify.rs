use crate::bucket::{Bucket, SCHEDULE};
use chrono::{DateTime, TimeDelta, Utc};

/// How well a candidate represents its bucket.
///
/// Lower is better: the best representative is the youngest file that has
/// already reached the bucket's target age.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fit(TimeDelta);

impl Fit {
    /// Elapsed time from modification to the reference instant.
    pub fn age(self) -> TimeDelta {
        self.0
    }
}

/// Outcome of classifying a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// Bucket the file is eligible for.
    pub bucket: Bucket,
    /// Score used to pick a winner among files eligible for the same bucket.
    pub fit: Fit,
}

/// Age of a file modified at `modified_at`, measured at `now`.
///
/// Negative when the modification time lies in the future.
pub fn age(modified_at: DateTime<Utc>, now: DateTime<Utc>) -> TimeDelta {
    now.signed_duration_since(modified_at)
}

/// Decide which bucket, if any, a file modified at `modified_at` belongs to.
///
/// Files younger than one day return `None`. Every age of two years or more
/// lands in [`Bucket::Year2`].
pub fn classify(modified_at: DateTime<Utc>, now: DateTime<Utc>) -> Option<Classification> {
    let age = age(modified_at, now);
    SCHEDULE
        .iter()
        .rev()
        .find(|rule| age >= rule.target_age())
        .map(|rule| Classification {
            bucket: rule.bucket,
            fit: Fit(age),
        })
}
