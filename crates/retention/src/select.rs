use crate::bucket::Bucket;
use crate::classify::{Classification, Fit, classify};
use crate::types::{CandidateFile, RetentionResult};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

/// Per-bucket winners plus every candidate that lost or never qualified.
#[derive(Debug, Default)]
struct Incumbents {
    slots: BTreeMap<Bucket, (Fit, CandidateFile)>,
    rejected: Vec<CandidateFile>,
}

impl Incumbents {
    fn offer(&mut self, candidate: CandidateFile, now: DateTime<Utc>) {
        match classify(candidate.modified_at, now) {
            Some(classification) => self.contend(classification, candidate),
            None => self.rejected.push(candidate),
        }
    }

    /// Replace the bucket's incumbent only on a strictly better `(fit, path)`.
    fn contend(&mut self, classification: Classification, candidate: CandidateFile) {
        match self.slots.entry(classification.bucket) {
            Entry::Vacant(slot) => {
                slot.insert((classification.fit, candidate));
            }
            Entry::Occupied(mut slot) => {
                let better = {
                    let (fit, incumbent) = slot.get();
                    (classification.fit, &candidate.path) < (*fit, &incumbent.path)
                };
                if better {
                    let (_, loser) = slot.insert((classification.fit, candidate));
                    self.rejected.push(loser);
                } else {
                    self.rejected.push(candidate);
                }
            }
        }
    }

    fn merge(mut self, other: Incumbents) -> Incumbents {
        self.rejected.extend(other.rejected);
        for (bucket, (fit, candidate)) in other.slots {
            self.contend(Classification { bucket, fit }, candidate);
        }
        self
    }

    fn finish(self) -> RetentionResult {
        let keep = self
            .slots
            .into_iter()
            .map(|(bucket, (_, candidate))| (bucket, candidate))
            .collect();
        let mut delete = self.rejected;
        delete.sort_by(|a, b| {
            a.path
                .cmp(&b.path)
                .then_with(|| a.modified_at.cmp(&b.modified_at))
        });
        RetentionResult { keep, delete }
    }
}

/// Partition `candidates` into the keep set and the delete set.
///
/// Each bucket keeps the youngest candidate that has reached its target age;
/// ties on age go to the lexicographically smallest path. The result does not
/// depend on the order of `candidates`.
pub fn select<I>(candidates: I, now: DateTime<Utc>) -> RetentionResult
where
    I: IntoIterator<Item = CandidateFile>,
{
    let mut incumbents = Incumbents::default();
    for candidate in candidates {
        incumbents.offer(candidate, now);
    }
    incumbents.finish()
}

/// Same as [`select`], classifying candidates on the rayon thread pool.
pub fn select_parallel(candidates: Vec<CandidateFile>, now: DateTime<Utc>) -> RetentionResult {
    candidates
        .into_par_iter()
        .fold(Incumbents::default, |mut acc, candidate| {
            acc.offer(candidate, now);
            acc
        })
        .reduce(Incumbents::default, Incumbents::merge)
        .finish()
}
