// Aggregator - Summary counts and bucket histogram over a result set

use crate::checker::classify::{Bucket, CheckResult, Status};
use serde::Serialize;
use std::collections::BTreeMap;

/// Folded view of one batch run.
///
/// EXPIRED keeps its own counter rather than folding into `error`: an expired
/// certificate is a stronger condition than WARN and must not disappear inside
/// a generic failure count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub ok: usize,
    pub warn: usize,
    pub expired: usize,
    pub error: usize,
    pub bucket_counts: BTreeMap<Bucket, usize>,
}

/// Pure fold over the results of a run; recomputable at any time.
pub fn summarize(results: &[CheckResult]) -> BatchSummary {
    let mut summary = BatchSummary::default();

    for result in results {
        summary.total += 1;
        match result.status {
            Status::Ok => summary.ok += 1,
            Status::Warn => summary.warn += 1,
            Status::Expired => summary.expired += 1,
            Status::Error => summary.error += 1,
        }
        *summary.bucket_counts.entry(result.bucket).or_insert(0) += 1;
    }

    summary
}
