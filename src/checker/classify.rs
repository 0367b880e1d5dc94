// Evaluator/Classifier - Turn fetch outcomes into statuses and expiry buckets

use crate::certificates::fetcher::FetchOutcome;
use crate::checker::CheckParameters;
use crate::input::Target;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-target check status, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Ok,
    Warn,
    Expired,
    Error,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Ok => "OK",
            Status::Warn => "WARN",
            Status::Expired => "EXPIRED",
            Status::Error => "ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Coarse days-to-expiry range for histogram reporting.
///
/// Bucketing is independent of status: a WARN target with 10 days left still
/// lands in "8-30". Declaration order doubles as display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Bucket {
    #[serde(rename = "expired")]
    Expired,
    #[serde(rename = "0-7")]
    Days0To7,
    #[serde(rename = "8-30")]
    Days8To30,
    #[serde(rename = "31-90")]
    Days31To90,
    #[serde(rename = ">90")]
    Over90,
    #[serde(rename = "unknown")]
    Unknown,
}

impl Bucket {
    pub const ALL: [Bucket; 6] = [
        Bucket::Expired,
        Bucket::Days0To7,
        Bucket::Days8To30,
        Bucket::Days31To90,
        Bucket::Over90,
        Bucket::Unknown,
    ];

    pub fn from_days(days_remaining: i64) -> Self {
        match days_remaining {
            d if d < 0 => Bucket::Expired,
            0..=7 => Bucket::Days0To7,
            8..=30 => Bucket::Days8To30,
            31..=90 => Bucket::Days31To90,
            _ => Bucket::Over90,
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Bucket::Expired => "expired",
            Bucket::Days0To7 => "0-7",
            Bucket::Days8To30 => "8-30",
            Bucket::Days31To90 => "31-90",
            Bucket::Over90 => ">90",
            Bucket::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

/// Final user-visible record for one target.
///
/// Field names are stable and consumed verbatim by the JSON/CSV export layer:
/// `hostname`, `port`, `status`, `days_remaining`, `bucket`, `detail`, `expiry`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    #[serde(flatten)]
    pub target: Target,
    pub status: Status,
    pub days_remaining: Option<i64>,
    pub bucket: Bucket,
    pub detail: String,
    pub expiry: Option<DateTime<Utc>>,
}

/// Classify one fetch outcome against the check parameters.
///
/// `now` is captured once per batch, not per target, so every result of a run
/// is evaluated against the same reference instant. Days remaining uses a
/// floor division: a certificate that expired twelve hours ago is on day -1,
/// never day 0.
pub fn classify(
    target: &Target,
    outcome: &FetchOutcome,
    params: &CheckParameters,
    now: DateTime<Utc>,
) -> CheckResult {
    match outcome {
        FetchOutcome::Failure(err) => CheckResult {
            target: target.clone(),
            status: Status::Error,
            days_remaining: None,
            bucket: Bucket::Unknown,
            detail: err.to_string(),
            expiry: None,
        },
        FetchOutcome::Success(facts) => {
            let remaining_secs = facts.not_after.signed_duration_since(now).num_seconds();
            let days_remaining = remaining_secs.div_euclid(86_400);

            let status = if days_remaining < 0 {
                Status::Expired
            } else if days_remaining <= params.warn_threshold_days {
                Status::Warn
            } else {
                Status::Ok
            };

            CheckResult {
                target: target.clone(),
                status,
                days_remaining: Some(days_remaining),
                bucket: Bucket::from_days(days_remaining),
                detail: String::new(),
                expiry: Some(facts.not_after),
            }
        }
    }
}
