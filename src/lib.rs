// certsweep - Concurrent TLS certificate expiry checker
// Licensed under GPL-3.0

//! certsweep checks, for a list of hosts, whether their TLS server certificate
//! is still valid and how many days remain until expiry. Checks run across a
//! bounded worker pool with per-host timeouts, failure isolation and TTL result
//! caching, and are classified into severity buckets for reporting.

pub mod certificates;
pub mod checker;
pub mod cli;
pub mod error;
pub mod input;
pub mod output;

// Re-export commonly used types
pub use crate::certificates::fetcher::{CertificateFacts, Fetch, FetchOutcome, TlsFetcher};
pub use crate::checker::classify::{Bucket, CheckResult, Status};
pub use crate::checker::summary::{summarize, BatchSummary};
pub use crate::checker::{CancelHandle, CheckParameters, Checker};
pub use crate::cli::Args;
pub use crate::input::{parse_targets, Target};

/// Result type for certsweep operations
pub type Result<T> = anyhow::Result<T>;

/// Error type for certsweep operations
pub use anyhow::Error;
