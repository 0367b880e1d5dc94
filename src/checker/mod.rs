// Checker module - Concurrency coordinator for batch certificate checks

pub mod cache;
pub mod classify;
pub mod summary;

use crate::certificates::fetcher::{Fetch, TlsFetcher};
use crate::checker::cache::ResultCache;
use crate::checker::classify::{classify, CheckResult};
use crate::error::FetchError;
use crate::input::Target;
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Parameters of one batch run.
#[derive(Debug, Clone)]
pub struct CheckParameters {
    /// Warn when days remaining is at or below this value
    pub warn_threshold_days: i64,
    /// Per-target budget for the combined connect + handshake
    pub connect_timeout: Duration,
    /// Worker pool size (not derived from host CPU count)
    pub concurrency: usize,
}

impl Default for CheckParameters {
    fn default() -> Self {
        Self {
            warn_threshold_days: 15,
            connect_timeout: Duration::from_secs(5),
            concurrency: 10,
        }
    }
}

/// Cooperative cancellation signal for a running batch.
///
/// After `cancel()`, no new targets are dispatched; in-flight fetches finish
/// or hit their own timeout, and completed results are still returned.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Batch check engine: dispatches targets through the cache and fetcher across
/// a bounded worker pool, classifying each outcome into a [`CheckResult`].
pub struct Checker {
    fetcher: Arc<dyn Fetch>,
    cache: Arc<ResultCache>,
    progress: bool,
}

impl Checker {
    /// Checker with the production TLS fetcher and a fresh cache.
    pub fn new(cache_ttl: Duration) -> Self {
        Self::with_fetcher(Arc::new(TlsFetcher), Arc::new(ResultCache::new(cache_ttl)))
    }

    /// Checker over an injected fetcher and cache. Tests use this to run
    /// batches without touching the network; callers can also share one cache
    /// across consecutive runs.
    pub fn with_fetcher(fetcher: Arc<dyn Fetch>, cache: Arc<ResultCache>) -> Self {
        Self {
            fetcher,
            cache,
            progress: false,
        }
    }

    /// Show a terminal progress bar while the batch runs.
    pub fn show_progress(mut self, enabled: bool) -> Self {
        self.progress = enabled;
        self
    }

    pub fn cache(&self) -> &Arc<ResultCache> {
        &self.cache
    }

    /// Run the full batch to completion, one result per target.
    ///
    /// Completion order is unordered; the returned set is deterministic in
    /// content. A single target's failure never aborts the batch.
    pub async fn run_batch(&self, targets: &[Target], params: &CheckParameters) -> Vec<CheckResult> {
        self.run_batch_with_cancel(targets, params, &CancelHandle::new())
            .await
    }

    /// Run a batch under a cancellation handle. Targets not yet dispatched
    /// when `cancel` fires are skipped; their results are simply absent.
    pub async fn run_batch_with_cancel(
        &self,
        targets: &[Target],
        params: &CheckParameters,
        cancel: &CancelHandle,
    ) -> Vec<CheckResult> {
        // One reference instant per run so every target is classified against
        // the same `now` and bucket assignment is reproducible within the run.
        let now = Utc::now();

        info!(
            targets = targets.len(),
            concurrency = params.concurrency,
            "starting batch check"
        );

        let pb = if self.progress && !targets.is_empty() {
            let pb = ProgressBar::new(targets.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
                    .expect("Invalid template")
                    .progress_chars("=>-"),
            );
            Some(pb)
        } else {
            None
        };

        let semaphore = Arc::new(Semaphore::new(params.concurrency.max(1)));
        let mut tasks = Vec::with_capacity(targets.len());

        for target in targets {
            let target = target.clone();
            let semaphore = Arc::clone(&semaphore);
            let fetcher = Arc::clone(&self.fetcher);
            let cache = Arc::clone(&self.cache);
            let cancel = cancel.clone();
            let params = params.clone();

            let task = tokio::spawn({
                let target = target.clone();
                async move {
                    let _permit = semaphore.acquire().await.expect("semaphore closed");

                    // Dispatch gate: nothing new starts once cancellation is
                    // requested, but whatever already holds a connection runs on.
                    if cancel.is_cancelled() {
                        debug!(%target, "skipped, batch cancelled");
                        return None;
                    }

                    let outcome = cache
                        .get_or_fetch(&target, params.connect_timeout, || {
                            fetcher.fetch(&target, params.connect_timeout)
                        })
                        .await;

                    let result = classify(&target, &outcome, &params, now);
                    debug!(%target, status = %result.status, "target checked");
                    Some(result)
                }
            });

            tasks.push((target, task));
        }

        let mut results = Vec::with_capacity(tasks.len());
        for (target, task) in tasks {
            match task.await {
                Ok(Some(result)) => results.push(result),
                Ok(None) => {}
                Err(e) => {
                    // A panicking worker must not take the batch down with it;
                    // surface the target as an ERROR record instead.
                    warn!(%target, error = %e, "worker task failed");
                    let outcome = crate::certificates::fetcher::FetchOutcome::Failure(
                        FetchError::Unknown(format!("worker task failed: {}", e)),
                    );
                    results.push(classify(&target, &outcome, params, now));
                }
            }
            if let Some(pb) = &pb {
                pb.inc(1);
            }
        }

        if let Some(pb) = &pb {
            pb.finish_and_clear();
        }

        info!(results = results.len(), "batch check complete");
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::certificates::fetcher::{CertificateFacts, FetchOutcome};
    use crate::checker::classify::Status;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::AtomicUsize;

    /// Mock fetcher backed by a host -> outcome table.
    struct TableFetcher {
        outcomes: HashMap<String, FetchOutcome>,
        calls: AtomicUsize,
        delay: Duration,
    }

    impl TableFetcher {
        fn new(outcomes: HashMap<String, FetchOutcome>) -> Self {
            Self {
                outcomes,
                calls: AtomicUsize::new(0),
                delay: Duration::ZERO,
            }
        }
    }

    #[async_trait]
    impl Fetch for TableFetcher {
        async fn fetch(&self, target: &Target, _timeout: Duration) -> FetchOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.outcomes
                .get(&target.hostname)
                .cloned()
                .unwrap_or(FetchOutcome::Failure(FetchError::Unknown(
                    "host not in table".to_string(),
                )))
        }
    }

    fn success_in_days(days: i64) -> FetchOutcome {
        let now = Utc::now();
        FetchOutcome::Success(CertificateFacts {
            subject: "CN=mock".to_string(),
            issuer: "CN=Mock CA".to_string(),
            not_before: now - chrono::Duration::days(1),
            not_after: now + chrono::Duration::days(days),
            san: vec![],
            serial: "01".to_string(),
        })
    }

    fn checker_for(outcomes: HashMap<String, FetchOutcome>) -> Checker {
        Checker::with_fetcher(
            Arc::new(TableFetcher::new(outcomes)),
            Arc::new(ResultCache::new(Duration::from_secs(300))),
        )
    }

    #[tokio::test]
    async fn test_one_result_per_target() {
        let mut outcomes = HashMap::new();
        for i in 0..5 {
            outcomes.insert(format!("host{}.example.com", i), success_in_days(100));
        }
        let targets: Vec<Target> = (0..5)
            .map(|i| Target::new(&format!("host{}.example.com", i), 443))
            .collect();

        let checker = checker_for(outcomes);
        let results = checker.run_batch(&targets, &CheckParameters::default()).await;

        assert_eq!(results.len(), 5);
        assert!(results.iter().all(|r| r.status == Status::Ok));
    }

    #[tokio::test]
    async fn test_single_failure_does_not_affect_other_targets() {
        let mut outcomes = HashMap::new();
        outcomes.insert(
            "down.example.com".to_string(),
            FetchOutcome::Failure(FetchError::Timeout {
                timeout: Duration::from_secs(5),
            }),
        );
        let mut targets = vec![Target::new("down.example.com", 443)];
        for i in 0..9 {
            let host = format!("up{}.example.com", i);
            outcomes.insert(host.clone(), success_in_days(120));
            targets.push(Target::new(&host, 443));
        }

        let checker = checker_for(outcomes);
        let results = checker.run_batch(&targets, &CheckParameters::default()).await;

        assert_eq!(results.len(), 10);
        let errors: Vec<_> = results.iter().filter(|r| r.status == Status::Error).collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].target.hostname, "down.example.com");
        assert_eq!(
            results.iter().filter(|r| r.status != Status::Error).count(),
            9
        );
    }

    #[tokio::test]
    async fn test_concurrency_one_still_completes_batch() {
        let mut outcomes = HashMap::new();
        for i in 0..4 {
            outcomes.insert(format!("host{}.example.com", i), success_in_days(50));
        }
        let targets: Vec<Target> = (0..4)
            .map(|i| Target::new(&format!("host{}.example.com", i), 443))
            .collect();

        let params = CheckParameters {
            concurrency: 1,
            ..CheckParameters::default()
        };
        let results = checker_for(outcomes).run_batch(&targets, &params).await;
        assert_eq!(results.len(), 4);
    }

    #[tokio::test]
    async fn test_cached_target_is_not_refetched_across_runs() {
        let mut outcomes = HashMap::new();
        outcomes.insert("cached.example.com".to_string(), success_in_days(60));
        let fetcher = Arc::new(TableFetcher::new(outcomes));
        let checker = Checker::with_fetcher(
            Arc::clone(&fetcher) as Arc<dyn Fetch>,
            Arc::new(ResultCache::new(Duration::from_secs(300))),
        );

        let targets = vec![Target::new("cached.example.com", 443)];
        let params = CheckParameters::default();
        checker.run_batch(&targets, &params).await;
        checker.run_batch(&targets, &params).await;

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancelled_batch_returns_only_completed_results() {
        let mut outcomes = HashMap::new();
        for i in 0..6 {
            outcomes.insert(format!("host{}.example.com", i), success_in_days(40));
        }
        let mut fetcher = TableFetcher::new(outcomes);
        fetcher.delay = Duration::from_millis(30);

        let checker = Checker::with_fetcher(
            Arc::new(fetcher),
            Arc::new(ResultCache::new(Duration::from_secs(300))),
        );
        let targets: Vec<Target> = (0..6)
            .map(|i| Target::new(&format!("host{}.example.com", i), 443))
            .collect();

        let cancel = CancelHandle::new();
        let params = CheckParameters {
            concurrency: 1,
            ..CheckParameters::default()
        };

        let cancel_clone = cancel.clone();
        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(45)).await;
            cancel_clone.cancel();
        });

        let results = checker
            .run_batch_with_cancel(&targets, &params, &cancel)
            .await;
        canceller.await.unwrap();

        // At least the first target completed; the tail was never dispatched.
        assert!(!results.is_empty());
        assert!(results.len() < 6);
        assert!(results.iter().all(|r| r.status == Status::Ok));
    }

    #[tokio::test]
    async fn test_cancel_before_run_yields_no_results() {
        let checker = checker_for(HashMap::new());
        let cancel = CancelHandle::new();
        cancel.cancel();

        let targets = vec![Target::new("host.example.com", 443)];
        let results = checker
            .run_batch_with_cancel(&targets, &CheckParameters::default(), &cancel)
            .await;
        assert!(results.is_empty());
    }
}
