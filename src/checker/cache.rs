// Result Cache - TTL memoization of fetch outcomes with per-key coalescing
//
// Keyed by (target, connect_timeout): a different timeout can change the raw
// fetch outcome, so it is part of the key; the warn threshold is not, since it
// only affects classification.

use crate::certificates::fetcher::FetchOutcome;
use crate::input::Target;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::trace;

/// Clock seam so TTL expiry is testable with a manual clock.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock used in production.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    target: Target,
    connect_timeout: Duration,
}

struct CacheEntry {
    outcome: FetchOutcome,
    fetched_at: Instant,
}

/// Per-key slot. The slot mutex serializes fetches for one key: the first
/// requester fetches while holding it, later requesters block on the lock and
/// then find a fresh entry, so concurrent lookups for one key converge on a
/// single underlying network call.
type Slot = Arc<Mutex<Option<CacheEntry>>>;

/// Thread-safe fetch-outcome cache shared by all workers of a batch.
pub struct ResultCache {
    slots: Mutex<HashMap<CacheKey, Slot>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl ResultCache {
    /// Default TTL for cached outcomes.
    pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    /// Return the cached outcome for `(target, connect_timeout)` if fresh,
    /// otherwise run `fetch` and cache its result.
    ///
    /// Waiters coalesced onto an in-flight fetch receive that fetch's outcome
    /// identically, failures included. Stale entries are replaced, never merged.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        target: &Target,
        connect_timeout: Duration,
        fetch: F,
    ) -> FetchOutcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = FetchOutcome>,
    {
        let key = CacheKey {
            target: target.clone(),
            connect_timeout,
        };

        let slot = {
            let mut slots = self.slots.lock().await;
            Arc::clone(slots.entry(key).or_default())
        };

        let mut entry = slot.lock().await;
        if let Some(cached) = entry.as_ref()
            && self.clock.now().saturating_duration_since(cached.fetched_at) < self.ttl
        {
            trace!(%target, "cache hit");
            return cached.outcome.clone();
        }

        trace!(%target, "cache miss, fetching");
        let outcome = fetch().await;
        *entry = Some(CacheEntry {
            outcome: outcome.clone(),
            fetched_at: self.clock.now(),
        });
        outcome
    }

    /// Drop every expired entry. Returns the number of entries removed.
    pub async fn evict_expired(&self) -> usize {
        let now = self.clock.now();
        let mut slots = self.slots.lock().await;
        let initial = slots.len();

        let mut live = HashMap::new();
        for (key, slot) in slots.drain() {
            // try_lock failure means a fetch is in flight for that key; the
            // slot is about to hold a fresh entry, so keep it.
            let fresh = match slot.try_lock() {
                Ok(entry) => entry
                    .as_ref()
                    .map(|e| now.saturating_duration_since(e.fetched_at) < self.ttl)
                    .unwrap_or(false),
                Err(_) => true,
            };
            if fresh {
                live.insert(key, slot);
            }
        }
        *slots = live;

        initial - slots.len()
    }

    pub async fn clear(&self) {
        self.slots.lock().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.slots.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.slots.lock().await.is_empty()
    }
}
