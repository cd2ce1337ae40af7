//! The rate store: one published snapshot plus the refresh path.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Duration;
use parking_lot::RwLock;
use ratewidget_common::{now, CurrencyCode};
use tracing::{info, instrument, warn};

use crate::error::FetchResult;
use crate::provider::RateSource;
use crate::snapshot::RateSnapshot;

/// Holds the current rate snapshot and mediates all network access.
///
/// Readers get an `Arc` to an immutable snapshot. A refresh builds a new
/// snapshot off to the side and swaps the pointer under a short write lock,
/// so `current()` never waits on the network and never sees a partial map.
/// Concurrent refreshes are not serialized: whichever completes last wins.
pub struct RateStore {
    source: Arc<dyn RateSource>,
    current: RwLock<Option<Arc<RateSnapshot>>>,
    in_flight: tokio::sync::Mutex<()>,
    stats: RefreshCounters,
}

impl RateStore {
    /// Create an empty store fetching from `source`.
    pub fn new(source: Arc<dyn RateSource>) -> Self {
        Self {
            source,
            current: RwLock::new(None),
            in_flight: tokio::sync::Mutex::new(()),
            stats: RefreshCounters::default(),
        }
    }

    /// Fetch rates quoted against `pivot` and publish them on success.
    ///
    /// On failure the previously published snapshot is left untouched.
    /// Dropping the returned future before completion has the same effect.
    #[instrument(skip(self), fields(pivot = %pivot, source = self.source.name()))]
    pub async fn refresh(&self, pivot: &CurrencyCode) -> FetchResult<Arc<RateSnapshot>> {
        self.stats.attempts.fetch_add(1, Ordering::Relaxed);

        let quote = match self.source.fetch(pivot).await {
            Ok(quote) => quote,
            Err(e) => {
                self.stats.failures.fetch_add(1, Ordering::Relaxed);
                warn!(
                    error = %e,
                    code = e.error_code(),
                    retryable = e.is_retryable(),
                    "Rate refresh failed, keeping previous snapshot"
                );
                return Err(e);
            }
        };

        let snapshot = Arc::new(
            RateSnapshot::new(pivot.clone(), quote.rates, now()).with_as_of(quote.date),
        );
        *self.current.write() = Some(snapshot.clone());
        self.stats.successes.fetch_add(1, Ordering::Relaxed);

        info!(
            currencies = snapshot.len(),
            fetched_at = %snapshot.fetched_at(),
            "Published rate snapshot"
        );

        Ok(snapshot)
    }

    /// Refresh unless another guarded refresh is already running.
    ///
    /// Returns `None` without issuing a request when one is in flight.
    pub async fn refresh_if_idle(
        &self,
        pivot: &CurrencyCode,
    ) -> Option<FetchResult<Arc<RateSnapshot>>> {
        let _guard = match self.in_flight.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                info!(pivot = %pivot, "Refresh already in flight, skipping");
                return None;
            }
        };
        Some(self.refresh(pivot).await)
    }

    /// Last successfully published snapshot, if any.
    pub fn current(&self) -> Option<Arc<RateSnapshot>> {
        self.current.read().clone()
    }

    /// True when there is no snapshot or it is older than `max_age`.
    pub fn is_stale(&self, max_age: Duration) -> bool {
        match self.current() {
            Some(snapshot) => snapshot.is_stale(now(), max_age),
            None => true,
        }
    }

    /// Name of the underlying rate source.
    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Get refresh statistics.
    pub fn stats(&self) -> RateStoreStats {
        RateStoreStats {
            refresh_attempts: self.stats.attempts.load(Ordering::Relaxed),
            refresh_successes: self.stats.successes.load(Ordering::Relaxed),
            refresh_failures: self.stats.failures.load(Ordering::Relaxed),
        }
    }
}

#[derive(Default)]
struct RefreshCounters {
    attempts: AtomicU64,
    successes: AtomicU64,
    failures: AtomicU64,
}

/// Refresh statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateStoreStats {
    pub refresh_attempts: u64,
    pub refresh_successes: u64,
    pub refresh_failures: u64,
}

/// Shared rate store.
pub type SharedRateStore = Arc<RateStore>;
