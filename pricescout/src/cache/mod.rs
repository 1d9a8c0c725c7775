pub mod single_flight;

use crate::domain::{AggregatedResult, CacheEntry, CacheOutcome, CacheStatus};
use crate::error::{AggregateFailure, ConnectorError};
use crate::ports::EntryStore;
use crate::query::{Fingerprint, ProductType, SearchQuery};
use futures::FutureExt;
use serde::Serialize;
use shared::CacheError;
use single_flight::{Launch, SingleFlight};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

type FlightResult = Result<CacheOutcome, AggregateFailure>;

/// Snapshot of cache activity since startup.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: u64,
    pub in_flight: usize,
    pub hits: u64,
    pub misses: u64,
    pub refreshes: u64,
    pub degraded: u64,
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    refreshes: AtomicU64,
    degraded: AtomicU64,
}

/// Whether a flight may answer from a stored entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FlightMode {
    Lookup,
    Refresh,
}

/// Fingerprint-keyed result cache with per-fingerprint single-flight.
///
/// Reads of a valid entry go straight to the store. Computations for one
/// fingerprint never overlap; distinct fingerprints never wait on each other.
/// A failed computation leaves whatever was stored untouched.
pub struct SearchCache {
    store: Arc<dyn EntryStore>,
    flights: SingleFlight<Fingerprint, FlightResult>,
    counters: Arc<Counters>,
}

impl SearchCache {
    pub fn new(store: Arc<dyn EntryStore>) -> Self {
        Self {
            store,
            flights: SingleFlight::new(),
            counters: Arc::new(Counters::default()),
        }
    }

    /// A valid entry for `fingerprint`, if any. Backend errors read as a miss.
    pub async fn get(&self, fingerprint: &Fingerprint) -> Option<CacheEntry> {
        lookup(self.store.as_ref(), fingerprint, &self.counters).await
    }

    /// Serve a valid entry, join an in-flight computation, or run `compute`
    /// exactly once and store its result for `ttl`.
    pub async fn get_or_compute<F, Fut>(
        &self,
        query: &SearchQuery,
        compute: F,
        ttl: Duration,
    ) -> FlightResult
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<AggregatedResult, AggregateFailure>> + Send + 'static,
    {
        let fingerprint = query.fingerprint();

        if let Some(entry) = self.get(&fingerprint).await {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
            debug!(fingerprint = %fingerprint.short(), "Cache hit");
            return Ok(cached_outcome(entry));
        }

        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        let (flight, role) = self.flights.join_or_start(fingerprint.clone(), || {
            self.flight(query.clone(), compute(), ttl, FlightMode::Lookup)
        });
        debug!(fingerprint = %fingerprint.short(), ?role, "Cache miss");

        land(flight.await, &fingerprint)
    }

    /// Always recompute, sharing any computation already in flight.
    /// On success the stored entry is replaced; on failure it is kept.
    pub async fn force_refresh<F, Fut>(
        &self,
        query: &SearchQuery,
        compute: F,
        ttl: Duration,
    ) -> FlightResult
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<AggregatedResult, AggregateFailure>> + Send + 'static,
    {
        let fingerprint = query.fingerprint();
        self.counters.refreshes.fetch_add(1, Ordering::Relaxed);
        let mut work = self.flight(query.clone(), compute(), ttl, FlightMode::Refresh);

        loop {
            match self.flights.start_or_join(fingerprint.clone(), work) {
                Launch::Started(flight) => {
                    info!(fingerprint = %fingerprint.short(), "Refreshing search");
                    return land(flight.await, &fingerprint);
                }
                Launch::Joined(flight, unused) => {
                    info!(fingerprint = %fingerprint.short(), "Refresh joined in-flight search");
                    let outcome = land(flight.await, &fingerprint)?;
                    if outcome.status == CacheStatus::Fresh {
                        return Ok(outcome);
                    }
                    // The joined lookup answered from the store; that is not
                    // a refresh, so go again with our own work.
                    work = unused;
                }
            }
        }
    }

    pub async fn invalidate(&self, fingerprint: &Fingerprint) -> Result<bool, CacheError> {
        self.store.remove(fingerprint).await
    }

    /// Remove entries by country and/or product type; `None` matches all.
    pub async fn invalidate_matching(
        &self,
        country_code: Option<&str>,
        product_type: Option<ProductType>,
    ) -> Result<u64, CacheError> {
        let country_code = country_code.map(|c| c.trim().to_uppercase());
        let predicate = move |entry: &CacheEntry| {
            country_code
                .as_deref()
                .is_none_or(|c| entry.query.country_code() == c)
                && product_type.is_none_or(|t| entry.query.product_type() == t)
        };
        let removed = self.store.remove_matching(&predicate).await?;
        info!(removed, "Invalidated cache entries");
        Ok(removed)
    }

    pub async fn sweep(&self) {
        if let Err(err) = self.store.sweep().await {
            warn!("Cache sweep failed: {}", err);
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.store.entry_count(),
            in_flight: self.flights.in_flight(),
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            refreshes: self.counters.refreshes.load(Ordering::Relaxed),
            degraded: self.counters.degraded.load(Ordering::Relaxed),
        }
    }

    fn flight<Fut>(
        &self,
        query: SearchQuery,
        work: Fut,
        ttl: Duration,
        mode: FlightMode,
    ) -> futures::future::BoxFuture<'static, FlightResult>
    where
        Fut: Future<Output = Result<AggregatedResult, AggregateFailure>> + Send + 'static,
    {
        let store = self.store.clone();
        let counters = self.counters.clone();

        async move {
            let fingerprint = query.fingerprint();

            // Another flight may have stored the entry between our miss and now
            if mode == FlightMode::Lookup {
                if let Some(entry) = lookup(store.as_ref(), &fingerprint, &counters).await {
                    return Ok(cached_outcome(entry));
                }
            }

            let result = Arc::new(work.await?);
            let entry = CacheEntry::new(query, result.clone(), ttl);
            let expires_at = entry.expires_at;

            let expires_at = match store.put(entry).await {
                Ok(()) => Some(expires_at),
                Err(err) => {
                    counters.degraded.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        fingerprint = %fingerprint.short(),
                        "Cache write failed, serving uncached result: {}",
                        err
                    );
                    None
                }
            };

            Ok(CacheOutcome {
                result,
                status: CacheStatus::Fresh,
                expires_at,
            })
        }
        .boxed()
    }
}

impl std::fmt::Debug for SearchCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchCache")
            .field("stats", &self.stats())
            .finish()
    }
}

async fn lookup(
    store: &dyn EntryStore,
    fingerprint: &Fingerprint,
    counters: &Counters,
) -> Option<CacheEntry> {
    match store.get(fingerprint).await {
        // Backends expire lazily; never trust them to have done it already.
        Ok(Some(entry)) if !entry.is_expired() => Some(entry),
        Ok(_) => None,
        Err(err) => {
            counters.degraded.fetch_add(1, Ordering::Relaxed);
            warn!(
                fingerprint = %fingerprint.short(),
                "Cache read failed, computing without cache: {}",
                err
            );
            None
        }
    }
}

fn cached_outcome(entry: CacheEntry) -> CacheOutcome {
    CacheOutcome {
        result: entry.result,
        status: CacheStatus::Cached,
        expires_at: Some(entry.expires_at),
    }
}

fn land(
    outcome: Result<FlightResult, single_flight::FlightAborted>,
    fingerprint: &Fingerprint,
) -> FlightResult {
    match outcome {
        Ok(result) => result,
        Err(aborted) => {
            warn!(fingerprint = %fingerprint.short(), "Search flight aborted: {}", aborted.0);
            Err(AggregateFailure {
                failures: vec![("flight".to_string(), ConnectorError::Panicked(aborted.0))],
            })
        }
    }
}
