use crate::domain::{CacheEntry, Product};
use crate::error::ConnectorError;
use crate::query::{Fingerprint, SearchQuery};
use async_trait::async_trait;
use shared::Result;
use std::time::Duration;

// Ports are the pluggable extension points: marketplaces on one side,
// cache backends on the other.

/// Port for fetching candidate products from one marketplace.
///
/// `timeout` is the budget the orchestrator will enforce; implementations
/// may use it to bound their own I/O.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Display name used as the group key (e.g. "Daraz").
    fn name(&self) -> &str;

    async fn fetch(
        &self,
        query: &SearchQuery,
        timeout: Duration,
    ) -> std::result::Result<Vec<Product>, ConnectorError>;
}

/// Port for the backend that holds cache entries.
///
/// Every method may fail with [`shared::Error::Unavailable`]; callers degrade
/// to uncached operation instead of failing the request.
#[async_trait]
pub trait EntryStore: Send + Sync + 'static {
    /// Returns `None` if absent or past `expires_at`.
    async fn get(&self, fingerprint: &Fingerprint) -> Result<Option<CacheEntry>>;

    /// Insert or wholesale replace the entry for its fingerprint.
    async fn put(&self, entry: CacheEntry) -> Result<()>;

    async fn remove(&self, fingerprint: &Fingerprint) -> Result<bool>;

    /// Remove every entry the predicate selects; returns how many.
    async fn remove_matching(
        &self,
        predicate: &(dyn for<'p> Fn(&'p CacheEntry) -> bool + Send + Sync),
    ) -> Result<u64>;

    /// Number of live entries (may be approximate).
    fn entry_count(&self) -> u64;

    /// Drop expired entries eagerly.
    async fn sweep(&self) -> Result<()>;
}
