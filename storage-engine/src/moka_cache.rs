use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use pricescout::domain::CacheEntry;
use pricescout::ports::EntryStore;
use pricescout::query::Fingerprint;
use shared::Result;
use std::fmt::Debug;
use std::time::{Duration, Instant};
use tracing::debug;

/// Expires every entry at its own `expires_at`, also across overwrites.
struct EntryExpiry;

impl Expiry<Fingerprint, CacheEntry> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &Fingerprint,
        entry: &CacheEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(entry.remaining())
    }

    fn expire_after_update(
        &self,
        _key: &Fingerprint,
        entry: &CacheEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.remaining())
    }
}

/// Moka-backed entry store with per-entry TTL and an optional size bound.
pub struct MokaEntryStore {
    cache: Cache<Fingerprint, CacheEntry>,
}

impl MokaEntryStore {
    pub fn new(name: &str, max_entries: Option<u64>) -> Self {
        let mut builder = Cache::builder().name(name).expire_after(EntryExpiry);

        if let Some(capacity) = max_entries {
            builder = builder.max_capacity(capacity);
        }

        Self {
            cache: builder.build(),
        }
    }

    pub fn bounded(max_entries: u64) -> Self {
        Self::new("search-results", Some(max_entries))
    }
}

#[async_trait]
impl EntryStore for MokaEntryStore {
    async fn get(&self, fingerprint: &Fingerprint) -> Result<Option<CacheEntry>> {
        // Moka evicts on its own schedule; the entry's clock is authoritative
        Ok(self
            .cache
            .get(fingerprint)
            .await
            .filter(|entry| !entry.is_expired()))
    }

    async fn put(&self, entry: CacheEntry) -> Result<()> {
        self.cache.insert(entry.fingerprint.clone(), entry).await;
        Ok(())
    }

    async fn remove(&self, fingerprint: &Fingerprint) -> Result<bool> {
        Ok(self.cache.remove(fingerprint).await.is_some())
    }

    async fn remove_matching(
        &self,
        predicate: &(dyn for<'p> Fn(&'p CacheEntry) -> bool + Send + Sync),
    ) -> Result<u64> {
        let doomed: Vec<Fingerprint> = self
            .cache
            .iter()
            .filter(|(_, entry)| predicate(entry))
            .map(|(key, _)| key.as_ref().clone())
            .collect();

        let mut removed = 0;
        for fingerprint in &doomed {
            if self.cache.remove(fingerprint).await.is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }

    fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    async fn sweep(&self) -> Result<()> {
        let before = self.cache.entry_count();
        self.cache.run_pending_tasks().await;
        debug!(
            before,
            after = self.cache.entry_count(),
            "Swept search result cache"
        );
        Ok(())
    }
}

impl Debug for MokaEntryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaEntryStore")
            .field("entry_count", &self.cache.entry_count())
            .field("weighted_size", &self.cache.weighted_size())
            .finish()
    }
}
