use crate::domain::{CacheEntry, Product};
use crate::error::ConnectorError;
use crate::ports::{Connector, EntryStore};
use crate::query::{Fingerprint, ProductType, SearchQuery};
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

pub fn product(source: &str, title: &str, price: f64) -> Product {
    Product {
        title: title.to_string(),
        price,
        currency: "PKR".to_string(),
        image: None,
        link: format!("https://shop.test/{}", title.replace(' ', "-")),
        source: source.to_string(),
    }
}

pub fn phone_query() -> SearchQuery {
    SearchQuery::new("PK", ProductType::Phone, 0, 100_000).unwrap()
}

enum Behavior {
    Products(Vec<Product>),
    Fail(ConnectorError),
    Panic,
}

/// Scriptable connector that counts its invocations.
pub struct StubConnector {
    name: String,
    delay: Duration,
    behavior: Behavior,
    calls: Arc<AtomicUsize>,
}

impl StubConnector {
    pub fn returning(name: &str, titles: &[(&str, f64)]) -> Self {
        let products = titles
            .iter()
            .map(|(title, price)| product(name, title, *price))
            .collect();
        Self::with(name, Behavior::Products(products))
    }

    pub fn failing(name: &str) -> Self {
        Self::with(name, Behavior::Fail(ConnectorError::Upstream { status: 503 }))
    }

    pub fn panicking(name: &str) -> Self {
        Self::with(name, Behavior::Panic)
    }

    fn with(name: &str, behavior: Behavior) -> Self {
        Self {
            name: name.to_string(),
            delay: Duration::ZERO,
            behavior,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Handle that keeps counting after the connector moves into a registry.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

#[async_trait]
impl Connector for StubConnector {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(
        &self,
        _query: &SearchQuery,
        _timeout: Duration,
    ) -> Result<Vec<Product>, ConnectorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.behavior {
            Behavior::Products(products) => Ok(products.clone()),
            Behavior::Fail(err) => Err(err.clone()),
            Behavior::Panic => panic!("stub connector {} exploded", self.name),
        }
    }
}

pub fn count(calls: &Arc<AtomicUsize>) -> usize {
    calls.load(Ordering::SeqCst)
}

/// HashMap-backed store with switchable failure modes.
#[derive(Default)]
pub struct MemoryStore {
    entries: parking_lot::Mutex<std::collections::HashMap<Fingerprint, CacheEntry>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    read_delay: Duration,
}

impl MemoryStore {
    pub fn unavailable() -> Self {
        let store = Self::default();
        store.fail_reads.store(true, Ordering::SeqCst);
        store.fail_writes.store(true, Ordering::SeqCst);
        store
    }

    /// Every read waits `delay` before touching the map.
    pub fn with_read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = delay;
        self
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn raw(&self, fingerprint: &Fingerprint) -> Option<CacheEntry> {
        self.entries.lock().get(fingerprint).cloned()
    }

    pub fn insert_raw(&self, entry: CacheEntry) {
        self.entries.lock().insert(entry.fingerprint.clone(), entry);
    }

    fn check(&self, flag: &AtomicBool) -> shared::Result<()> {
        if flag.load(Ordering::SeqCst) {
            Err(shared::Error::Unavailable("memory store switched off".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl EntryStore for MemoryStore {
    async fn get(&self, fingerprint: &Fingerprint) -> shared::Result<Option<CacheEntry>> {
        self.check(&self.fail_reads)?;
        if !self.read_delay.is_zero() {
            tokio::time::sleep(self.read_delay).await;
        }
        Ok(self.entries.lock().get(fingerprint).cloned())
    }

    async fn put(&self, entry: CacheEntry) -> shared::Result<()> {
        self.check(&self.fail_writes)?;
        self.insert_raw(entry);
        Ok(())
    }

    async fn remove(&self, fingerprint: &Fingerprint) -> shared::Result<bool> {
        Ok(self.entries.lock().remove(fingerprint).is_some())
    }

    async fn remove_matching(
        &self,
        predicate: &(dyn for<'p> Fn(&'p CacheEntry) -> bool + Send + Sync),
    ) -> shared::Result<u64> {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| !predicate(entry));
        Ok((before - entries.len()) as u64)
    }

    fn entry_count(&self) -> u64 {
        self.entries.lock().len() as u64
    }

    async fn sweep(&self) -> shared::Result<()> {
        self.entries.lock().retain(|_, entry| !entry.is_expired());
        Ok(())
    }
}
