use crate::error::ConnectorError;
use crate::query::{Fingerprint, SearchQuery};
use chrono::{DateTime, TimeDelta, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;

/// One listing returned by a marketplace.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Product {
    pub title: String,
    #[serde(serialize_with = "serialize_price")]
    pub price: f64,
    pub currency: String,
    pub image: Option<String>,
    pub link: String,
    /// Implied by the group a product is rendered under.
    #[serde(skip_serializing)]
    pub source: String,
}

// Whole prices go out as JSON integers, the way marketplaces list them.
fn serialize_price<S: Serializer>(price: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if price.fract() == 0.0 && price.abs() < i64::MAX as f64 {
        serializer.serialize_i64(*price as i64)
    } else {
        serializer.serialize_f64(*price)
    }
}

/// Output of one connector invocation.
#[derive(Clone, Debug)]
pub struct SourceResult {
    pub source: String,
    pub products: Vec<Product>,
    pub error: Option<ConnectorError>,
}

impl SourceResult {
    pub fn success(source: impl Into<String>, products: Vec<Product>) -> Self {
        Self {
            source: source.into(),
            products,
            error: None,
        }
    }

    pub fn failure(source: impl Into<String>, error: ConnectorError) -> Self {
        Self {
            source: source.into(),
            products: Vec::new(),
            error: Some(error),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SourceGroup {
    pub source: String,
    pub products: Vec<Product>,
}

/// Non-empty source groups in registry order.
///
/// Serializes as a JSON object whose key order is the registry order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Grouped(Vec<SourceGroup>);

impl Grouped {
    pub fn new(groups: Vec<SourceGroup>) -> Self {
        Self(groups)
    }

    pub fn get(&self, source: &str) -> Option<&[Product]> {
        self.0
            .iter()
            .find(|g| g.source == source)
            .map(|g| g.products.as_slice())
    }

    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|g| g.source.as_str())
    }

    pub fn product_count(&self) -> usize {
        self.0.iter().map(|g| g.products.len()).sum()
    }
}

impl Deref for Grouped {
    type Target = [SourceGroup];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Serialize for Grouped {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for group in &self.0 {
            map.serialize_entry(&group.source, &group.products)?;
        }
        map.end()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AggregatedResult {
    /// Always equal to `grouped.product_count()`.
    pub count: usize,
    pub grouped: Grouped,
    pub generated_at: DateTime<Utc>,
}

/// A stored aggregate. Replaced wholesale, never edited.
#[derive(Clone, Debug)]
pub struct CacheEntry {
    pub fingerprint: Fingerprint,
    pub query: SearchQuery,
    pub result: Arc<AggregatedResult>,
    pub created_at: DateTime<Utc>,
    pub ttl: Duration,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(query: SearchQuery, result: Arc<AggregatedResult>, ttl: Duration) -> Self {
        Self::created_at(query, result, ttl, Utc::now())
    }

    pub fn created_at(
        query: SearchQuery,
        result: Arc<AggregatedResult>,
        ttl: Duration,
        created_at: DateTime<Utc>,
    ) -> Self {
        let expires_at = TimeDelta::from_std(ttl)
            .ok()
            .and_then(|delta| created_at.checked_add_signed(delta))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self {
            fingerprint: query.fingerprint(),
            query,
            result,
            created_at,
            ttl,
            expires_at,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Time left before the entry stops being servable.
    pub fn remaining(&self) -> Duration {
        (self.expires_at - Utc::now()).to_std().unwrap_or(Duration::ZERO)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheStatus {
    /// Served from a stored entry.
    Cached,
    /// Produced by a connector run for this request (or one it joined).
    Fresh,
}

/// What the search cache hands back to a caller.
#[derive(Clone, Debug)]
pub struct CacheOutcome {
    pub result: Arc<AggregatedResult>,
    pub status: CacheStatus,
    /// `None` when the result could not be stored.
    pub expires_at: Option<DateTime<Utc>>,
}

impl CacheOutcome {
    pub fn is_cached(&self) -> bool {
        self.status == CacheStatus::Cached
    }

    pub fn expires_in(&self) -> Option<Duration> {
        self.expires_at
            .map(|at| (at - Utc::now()).to_std().unwrap_or(Duration::ZERO))
    }
}

/// Render a duration as `H:MM:SS`.
pub fn format_expires_in(remaining: Duration) -> String {
    let secs = remaining.as_secs();
    format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}
