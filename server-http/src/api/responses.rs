use pricescout::cache::CacheStats;
use pricescout::domain::{CacheOutcome, Grouped, format_expires_in};
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
pub struct HealthResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Body of a successful scrape or refresh.
#[derive(Debug, Serialize)]
pub struct ScrapeResponse {
    pub count: usize,
    pub cached: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_expires_in: Option<String>,
    pub grouped: Grouped,
}

impl From<CacheOutcome> for ScrapeResponse {
    fn from(outcome: CacheOutcome) -> Self {
        let cached = outcome.is_cached();
        let cache_expires_in = if cached {
            outcome.expires_in().map(format_expires_in)
        } else {
            None
        };
        let result = Arc::unwrap_or_clone(outcome.result);

        Self {
            count: result.count,
            cached,
            cache_expires_in,
            grouped: result.grouped,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CacheStatsResponse {
    #[serde(flatten)]
    pub stats: CacheStats,
    pub ttl_secs: u64,
}

#[derive(Debug, Serialize)]
pub struct InvalidateResponse {
    pub invalidated: u64,
}
