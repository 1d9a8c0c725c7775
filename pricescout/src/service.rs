use crate::cache::SearchCache;
use crate::domain::CacheOutcome;
use crate::error::SearchError;
use crate::history::SearchHistory;
use crate::orchestrator::SourceOrchestrator;
use crate::query::{RawSearchRequest, SearchQuery, normalize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Application service behind the scrape and refresh endpoints.
/// Composes normalization, the search cache and the orchestrator.
#[derive(Clone)]
pub struct SearchService {
    orchestrator: SourceOrchestrator,
    cache: Arc<SearchCache>,
    history: Arc<SearchHistory>,
    ttl: Duration,
}

impl SearchService {
    pub fn new(
        orchestrator: SourceOrchestrator,
        cache: Arc<SearchCache>,
        history: Arc<SearchHistory>,
        ttl: Duration,
    ) -> Self {
        Self {
            orchestrator,
            cache,
            history,
            ttl,
        }
    }

    pub fn orchestrator(&self) -> &SourceOrchestrator {
        &self.orchestrator
    }

    pub fn cache(&self) -> &Arc<SearchCache> {
        &self.cache
    }

    pub fn history(&self) -> &Arc<SearchHistory> {
        &self.history
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// normalize → cached result, or one orchestration shared by all
    /// concurrent callers → store.
    pub async fn handle_scrape(&self, raw: &RawSearchRequest) -> Result<CacheOutcome, SearchError> {
        let query = self.validate(raw)?;
        let orchestrator = self.orchestrator.clone();
        let job = query.clone();

        let outcome = self
            .cache
            .get_or_compute(&query, move || async move { orchestrator.run(&job).await }, self.ttl)
            .await?;

        self.finish("scrape", &query, &outcome);
        Ok(outcome)
    }

    /// normalize → always orchestrate → replace the stored entry on success.
    pub async fn handle_refresh(&self, raw: &RawSearchRequest) -> Result<CacheOutcome, SearchError> {
        let query = self.validate(raw)?;
        let orchestrator = self.orchestrator.clone();
        let job = query.clone();

        let outcome = self
            .cache
            .force_refresh(&query, move || async move { orchestrator.run(&job).await }, self.ttl)
            .await?;

        self.finish("refresh", &query, &outcome);
        Ok(outcome)
    }

    fn validate(&self, raw: &RawSearchRequest) -> Result<SearchQuery, SearchError> {
        normalize(raw).map_err(|err| {
            warn!(field = err.field(), "Rejected search: {}", err);
            SearchError::from(err)
        })
    }

    fn finish(&self, operation: &str, query: &SearchQuery, outcome: &CacheOutcome) {
        info!(
            operation,
            query = %query,
            count = outcome.result.count,
            cached = outcome.is_cached(),
            "Search answered"
        );
        self.history
            .record(query, outcome.result.count, outcome.is_cached());
    }
}

impl std::fmt::Debug for SearchService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchService")
            .field("orchestrator", &self.orchestrator)
            .field("ttl", &self.ttl)
            .finish()
    }
}
