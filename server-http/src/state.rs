use pricescout::aggregator::ResultAggregator;
use pricescout::cache::SearchCache;
use pricescout::connectors::registry_from_endpoints;
use pricescout::history::SearchHistory;
use pricescout::orchestrator::SourceOrchestrator;
use pricescout::registry::{ConnectorRegistry, RegistryError};
use pricescout::service::SearchService;
use shared::config::Config;
use std::sync::Arc;
use storage_engine::MokaEntryStore;

/// Server state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    pub search: SearchService,
}

impl AppState {
    pub fn new(search: SearchService) -> Self {
        Self { search }
    }

    /// Wire the remote connectors, the moka store and the search service
    /// from configuration.
    pub fn from_config(config: &Config) -> Result<Self, RegistryError> {
        let registry = registry_from_endpoints(&config.connectors)?;
        Ok(Self::with_registry(config, registry))
    }

    pub fn with_registry(config: &Config, registry: ConnectorRegistry) -> Self {
        let store = Arc::new(MokaEntryStore::bounded(config.cache_max_entries));
        let orchestrator = SourceOrchestrator::new(
            Arc::new(registry),
            config.connector_timeout,
            ResultAggregator::new(config.product_ordering),
        );

        Self::new(SearchService::new(
            orchestrator,
            Arc::new(SearchCache::new(store)),
            Arc::new(SearchHistory::new(config.history_capacity)),
            config.cache_ttl,
        ))
    }
}
