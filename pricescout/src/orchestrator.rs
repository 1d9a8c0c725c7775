use crate::aggregator::ResultAggregator;
use crate::domain::{AggregatedResult, SourceResult};
use crate::error::{AggregateFailure, ConnectorError};
use crate::ports::Connector;
use crate::query::SearchQuery;
use crate::registry::ConnectorRegistry;
use futures::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

/// Fans a query out to every registered connector and merges what comes back.
#[derive(Clone, Debug)]
pub struct SourceOrchestrator {
    registry: Arc<ConnectorRegistry>,
    timeout: Duration,
    aggregator: ResultAggregator,
}

impl SourceOrchestrator {
    pub fn new(
        registry: Arc<ConnectorRegistry>,
        timeout: Duration,
        aggregator: ResultAggregator,
    ) -> Self {
        Self {
            registry,
            timeout,
            aggregator,
        }
    }

    pub fn registry(&self) -> &ConnectorRegistry {
        &self.registry
    }

    /// Run every connector once. Fails only if no connector succeeded.
    pub async fn run(&self, query: &SearchQuery) -> Result<AggregatedResult, AggregateFailure> {
        let started = Instant::now();
        let results = self.dispatch(query).await;

        if results.iter().all(SourceResult::is_failure) {
            let failures: Vec<(String, ConnectorError)> = results
                .into_iter()
                .filter_map(|r| r.error.map(|e| (r.source, e)))
                .collect();
            error!(
                query = %query,
                connectors = failures.len(),
                "All marketplace connectors failed"
            );
            return Err(AggregateFailure { failures });
        }

        let merged = self.aggregator.merge(results);
        debug!(
            query = %query,
            count = merged.count,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Orchestration complete"
        );
        Ok(merged)
    }

    /// One spawned task per connector; results come back in registry order
    /// regardless of completion order.
    async fn dispatch(&self, query: &SearchQuery) -> Vec<SourceResult> {
        let calls = self.registry.iter().map(|connector| {
            let name = connector.name().to_string();
            let handle = tokio::spawn(fetch_bounded(
                connector.clone(),
                query.clone(),
                self.timeout,
            ));

            async move {
                match handle.await {
                    Ok(result) => result,
                    Err(join_err) => {
                        warn!(source = %name, "Connector task failed: {}", join_err);
                        SourceResult::failure(name, ConnectorError::Panicked(join_err.to_string()))
                    }
                }
            }
        });

        join_all(calls).await
    }
}

async fn fetch_bounded(
    connector: Arc<dyn Connector>,
    query: SearchQuery,
    timeout: Duration,
) -> SourceResult {
    let name = connector.name().to_string();
    let started = Instant::now();

    match tokio::time::timeout(timeout, connector.fetch(&query, timeout)).await {
        Ok(Ok(products)) => {
            debug!(
                source = %name,
                products = products.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Connector returned"
            );
            SourceResult::success(name, products)
        }
        Ok(Err(err)) => {
            warn!(source = %name, "Connector failed: {}", err);
            SourceResult::failure(name, err)
        }
        Err(_) => {
            let err = ConnectorError::Timeout(timeout.as_millis() as u64);
            warn!(source = %name, "Connector abandoned: {}", err);
            SourceResult::failure(name, err)
        }
    }
}
