//! Marketplace adapters. Each one speaks to a single upstream and reports
//! products tagged with its registered name.

mod remote;

pub use remote::RemoteConnector;

use crate::registry::{ConnectorRegistry, RegistryError};
use shared::config::ConnectorEndpoint;
use std::sync::Arc;

/// Registry of [`RemoteConnector`]s, one per configured endpoint, sharing
/// a single HTTP client.
pub fn registry_from_endpoints(
    endpoints: &[ConnectorEndpoint],
) -> Result<ConnectorRegistry, RegistryError> {
    let client = reqwest::Client::new();
    let mut registry = ConnectorRegistry::new();
    for endpoint in endpoints {
        registry.register(Arc::new(RemoteConnector::with_client(
            &endpoint.name,
            &endpoint.url,
            client.clone(),
        )))?;
    }
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(name: &str) -> ConnectorEndpoint {
        ConnectorEndpoint {
            name: name.to_string(),
            url: format!("http://scraper.test/{}", name.to_lowercase()),
        }
    }

    #[test]
    fn test_registry_follows_endpoint_order() {
        let registry =
            registry_from_endpoints(&[endpoint("PriceOye"), endpoint("Daraz"), endpoint("OLX")])
                .unwrap();
        assert_eq!(registry.names(), vec!["PriceOye", "Daraz", "OLX"]);
    }

    #[test]
    fn test_duplicate_endpoint_names_rejected() {
        let err = registry_from_endpoints(&[endpoint("Daraz"), endpoint("Daraz")]).unwrap_err();
        assert_eq!(err, RegistryError::Duplicate("Daraz".into()));
    }
}
