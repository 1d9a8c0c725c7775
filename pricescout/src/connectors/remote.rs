use crate::domain::Product;
use crate::error::ConnectorError;
use crate::ports::Connector;
use crate::query::SearchQuery;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const DEFAULT_CURRENCY: &str = "PKR";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScrapeRequest<'a> {
    country_code: &'a str,
    product_type: &'a str,
    min_price: u64,
    max_price: u64,
}

#[derive(Deserialize)]
struct ScrapeResponse {
    #[serde(default)]
    products: Vec<ScrapedProduct>,
}

#[derive(Deserialize)]
struct ScrapedProduct {
    title: Option<String>,
    price: Option<f64>,
    currency: Option<String>,
    image: Option<String>,
    link: Option<String>,
}

/// Connector backed by a scraper service that answers
/// `POST {countryCode, productType, minPrice, maxPrice}` with
/// `{"products": [...]}`.
pub struct RemoteConnector {
    name: String,
    endpoint: String,
    client: Client,
}

impl RemoteConnector {
    pub fn new(name: &str, endpoint: &str) -> Self {
        Self::with_client(name, endpoint, Client::new())
    }

    pub fn with_client(name: &str, endpoint: &str, client: Client) -> Self {
        Self {
            name: name.to_string(),
            endpoint: endpoint.to_string(),
            client,
        }
    }

    fn accept(&self, query: &SearchQuery, scraped: ScrapedProduct) -> Option<Product> {
        let title = scraped.title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())?;
        let price = scraped.price.filter(|p| p.is_finite() && *p > 0.0)?;
        if !query.accepts_price(price) {
            return None;
        }

        Some(Product {
            title,
            price,
            currency: scraped
                .currency
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            image: scraped.image.filter(|i| !i.is_empty()),
            link: scraped.link.unwrap_or_default(),
            source: self.name.clone(),
        })
    }
}

#[async_trait]
impl Connector for RemoteConnector {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(
        &self,
        query: &SearchQuery,
        timeout: Duration,
    ) -> Result<Vec<Product>, ConnectorError> {
        let body = ScrapeRequest {
            country_code: query.country_code(),
            product_type: query.product_type().as_str(),
            min_price: query.min_price(),
            max_price: query.max_price(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .timeout(timeout)
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    ConnectorError::Timeout(timeout.as_millis() as u64)
                } else {
                    ConnectorError::Transport(err.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ConnectorError::Upstream {
                status: status.as_u16(),
            });
        }

        let decoded: ScrapeResponse = response
            .json()
            .await
            .map_err(|err| ConnectorError::Decode(err.to_string()))?;

        let received = decoded.products.len();
        let products: Vec<Product> = decoded
            .products
            .into_iter()
            .filter_map(|scraped| self.accept(query, scraped))
            .collect();

        debug!(
            source = %self.name,
            received,
            kept = products.len(),
            "Decoded scraper response"
        );
        Ok(products)
    }
}
