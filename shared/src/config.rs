use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Within-source ordering applied by the aggregator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProductOrdering {
    /// Keep the order the connector delivered.
    #[default]
    Delivery,
    /// Stable sort by ascending price.
    PriceAscending,
}

impl FromStr for ProductOrdering {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "delivery" | "none" => Ok(ProductOrdering::Delivery),
            "price" | "price_asc" => Ok(ProductOrdering::PriceAscending),
            other => Err(format!("unknown product ordering '{}'", other)),
        }
    }
}

/// A marketplace the server registers at startup, in registry order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectorEndpoint {
    pub name: String,
    pub url: String,
}

pub struct Config {
    pub host: String,
    pub http_port: u16,
    pub cache_ttl: Duration,
    pub connector_timeout: Duration,
    pub cache_max_entries: u64,
    /// `None` disables the background sweeper.
    pub sweep_interval: Option<Duration>,
    pub product_ordering: ProductOrdering,
    pub connectors: Vec<ConnectorEndpoint>,
    pub allowed_origins: Vec<String>,
    pub history_capacity: usize,
}

impl Config {
    const DEFAULT_HOST: &str = "0.0.0.0";
    const DEFAULT_HTTP_PORT: u16 = 8080;
    const DEFAULT_CACHE_TTL_SECS: u64 = 900;
    const DEFAULT_CONNECTOR_TIMEOUT_MS: u64 = 6_000;
    const DEFAULT_CACHE_MAX_ENTRIES: u64 = 10_000;
    const DEFAULT_SWEEP_SECS: u64 = 60;
    const DEFAULT_HISTORY_CAPACITY: usize = 1_000;
    const DEFAULT_CONNECTORS: &str = "Daraz=http://localhost:4000/scrape/daraz,\
        PriceOye=http://localhost:4000/scrape/priceoye,\
        OLX=http://localhost:4000/scrape/olx";

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(&format!("PRICESCOUT_{}", name))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let sweep_secs = parse_or(
            "PRICESCOUT_CACHE_SWEEP_SECS",
            var("CACHE_SWEEP_SECS"),
            Self::DEFAULT_SWEEP_SECS,
        );

        let connectors_raw =
            var("CONNECTORS").unwrap_or_else(|| Self::DEFAULT_CONNECTORS.to_string());

        Self {
            host: var("HOST").unwrap_or_else(|| Self::DEFAULT_HOST.to_string()),
            http_port: parse_or(
                "PRICESCOUT_HTTP_PORT",
                var("HTTP_PORT"),
                Self::DEFAULT_HTTP_PORT,
            ),
            cache_ttl: Duration::from_secs(parse_or(
                "PRICESCOUT_CACHE_TTL_SECS",
                var("CACHE_TTL_SECS"),
                Self::DEFAULT_CACHE_TTL_SECS,
            )),
            connector_timeout: Duration::from_millis(parse_or(
                "PRICESCOUT_CONNECTOR_TIMEOUT_MS",
                var("CONNECTOR_TIMEOUT_MS"),
                Self::DEFAULT_CONNECTOR_TIMEOUT_MS,
            )),
            cache_max_entries: parse_or(
                "PRICESCOUT_CACHE_MAX_ENTRIES",
                var("CACHE_MAX_ENTRIES"),
                Self::DEFAULT_CACHE_MAX_ENTRIES,
            ),
            sweep_interval: (sweep_secs > 0).then(|| Duration::from_secs(sweep_secs)),
            product_ordering: parse_or(
                "PRICESCOUT_PRODUCT_ORDER",
                var("PRODUCT_ORDER"),
                ProductOrdering::default(),
            ),
            connectors: parse_connectors(&connectors_raw),
            allowed_origins: var("ALLOWED_ORIGINS")
                .unwrap_or_else(|| "*".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            history_capacity: parse_or(
                "PRICESCOUT_HISTORY_CAPACITY",
                var("HISTORY_CAPACITY"),
                Self::DEFAULT_HISTORY_CAPACITY,
            ),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.http_port)
    }
}

fn parse_or<T: FromStr>(name: &str, raw: Option<String>, default: T) -> T {
    match raw {
        Some(value) => value.parse::<T>().unwrap_or_else(|_| {
            warn!("{} has invalid value '{}', using default", name, value);
            default
        }),
        None => default,
    }
}

/// Parse `Name=URL` pairs. Malformed pairs and repeated names are skipped.
fn parse_connectors(raw: &str) -> Vec<ConnectorEndpoint> {
    let mut endpoints: Vec<ConnectorEndpoint> = Vec::new();

    for pair in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let Some((name, url)) = pair.split_once('=') else {
            warn!("Ignoring malformed connector entry '{}'", pair);
            continue;
        };
        let (name, url) = (name.trim(), url.trim());
        if name.is_empty() || url.is_empty() {
            warn!("Ignoring malformed connector entry '{}'", pair);
            continue;
        }
        if endpoints.iter().any(|e| e.name == name) {
            warn!("Ignoring duplicate connector '{}'", name);
            continue;
        }
        endpoints.push(ConnectorEndpoint {
            name: name.to_string(),
            url: url.to_string(),
        });
    }

    endpoints
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.cache_ttl, Duration::from_secs(900));
        assert_eq!(config.connector_timeout, Duration::from_millis(6000));
        assert_eq!(config.sweep_interval, Some(Duration::from_secs(60)));
        assert_eq!(config.product_ordering, ProductOrdering::Delivery);
        assert_eq!(config.allowed_origins, vec!["*".to_string()]);

        let names: Vec<&str> = config.connectors.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Daraz", "PriceOye", "OLX"]);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config_from(&[
            ("PRICESCOUT_HTTP_PORT", "not-a-port"),
            ("PRICESCOUT_CACHE_TTL_SECS", "-5"),
            ("PRICESCOUT_PRODUCT_ORDER", "random"),
        ]);
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.cache_ttl, Duration::from_secs(900));
        assert_eq!(config.product_ordering, ProductOrdering::Delivery);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PRICESCOUT_CACHE_SWEEP_SECS", "0"),
            ("PRICESCOUT_PRODUCT_ORDER", "PRICE"),
            ("PRICESCOUT_ALLOWED_ORIGINS", "http://a.test, http://b.test"),
        ]);
        assert_eq!(config.sweep_interval, None);
        assert_eq!(config.product_ordering, ProductOrdering::PriceAscending);
        assert_eq!(config.allowed_origins.len(), 2);
        assert_eq!(config.allowed_origins[1], "http://b.test");
    }

    #[test]
    fn test_parse_connectors_keeps_order_and_skips_junk() {
        let endpoints = parse_connectors("OLX=http://o, junk, Daraz = http://d ,OLX=http://x,=http://y");
        assert_eq!(
            endpoints,
            vec![
                ConnectorEndpoint {
                    name: "OLX".into(),
                    url: "http://o".into()
                },
                ConnectorEndpoint {
                    name: "Daraz".into(),
                    url: "http://d".into()
                },
            ]
        );
    }
}
