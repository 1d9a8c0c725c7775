use thiserror::Error;

/// Rejected search input. Raised before any cache or network activity.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field '{field}'")]
    MissingField { field: &'static str },

    #[error("Unknown country code '{0}'")]
    UnknownCountry(String),

    #[error("Unsupported product type '{0}'. Must be 'phone' or 'laptop'")]
    UnsupportedProductType(String),

    #[error("Field '{field}' must be a valid whole number")]
    InvalidPrice { field: &'static str },

    #[error("Field '{field}' cannot be negative")]
    NegativePrice { field: &'static str },

    #[error("Min price ({min}) cannot be greater than max price ({max})")]
    InvertedPriceRange { min: u64, max: u64 },
}

impl ValidationError {
    /// Name of the request field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::MissingField { field }
            | ValidationError::InvalidPrice { field }
            | ValidationError::NegativePrice { field } => field,
            ValidationError::UnknownCountry(_) => "countryCode",
            ValidationError::UnsupportedProductType(_) => "productType",
            ValidationError::InvertedPriceRange { .. } => "minPrice",
        }
    }
}

/// A single marketplace fetch that did not produce products.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConnectorError {
    #[error("timed out after {0} ms")]
    Timeout(u64),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("upstream returned status {status}")]
    Upstream { status: u16 },

    #[error("could not decode response: {0}")]
    Decode(String),

    #[error("connector task panicked: {0}")]
    Panicked(String),
}

/// Every registered connector failed for one run. Nothing is cached.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("all {} marketplace connectors failed", failures.len())]
pub struct AggregateFailure {
    /// `(source, reason)` in registry order.
    pub failures: Vec<(String, ConnectorError)>,
}

/// Outcome of a scrape or refresh that did not yield a result.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SearchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Aggregate(#[from] AggregateFailure),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_fields() {
        assert_eq!(
            ValidationError::MissingField { field: "maxPrice" }.field(),
            "maxPrice"
        );
        assert_eq!(
            ValidationError::UnknownCountry("XX".into()).field(),
            "countryCode"
        );
        assert_eq!(
            ValidationError::InvertedPriceRange { min: 5, max: 1 }.to_string(),
            "Min price (5) cannot be greater than max price (1)"
        );
    }

    #[test]
    fn test_aggregate_failure_message() {
        let failure = AggregateFailure {
            failures: vec![
                ("Daraz".into(), ConnectorError::Timeout(10)),
                ("OLX".into(), ConnectorError::Upstream { status: 503 }),
            ],
        };
        assert_eq!(failure.to_string(), "all 2 marketplace connectors failed");
    }
}
