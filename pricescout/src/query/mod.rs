mod countries;
mod fingerprint;
mod normalize;

pub use fingerprint::{Fingerprint, fingerprint};
pub use normalize::{RawSearchRequest, normalize};

use crate::error::ValidationError;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProductType {
    Phone,
    Laptop,
}

impl ProductType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::Phone => "phone",
            ProductType::Laptop => "laptop",
        }
    }
}

impl FromStr for ProductType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "phone" | "phones" => Ok(ProductType::Phone),
            "laptop" | "laptops" => Ok(ProductType::Laptop),
            _ => Err(ValidationError::UnsupportedProductType(s.trim().to_string())),
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upper-cased ISO 3166 alpha-2 code, or why it is not one.
pub(crate) fn canonical_country(country_code: &str) -> Result<String, ValidationError> {
    let country_code = country_code.trim().to_uppercase();
    if country_code.is_empty() {
        return Err(ValidationError::MissingField {
            field: "countryCode",
        });
    }
    if country_code.len() != 2 || !countries::is_known(&country_code) {
        return Err(ValidationError::UnknownCountry(country_code));
    }
    Ok(country_code)
}

/// A validated, canonical search. Fields are private so a value can only
/// come out of [`SearchQuery::new`] or [`normalize`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SearchQuery {
    country_code: String,
    product_type: ProductType,
    min_price: u64,
    max_price: u64,
}

impl SearchQuery {
    pub fn new(
        country_code: &str,
        product_type: ProductType,
        min_price: u64,
        max_price: u64,
    ) -> Result<Self, ValidationError> {
        let country_code = canonical_country(country_code)?;
        if min_price > max_price {
            return Err(ValidationError::InvertedPriceRange {
                min: min_price,
                max: max_price,
            });
        }

        Ok(Self {
            country_code,
            product_type,
            min_price,
            max_price,
        })
    }

    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    pub fn product_type(&self) -> ProductType {
        self.product_type
    }

    pub fn min_price(&self) -> u64 {
        self.min_price
    }

    pub fn max_price(&self) -> u64 {
        self.max_price
    }

    /// Whether `price` falls inside the requested range (inclusive).
    pub fn accepts_price(&self, price: f64) -> bool {
        price >= self.min_price as f64 && price <= self.max_price as f64
    }

    pub fn fingerprint(&self) -> Fingerprint {
        fingerprint(self)
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}..={}",
            self.country_code, self.product_type, self.min_price, self.max_price
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_canonicalizes_country() {
        let query = SearchQuery::new(" pk ", ProductType::Phone, 0, 10).unwrap();
        assert_eq!(query.country_code(), "PK");
        assert_eq!(query.to_string(), "PK phone 0..=10");
    }

    #[test]
    fn test_new_rejects_bad_input() {
        assert_eq!(
            SearchQuery::new("ZZ", ProductType::Laptop, 0, 1).unwrap_err(),
            ValidationError::UnknownCountry("ZZ".into())
        );
        assert_eq!(
            SearchQuery::new("PAK", ProductType::Laptop, 0, 1).unwrap_err(),
            ValidationError::UnknownCountry("PAK".into())
        );
        assert_eq!(
            SearchQuery::new("PK", ProductType::Laptop, 500, 100).unwrap_err(),
            ValidationError::InvertedPriceRange { min: 500, max: 100 }
        );
    }

    #[test]
    fn test_product_type_parsing() {
        assert_eq!("Phone".parse::<ProductType>().unwrap(), ProductType::Phone);
        assert_eq!(" LAPTOPS ".parse::<ProductType>().unwrap(), ProductType::Laptop);
        assert!(matches!(
            "tablet".parse::<ProductType>(),
            Err(ValidationError::UnsupportedProductType(t)) if t == "tablet"
        ));
    }

    #[test]
    fn test_accepts_price_is_inclusive() {
        let query = SearchQuery::new("PK", ProductType::Phone, 100, 200).unwrap();
        assert!(query.accepts_price(100.0));
        assert!(query.accepts_price(200.0));
        assert!(!query.accepts_price(99.5));
        assert!(!query.accepts_price(200.5));
    }
}
