use super::{ProductType, SearchQuery, canonical_country};
use crate::error::ValidationError;
use serde::Deserialize;
use serde_json::Value;

/// Search request exactly as the client sent it.
///
/// Every field is optional at the decoding layer so that a missing field is
/// reported as a validation error rather than a body rejection.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSearchRequest {
    #[serde(default)]
    pub country: Option<Value>,
    #[serde(default)]
    pub country_code: Option<Value>,
    #[serde(default)]
    pub product_type: Option<Value>,
    #[serde(default)]
    pub min_price: Option<Value>,
    #[serde(default)]
    pub max_price: Option<Value>,
}

/// Validate and canonicalize a raw request. Pure; fails on the first problem.
pub fn normalize(raw: &RawSearchRequest) -> Result<SearchQuery, ValidationError> {
    // The display name is part of the wire contract but not of the query.
    required_text(&raw.country, "country")?;
    let country_code = required_text(&raw.country_code, "countryCode")?;
    let product_type = required_text(&raw.product_type, "productType")?;
    let min_price = required(&raw.min_price, "minPrice")?;
    let max_price = required(&raw.max_price, "maxPrice")?;

    let country_code = canonical_country(&country_code)?;
    let product_type: ProductType = product_type.parse()?;
    let min_price = parse_price(min_price, "minPrice")?;
    let max_price = parse_price(max_price, "maxPrice")?;

    SearchQuery::new(&country_code, product_type, min_price, max_price)
}

fn required<'a>(
    value: &'a Option<Value>,
    field: &'static str,
) -> Result<&'a Value, ValidationError> {
    match value {
        None | Some(Value::Null) => Err(ValidationError::MissingField { field }),
        Some(Value::String(s)) if s.trim().is_empty() => {
            Err(ValidationError::MissingField { field })
        }
        Some(v) => Ok(v),
    }
}

fn required_text(value: &Option<Value>, field: &'static str) -> Result<String, ValidationError> {
    Ok(match required(value, field)? {
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    })
}

fn parse_price(value: &Value, field: &'static str) -> Result<u64, ValidationError> {
    match value {
        Value::Number(n) => {
            if let Some(v) = n.as_u64() {
                return Ok(v);
            }
            match n.as_f64() {
                Some(f) => whole_non_negative(f, field),
                None => Err(ValidationError::InvalidPrice { field }),
            }
        }
        Value::String(s) => {
            let s = s.trim();
            if let Ok(v) = s.parse::<u64>() {
                return Ok(v);
            }
            if let Ok(v) = s.parse::<i64>() {
                return if v < 0 {
                    Err(ValidationError::NegativePrice { field })
                } else {
                    Err(ValidationError::InvalidPrice { field })
                };
            }
            match s.parse::<f64>() {
                Ok(f) => whole_non_negative(f, field),
                Err(_) => Err(ValidationError::InvalidPrice { field }),
            }
        }
        _ => Err(ValidationError::InvalidPrice { field }),
    }
}

fn whole_non_negative(value: f64, field: &'static str) -> Result<u64, ValidationError> {
    if !value.is_finite() || value.fract() != 0.0 || value > u64::MAX as f64 {
        return Err(ValidationError::InvalidPrice { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativePrice { field });
    }
    Ok(value as u64)
}
