use super::SearchQuery;
use sha2::{Digest, Sha256};
use std::fmt;

/// Bumped whenever the canonical form changes so old keys never collide.
const CANONICAL_VERSION: &str = "v1";

/// Cache key of a normalized query: lowercase hex SHA-256.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Wrap an already computed digest.
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex chars, for log lines.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn fingerprint(query: &SearchQuery) -> Fingerprint {
    let canonical = format!(
        "{}|{}|{}|{}|{}",
        CANONICAL_VERSION,
        query.country_code(),
        query.product_type().as_str(),
        query.min_price(),
        query.max_price()
    );

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    Fingerprint(hex::encode(hasher.finalize()))
}
