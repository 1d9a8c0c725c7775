use serde::Deserialize;

/// Query string of `DELETE /api/cache`; absent filters match everything.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidateParams {
    pub country_code: Option<String>,
    pub product_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PopularParams {
    pub limit: Option<usize>,
}

impl PopularParams {
    pub const DEFAULT_LIMIT: usize = 10;
    pub const MAX_LIMIT: usize = 100;

    pub fn limit(&self) -> usize {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }
}
