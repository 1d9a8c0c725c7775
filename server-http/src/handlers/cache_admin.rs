use crate::api::requests::InvalidateParams;
use crate::api::responses::{CacheStatsResponse, InvalidateResponse};
use crate::error::ApiError;
use crate::state::AppState;
use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use pricescout::query::ProductType;
use tracing::info;

/// GET /api/cache/stats
pub async fn cache_stats(State(state): State<AppState>) -> Json<CacheStatsResponse> {
    Json(CacheStatsResponse {
        stats: state.search.cache().stats(),
        ttl_secs: state.search.ttl().as_secs(),
    })
}

/// DELETE /api/cache?countryCode=..&productType=..
pub async fn invalidate_cache(
    State(state): State<AppState>,
    params: Result<Query<InvalidateParams>, QueryRejection>,
) -> Result<Json<InvalidateResponse>, ApiError> {
    let Query(params) = params?;
    info!(
        country_code = ?params.country_code,
        product_type = ?params.product_type,
        "Cache invalidation requested"
    );

    let product_type = params
        .product_type
        .as_deref()
        .map(str::parse::<ProductType>)
        .transpose()?;

    let invalidated = state
        .search
        .cache()
        .invalidate_matching(params.country_code.as_deref(), product_type)
        .await?;

    Ok(Json(InvalidateResponse { invalidated }))
}
