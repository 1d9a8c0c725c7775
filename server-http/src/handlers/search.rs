use crate::api::responses::ScrapeResponse;
use crate::error::ApiError;
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use pricescout::query::RawSearchRequest;

/// POST /api/scrape
pub async fn scrape(
    State(state): State<AppState>,
    body: Result<Json<RawSearchRequest>, JsonRejection>,
) -> Result<Json<ScrapeResponse>, ApiError> {
    let Json(raw) = body?;
    let outcome = state.search.handle_scrape(&raw).await?;
    Ok(Json(outcome.into()))
}

/// POST /api/refresh
pub async fn refresh(
    State(state): State<AppState>,
    body: Result<Json<RawSearchRequest>, JsonRejection>,
) -> Result<Json<ScrapeResponse>, ApiError> {
    let Json(raw) = body?;
    let outcome = state.search.handle_refresh(&raw).await?;
    Ok(Json(outcome.into()))
}
