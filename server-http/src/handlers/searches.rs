use crate::api::requests::PopularParams;
use crate::error::ApiError;
use crate::state::AppState;
use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use pricescout::history::PopularSearch;

/// GET /api/searches/popular?limit=N
pub async fn popular_searches(
    State(state): State<AppState>,
    params: Result<Query<PopularParams>, QueryRejection>,
) -> Result<Json<Vec<PopularSearch>>, ApiError> {
    let Query(params) = params?;
    Ok(Json(state.search.history().popular(params.limit())))
}
