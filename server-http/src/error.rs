use crate::api::responses::ErrorResponse;
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use pricescout::error::{SearchError, ValidationError};
use tracing::error;

/// Everything a handler can fail with, rendered as `{"error": ...}`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Search(SearchError),
    Cache(shared::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Search(SearchError::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Search(SearchError::Aggregate(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Cache(shared::Error::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::BadRequest(message) => message.clone(),
            ApiError::Search(SearchError::Validation(err)) => err.to_string(),
            ApiError::Search(SearchError::Aggregate(_)) => {
                "Failed to fetch products from any marketplace. Please try again.".to_string()
            }
            ApiError::Cache(err) => err.to_string(),
        }
    }
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        ApiError::Search(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Search(SearchError::Validation(err))
    }
}

impl From<shared::Error> for ApiError {
    fn from(err: shared::Error) -> Self {
        ApiError::Cache(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(format!("Invalid query string: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let ApiError::Search(SearchError::Aggregate(failure)) = &self {
            for (source, reason) in &failure.failures {
                error!(source = %source, "Marketplace failed: {}", reason);
            }
        }
        (status, Json(ErrorResponse { error: self.message() })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricescout::error::AggregateFailure;

    #[test]
    fn test_status_mapping() {
        let unavailable = ApiError::from(shared::Error::Unavailable("store offline".to_string()));
        assert_eq!(unavailable.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(unavailable.message(), "cache backend unavailable: store offline");

        let aggregate = ApiError::from(SearchError::Aggregate(AggregateFailure { failures: Vec::new() }));
        assert_eq!(aggregate.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(ApiError::BadRequest("x".to_string()).status(), StatusCode::BAD_REQUEST);
    }
}
