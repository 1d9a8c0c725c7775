use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{delete, get, post},
};
use shared::config::Config;
use tower::Layer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

/// The router wrapped so trailing slashes are trimmed before routing.
pub type App = NormalizePath<Router>;

pub fn build_app(state: AppState, config: &Config) -> App {
    NormalizePathLayer::trim_trailing_slash().layer(build_router(state, config))
}

/// Build and configure the application router
pub fn build_router(state: AppState, config: &Config) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Search routes
        .route("/api/scrape", post(handlers::scrape))
        .route("/api/refresh", post(handlers::refresh))
        .route("/api/searches/popular", get(handlers::popular_searches))
        // Cache administration
        .route("/api/cache/stats", get(handlers::cache_stats))
        .route("/api/cache", delete(handlers::invalidate_cache))
        // Middleware
        .layer(cors_layer(&config.allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    if allowed_origins.is_empty() || allowed_origins.iter().any(|o| o == "*") {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    cors.allow_origin(AllowOrigin::list(origins))
}
