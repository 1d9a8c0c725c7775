use axum::ServiceExt;
use axum::extract::Request;
use server_http::{AppState, routes};
use shared::config::Config;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting PriceScout HTTP Server...");

    // Load environment variables from .env file (if exists)
    match dotenvy::dotenv() {
        Ok(_) => info!("Loaded environment variables from .env file"),
        Err(_) => info!("No .env file found, using system environment variables"),
    }

    let config = Config::from_env();

    let state = match AppState::from_config(&config) {
        Ok(state) => state,
        Err(e) => {
            error!("Invalid connector configuration: {}", e);
            std::process::exit(1);
        }
    };
    info!(
        connectors = ?state.search.orchestrator().registry().names(),
        ttl_secs = config.cache_ttl.as_secs(),
        timeout_ms = config.connector_timeout.as_millis() as u64,
        "Search service ready"
    );

    if let Some(interval) = config.sweep_interval {
        spawn_sweeper(state.clone(), interval);
    }

    let app = routes::build_app(state, &config);

    // Start server
    let address = config.bind_address();
    let listener = match tokio::net::TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", address, e);
            std::process::exit(1);
        }
    };

    info!("HTTP Server listening on http://{}", address);

    // Graceful shutdown handler
    if let Err(e) = axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
    }

    info!("Server shutdown complete");
}

/// Periodically drop expired entries so idle fingerprints do not pin memory.
fn spawn_sweeper(state: AppState, every: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            state.search.cache().sweep().await;
        }
    });
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }

    info!("Shutting down gracefully...");
}
