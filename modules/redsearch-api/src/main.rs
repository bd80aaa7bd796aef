use std::sync::Arc;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use redsearch_common::Config;

mod routes;

// --- App State ---

pub struct AppState {
    pub config: Config,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/", get(|| async { "ok" }))
        // Search proxy
        .route("/api/search", post(routes::api_search))
        // Configuration diagnostics
        .route("/api/test-token", get(routes::api_test_token))
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

// --- Main ---

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("redsearch_api=info".parse()?),
        )
        .init();

    let config = Config::from_env();
    let addr = format!("{}:{}", config.host, config.port);

    let state = Arc::new(AppState { config });
    let app = router(state);

    info!("redsearch API server starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
