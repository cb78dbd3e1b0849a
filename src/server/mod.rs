pub mod handlers;
mod sse;
pub mod types;

pub use handlers::AppState;

use crate::{
    Error, Result,
    config::{Config, CorsConfig},
};
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use std::net::SocketAddr;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/test", get(handlers::test_connection))
        .route("/generate", post(handlers::generate))
        .route("/stream", post(handlers::submit_stream))
        .route("/stream-events", get(handlers::stream_events))
        .route("/suggest", post(handlers::suggest))
        .route("/suggest-stream", get(handlers::suggest_stream))
        .route("/suggest-streamed", get(handlers::suggest_streamed))
        .route("/detect", post(handlers::detect))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// No configured origins means any origin may call the relay.
pub fn cors_layer(config: &CorsConfig) -> Result<CorsLayer> {
    if config.allowed_origins.is_empty() {
        return Ok(CorsLayer::permissive());
    }

    let origins = config
        .allowed_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|e| Error::config(format!("Invalid CORS origin '{}': {}", origin, e)))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]))
}

pub async fn run(config: Config) -> Result<()> {
    if config.llm.api_key.is_empty() {
        warn!(
            "No API key configured (set {}); model calls will fail until one is provided",
            crate::config::API_KEY_ENV
        );
    }

    let app_state = AppState::new(&config);
    let app = router(app_state).layer(cors_layer(&config.server.cors)?);

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
