//! Practice HTTP API
//!
//! JSON over HTTP for the practice UI. The caller identifies itself with an
//! `X-User-Id` header; there is no authentication layer.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod state;

use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::info;

pub use error::{ApiError, ApiResult};
pub use extract::{UserId, USER_ID_HEADER};
pub use state::AppState;

/// Concurrent in-flight requests before new ones wait
const CONCURRENCY_LIMIT: usize = 64;

/// Build the axum router with all API routes
pub fn build_router(state: AppState, port: u16) -> Router {
    let origins = [
        format!("http://127.0.0.1:{}", port),
        format!("http://localhost:{}", port),
        // Practice UI dev server
        "http://localhost:5173".to_string(),
        "http://127.0.0.1:5173".to_string(),
    ]
    .iter()
    .filter_map(|origin| origin.parse::<HeaderValue>().ok())
    .collect::<Vec<_>>();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(USER_ID_HEADER),
        ]);

    let no_store = SetResponseHeaderLayer::overriding(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store"),
    );

    Router::new()
        .route("/api/health", get(handlers::health_check))
        // Practice
        .route(
            "/api/practice",
            get(handlers::get_practice).post(handlers::submit_review),
        )
        .route("/api/practice/batch", post(handlers::submit_batch))
        // Progress
        .route("/api/progress", get(handlers::list_progress))
        .route("/api/progress/{chunk_id}", get(handlers::get_progress))
        .route("/api/history", get(handlers::review_history))
        // Chunks & assignments
        .route("/api/chunks", post(handlers::register_chunk))
        .route("/api/chunks/{chunk_id}/plan", get(handlers::get_plan))
        .route("/api/assignments", post(handlers::create_assignment))
        .layer(
            ServiceBuilder::new()
                .concurrency_limit(CONCURRENCY_LIMIT)
                .layer(cors)
                .layer(no_store),
        )
        .with_state(state)
}

/// Serve the API until Ctrl-C
pub async fn serve(state: AppState, addr: SocketAddr) -> std::io::Result<()> {
    let app = build_router(state, addr.port());
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Refrain API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Refrain API shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Could not listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

// ============================================================================
// TESTS
// ============================================================================
