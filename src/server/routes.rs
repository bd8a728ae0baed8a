//! Router setup with all API routes and middleware.

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::server::handlers;
use crate::server::state::AppState;

/// Create the axum Router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // CORS: only the configured frontend origin may call the API.
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list([state
            .settings
            .server
            .allowed_origin
            .parse::<HeaderValue>()
            .unwrap()]))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/api/config", post(handlers::configure))
        .route("/api/chat", post(handlers::chat))
        .route("/api/messages/{id}", get(handlers::messages))
        .route("/api/clear/{id}", post(handlers::clear))
        .route("/api/session/{id}", delete(handlers::delete_session))
        .route("/api/sessions", get(handlers::sessions))
        .route("/api/upload-image/{id}", post(handlers::upload_image))
        // Base64 image payloads ride inside chat bodies.
        .layer(DefaultBodyLimit::max(8 * 1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Bind the configured address and serve requests until shutdown.
pub async fn start_server(state: AppState) -> Result<()> {
    let addr = format!(
        "{}:{}",
        state.settings.server.host, state.settings.server.port
    );
    let router = create_router(state);

    tracing::info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    axum::serve(listener, router)
        .await
        .context("server error")?;

    Ok(())
}
