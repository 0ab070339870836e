use super::handlers;
use super::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes;

    Router::new()
        // Liveness
        .route("/", get(handlers::hello))
        .route("/health", get(handlers::health_check))
        // Extraction
        .route(
            "/process-meeting",
            post(handlers::process_meeting).layer(DefaultBodyLimit::max(body_limit)),
        )
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
