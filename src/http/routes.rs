use super::handlers;
use super::state::AppState;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Recording control
        .route("/recordings/start", post(handlers::start_recording))
        .route("/recordings/stop", post(handlers::stop_recording))
        .route("/recordings/status", get(handlers::get_status))
        // Conversation queries
        .route("/conversations", get(handlers::list_conversations))
        .route("/conversations/:id", delete(handlers::delete_conversation))
        .route(
            "/conversations/:id/transcript",
            get(handlers::get_transcript),
        )
        // The UI runs in a webview on another origin
        .layer(CorsLayer::permissive())
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
