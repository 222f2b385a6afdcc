pub mod health;
pub mod messages;
pub mod schemas;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use burnlink_storage::MessageStore;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The message store backend.
    pub store: Arc<dyn MessageStore>,
    /// Maximum accepted request body size in bytes; `0` disables the limit.
    pub max_upload_bytes: usize,
}

/// Build the Axum router with all routes and middleware.
///
/// The `/{key}` routes are registered last so static paths win the match.
pub fn router(state: AppState) -> Router {
    let body_limit = if state.max_upload_bytes == 0 {
        DefaultBodyLimit::disable()
    } else {
        DefaultBodyLimit::max(state.max_upload_bytes)
    };

    Router::new()
        .route("/health", get(health::health))
        .route("/api/", post(messages::submit))
        .route("/api/{key}", get(messages::fetch))
        .route("/{key}/{filename}", get(messages::fetch_named))
        .route("/{key}", get(messages::landing))
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
