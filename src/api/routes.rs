//! API Routes
//!
//! Configures the Axum router with all admin endpoints.

use axum::{
    routing::{delete, get},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    entries_handler, health_handler, purge_handler, remove_handler, stats_handler, AppState,
};

/// Creates the admin router with all endpoints configured.
///
/// # Endpoints
/// - `GET /health` - Health check endpoint
/// - `GET /stats` - Cache statistics
/// - `GET /entries` - Cached keys in recency order
/// - `DELETE /entries?key=...` - Remove one cached object
/// - `DELETE /entries/all` - Purge the cache
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/stats", get(stats_handler))
        .route("/entries", get(entries_handler).delete(remove_handler))
        .route("/entries/all", delete(purge_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
