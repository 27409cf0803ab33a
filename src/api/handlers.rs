//! API Handlers
//!
//! HTTP request handlers for each admin endpoint.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};

use crate::cache::CacheStore;
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    EntriesResponse, HealthResponse, PurgeResponse, RemoveEntryQuery, RemoveResponse,
    StatsResponse,
};

/// Application state shared across all handlers.
///
/// Holds the same cache instance the proxy workers use. The store does its
/// own reader/writer arbitration, so no outer lock is needed.
#[derive(Clone)]
pub struct AppState {
    /// Shared cache store
    pub cache: Arc<CacheStore>,
}

impl AppState {
    /// Creates a new AppState around an existing shared store.
    pub fn new(cache: Arc<CacheStore>) -> Self {
        Self { cache }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Initializes a fresh cache store sized from the Config.
    pub fn from_config(config: &Config) -> Self {
        Self::new(Arc::new(CacheStore::new(config.max_cache_size)))
    }
}

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.cache.stats()))
}

/// Handler for GET /entries
///
/// Lists cached keys and sizes from least to most recently used. Listing
/// does not count as use.
pub async fn entries_handler(State(state): State<AppState>) -> Json<EntriesResponse> {
    Json(EntriesResponse::new(state.cache.entries()))
}

/// Handler for DELETE /entries?key=...
///
/// Removes a single cached object.
pub async fn remove_handler(
    State(state): State<AppState>,
    Query(query): Query<RemoveEntryQuery>,
) -> Result<Json<RemoveResponse>> {
    if let Some(error_msg) = query.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    if !state.cache.remove(&query.key) {
        return Err(CacheError::NotFound(query.key));
    }

    Ok(Json(RemoveResponse::new(query.key)))
}

/// Handler for DELETE /entries/all
///
/// Drops every cached object.
pub async fn purge_handler(State(state): State<AppState>) -> Json<PurgeResponse> {
    let removed = state.cache.clear();
    Json(PurgeResponse { removed })
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
