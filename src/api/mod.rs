//! API Module
//!
//! HTTP handlers and routing for the cache admin API.
//!
//! # Endpoints
//! - `GET /health` - Health check endpoint
//! - `GET /stats` - Cache statistics
//! - `GET /entries` - List cached objects
//! - `DELETE /entries?key=...` - Remove a cached object
//! - `DELETE /entries/all` - Purge the cache

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
