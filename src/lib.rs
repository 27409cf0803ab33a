//! Caching Proxy - A forwarding HTTP proxy with a shared LRU object cache
//!
//! Serves repeated GET requests from a size-bounded in-memory cache guarded
//! by a reader/writer admission gate, with a small JSON admin API.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod proxy;
pub mod tasks;

pub use api::AppState;
pub use cache::CacheStore;
pub use config::Config;
pub use proxy::ProxyContext;
pub use tasks::spawn_stats_reporter;
