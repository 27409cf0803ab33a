//! Configuration Module
//!
//! Handles loading and managing proxy configuration from environment variables.

use std::env;
use std::str::FromStr;

use crate::cache::{DEFAULT_MAX_CACHE_SIZE, DEFAULT_MAX_OBJECT_SIZE};

/// Proxy configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port the proxy listens on
    pub proxy_port: u16,
    /// Port of the admin API, 0 disables it
    pub admin_port: u16,
    /// Total bytes the cache may hold
    pub max_cache_size: usize,
    /// Largest response eligible for caching, in bytes
    pub max_object_size: usize,
    /// Origin connect timeout in seconds
    pub upstream_timeout: u64,
    /// Interval of the stats reporter in seconds, 0 disables it
    pub stats_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `PROXY_PORT` - Proxy listen port (default: 8080)
    /// - `ADMIN_PORT` - Admin API port, 0 to disable (default: 3000)
    /// - `MAX_CACHE_SIZE` - Cache capacity in bytes (default: 1049000)
    /// - `MAX_OBJECT_SIZE` - Largest cacheable response in bytes (default: 102400)
    /// - `UPSTREAM_TIMEOUT` - Origin connect timeout in seconds (default: 10)
    /// - `STATS_INTERVAL` - Stats log interval in seconds, 0 to disable (default: 60)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            proxy_port: env_or("PROXY_PORT", defaults.proxy_port),
            admin_port: env_or("ADMIN_PORT", defaults.admin_port),
            max_cache_size: env_or("MAX_CACHE_SIZE", defaults.max_cache_size),
            max_object_size: env_or("MAX_OBJECT_SIZE", defaults.max_object_size),
            upstream_timeout: env_or("UPSTREAM_TIMEOUT", defaults.upstream_timeout),
            stats_interval: env_or("STATS_INTERVAL", defaults.stats_interval),
        }
    }

    /// Applies a `<port>` command-line argument, if one was given and parses.
    pub fn with_port_arg(mut self, arg: Option<&str>) -> Self {
        if let Some(port) = arg.and_then(|v| v.parse().ok()) {
            self.proxy_port = port;
        }
        self
    }

    /// True when objects under the size limit can still be too large for
    /// the whole cache.
    pub fn object_limit_exceeds_capacity(&self) -> bool {
        self.max_object_size > self.max_cache_size
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            proxy_port: 8080,
            admin_port: 3000,
            max_cache_size: DEFAULT_MAX_CACHE_SIZE,
            max_object_size: DEFAULT_MAX_OBJECT_SIZE,
            upstream_timeout: 10,
            stats_interval: 60,
        }
    }
}
