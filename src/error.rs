//! Error types for the caching proxy
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Errors surfaced by the cache store and the admin API.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CacheError {
    /// Object cannot fit even in an empty cache
    #[error("Object of {size} bytes exceeds cache capacity of {capacity} bytes")]
    TooLarge { size: usize, capacity: usize },

    /// Key not found in cache
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

// == Proxy Error Enum ==
/// Failures while serving one proxied connection.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// Request line or URI could not be parsed
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Method other than GET
    #[error("Method not implemented: {0}")]
    NotImplemented(String),

    /// Origin-form request without a Host header
    #[error("No host in request URI and no Host header")]
    MissingHost,

    /// Origin server could not be reached
    #[error("Failed to connect to {host}:{port}: {source}")]
    Upstream {
        host: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },

    /// Origin server did not accept the connection in time
    #[error("Timed out connecting to {host}:{port}")]
    UpstreamTimeout { host: String, port: u16 },

    /// Client or origin stream failed mid-transfer
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProxyError {
    /// Status code and reason phrase for the error page sent to the client.
    ///
    /// Returns None for stream failures, where the client connection is no
    /// longer usable.
    pub fn status(&self) -> Option<(u16, &'static str)> {
        match self {
            ProxyError::BadRequest(_) | ProxyError::MissingHost => Some((400, "Bad Request")),
            ProxyError::NotImplemented(_) => Some((501, "Not Implemented")),
            ProxyError::Upstream { .. } => Some((502, "Bad Gateway")),
            ProxyError::UpstreamTimeout { .. } => Some((504, "Gateway Timeout")),
            ProxyError::Io(_) => None,
        }
    }
}
