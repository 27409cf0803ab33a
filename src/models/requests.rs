//! Request DTOs for the admin API
//!
//! Defines the structure of incoming query parameters.

use serde::Deserialize;

/// Query string for removing one entry (DELETE /entries?key=...)
///
/// # Fields
/// - `key`: The cache key to remove, as listed by GET /entries
#[derive(Debug, Clone, Deserialize)]
pub struct RemoveEntryQuery {
    /// The cache key
    pub key: String,
}

impl RemoveEntryQuery {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.key.is_empty() {
            return Some("Key cannot be empty".to_string());
        }
        None
    }
}
