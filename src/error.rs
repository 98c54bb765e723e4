//! Error types for the tiered cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the cache service and its tiers.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key is empty or longer than the allowed maximum
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Value could not be encoded to or decoded from JSON
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// The remote tier failed (connection, timeout, command error)
    #[error("Remote cache error: {0}")]
    Remote(String),

    /// Key not found in any tier
    #[error("Key not found: {0}")]
    NotFound(String),
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::Serialization(err.to_string())
    }
}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        CacheError::Remote(err.to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::InvalidKey(_)
            | CacheError::InvalidRequest(_)
            | CacheError::Serialization(_) => StatusCode::BAD_REQUEST,
            CacheError::Remote(_) => StatusCode::SERVICE_UNAVAILABLE,
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (CacheError::InvalidKey("k".into()), StatusCode::BAD_REQUEST),
            (CacheError::Serialization("x".into()), StatusCode::BAD_REQUEST),
            (CacheError::Remote("down".into()), StatusCode::SERVICE_UNAVAILABLE),
            (CacheError::NotFound("k".into()), StatusCode::NOT_FOUND),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_from_serde_error() {
        let err = serde_json::from_str::<u32>("not json").unwrap_err();
        let cache_err: CacheError = err.into();
        assert!(matches!(cache_err, CacheError::Serialization(_)));
    }
}
