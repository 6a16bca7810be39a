//! Error types for the wordbook service
//!
//! Provides unified error handling using thiserror.
//!
//! `CacheError` never leaves the cache module: cache-layer failures are
//! logged and degrade to a direct fetch. `DbError` comes from the store and
//! `AppError` is what services and handlers return.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Failures inside the cache layer.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Arguments of a cached call could not be turned into a key
    #[error("Cache key for `{0}` could not be serialized: {1}")]
    KeySerialization(&'static str, String),

    /// A stored value could not be read back as the requested type
    #[error("Cached value for `{0}` has an unexpected type")]
    TypeMismatch(String),

    /// A tag string does not match any known tag shape
    #[error("Invalid tag: {0}")]
    InvalidTag(String),
}

// == Db Error Enum ==
/// Failures reported by the in-process store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DbError {
    /// A row references another row that does not exist
    #[error("{0} not found")]
    MissingReference(String),

    /// A unique constraint would be violated
    #[error("Duplicate {0}")]
    Duplicate(String),
}

// == App Error Enum ==
/// Error type returned by services and API handlers.
#[derive(Error, Debug)]
pub enum AppError {
    /// No caller identity, or the account is unknown
    #[error("Authentication required")]
    Unauthorized,

    /// Caller does not own the resource
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// Resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Store failure
    #[error(transparent)]
    Db(#[from] DbError),
}

// == IntoResponse Implementation ==
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Db(DbError::MissingReference(_)) => StatusCode::NOT_FOUND,
            AppError::Db(DbError::Duplicate(_)) => StatusCode::CONFLICT,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for services and handlers.
pub type Result<T> = std::result::Result<T, AppError>;
