//! Error types for the Pet Care application

use thiserror::Error;

/// Domain-level error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Errors raised while encoding or decoding persisted collections
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported schema version: {0}")]
    UnsupportedSchema(u64),

    #[error("Malformed document: {0}")]
    Malformed(String),
}
