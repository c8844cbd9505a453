//! Error types for the façade and the storage engine boundary.

use crate::domain::condition::TranslationError;
use crate::domain::schema::SchemaError;
use thiserror::Error;

/// Result type for storage engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Result type for façade operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Failures raised by a storage engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported by storage engine: {0}")]
    Unsupported(String),
}

/// Failures surfaced by the CRUD façade.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("table '{0}' is not registered")]
    TableNotRegistered(String),

    #[error("invalid schema: {0}")]
    Schema(#[from] SchemaError),

    #[error("invalid condition: {0}")]
    Translation(#[from] TranslationError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}
