//! Vector index error types.

use thiserror::Error;

/// Errors that can occur during vector index operations.
#[derive(Debug, Error)]
pub enum VectorError {
    /// Vector length does not match the index schema
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Index name already bound to a different schema
    #[error("Schema conflict for index '{name}': existing [{existing}], requested [{requested}]")]
    SchemaConflict {
        name: String,
        existing: String,
        requested: String,
    },

    /// Backend capability missing (fail fast, never degrade silently)
    #[error("Backend capability missing: {0}")]
    Unsupported(String),

    /// Backend is down or the storage engine failed
    #[error("Index unavailable: {0}")]
    Unavailable(String),

    /// Stored record could not be decoded
    #[error("Corrupt record: {0}")]
    Corrupt(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<rocksdb::Error> for VectorError {
    fn from(e: rocksdb::Error) -> Self {
        VectorError::Unavailable(e.to_string())
    }
}
