//! Embedding provider error types.

use thiserror::Error;

/// Errors that can occur while detecting faces or computing embeddings.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// Payload could not be read as an image
    #[error("Invalid image payload: {0}")]
    InvalidImage(String),

    /// Provider could not produce a vector for the chosen region
    #[error("Embedding failed: {0}")]
    Failed(String),

    /// Vector produced with the wrong dimension
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}
