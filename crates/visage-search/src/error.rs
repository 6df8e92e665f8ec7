//! Search orchestration error types.

use thiserror::Error;
use visage_storage::StorageError;
use visage_vector::VectorError;

/// Errors surfaced by the search engine.
///
/// Every failure keeps its specific kind; nothing is swallowed or
/// downgraded on the way to the caller.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Payload is not a usable image
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The image contains no detectable face
    #[error("No face detected in the image")]
    NoFaceDetected,

    /// The provider could not produce a vector
    #[error("Embedding failed: {0}")]
    EmbeddingFailed(String),

    /// Vector index failure (dimension, schema, availability)
    #[error(transparent)]
    Vector(#[from] VectorError),

    /// Metadata store failure
    #[error(transparent)]
    Metadata(#[from] StorageError),
}

impl SearchError {
    /// Whether the failure was caused by the request rather than the
    /// system. Client errors: bad payload, no detectable face.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            SearchError::InvalidInput(_) | SearchError::NoFaceDetected
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_classification() {
        assert!(SearchError::NoFaceDetected.is_client_error());
        assert!(SearchError::InvalidInput("not an image".to_string()).is_client_error());
        assert!(!SearchError::EmbeddingFailed("model".to_string()).is_client_error());
        assert!(!SearchError::Vector(VectorError::Unavailable("down".to_string()))
            .is_client_error());
    }
}
