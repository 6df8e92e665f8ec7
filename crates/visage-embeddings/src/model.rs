//! Embedding provider trait and types.
//!
//! Defines the interface for turning image bytes into comparable
//! fixed-dimension vectors.

use crate::error::EmbeddingError;
use crate::region::FaceRegion;

/// Fixed-length vector summarizing a face's identity-relevant features.
///
/// Immutable once produced. Values are stored exactly as the provider
/// returned them; no normalization is applied, so encoding and decoding
/// round-trips are bit-exact.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    /// The embedding vector
    pub values: Vec<f32>,
}

impl Embedding {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values }
    }

    /// Get the embedding dimension
    pub fn dimension(&self) -> usize {
        self.values.len()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }
}

impl From<Vec<f32>> for Embedding {
    fn from(values: Vec<f32>) -> Self {
        Self::new(values)
    }
}

/// Provider information
#[derive(Debug, Clone)]
pub struct EmbedderInfo {
    /// Provider name (e.g., "facenet-vggface2")
    pub name: String,
    /// Embedding dimension the provider produces
    pub dimension: usize,
}

/// Trait for face embedding providers.
///
/// Implementations must be thread-safe (Send + Sync) for concurrent use.
/// Failures are opaque to callers: anything the provider cannot handle is
/// reported through [`EmbeddingError`], never panicked on.
pub trait FaceEmbedder: Send + Sync {
    /// Get provider information
    fn info(&self) -> &EmbedderInfo;

    /// Detect face regions in an image.
    ///
    /// Returns an empty vector when the image contains no detectable face;
    /// that is a valid outcome, not an error.
    fn detect_faces(&self, image: &[u8]) -> Result<Vec<FaceRegion>, EmbeddingError>;

    /// Compute the embedding for one detected region.
    fn embed(&self, image: &[u8], region: &FaceRegion) -> Result<Embedding, EmbeddingError>;
}
