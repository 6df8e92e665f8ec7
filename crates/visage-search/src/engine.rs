//! Search engine orchestration.
//!
//! End-to-end query path: image bytes -> embedding provider -> vector
//! index -> metadata decoration -> ranked matches. No retries anywhere;
//! each step either succeeds or fails the request with its specific kind.

use std::sync::Arc;

use sha2::{Digest, Sha256};
use tokio::task;
use tracing::{debug, info};

use visage_embeddings::{Embedding, EmbeddingError, FaceEmbedder};
use visage_storage::{ImageMetadata, ImageRecord};
use visage_vector::VectorBackend;

use crate::error::SearchError;
use crate::result::SearchMatch;

/// Convert a distance into a bounded, human-interpretable score.
///
/// Strictly decreasing in distance, so ranking by similarity equals
/// ranking by ascending distance. 100 at distance zero.
pub fn similarity_from_distance(distance: f32) -> f32 {
    100.0 / (1.0 + distance)
}

/// Similarity search engine.
///
/// Holds one long-lived handle to each collaborator. Constructed once at
/// startup and shared via `Arc`; query results are never cached across
/// requests.
pub struct SearchEngine {
    embedder: Arc<dyn FaceEmbedder>,
    index: Arc<dyn VectorBackend>,
    metadata: Arc<ImageMetadata>,
}

impl SearchEngine {
    pub fn new(
        embedder: Arc<dyn FaceEmbedder>,
        index: Arc<dyn VectorBackend>,
        metadata: Arc<ImageMetadata>,
    ) -> Self {
        Self {
            embedder,
            index,
            metadata,
        }
    }

    /// Embedding dimension the engine's index was created with
    pub fn dimension(&self) -> usize {
        self.index.schema().dimension
    }

    /// Number of indexed vectors
    pub fn indexed_count(&self) -> Result<usize, SearchError> {
        Ok(self.index.len()?)
    }

    /// Detect faces and embed the dominant one.
    ///
    /// Region selection is positional: the first region as returned by the
    /// detector, not the largest or most confident one.
    async fn embed_face(&self, image: Vec<u8>) -> Result<Embedding, SearchError> {
        let embedder = Arc::clone(&self.embedder);

        // Embedding is CPU-bound provider work; keep it off the async threads.
        task::spawn_blocking(move || {
            let regions = embedder
                .detect_faces(&image)
                .map_err(map_embedding_error)?;
            if regions.is_empty() {
                return Err(SearchError::NoFaceDetected);
            }
            debug!(faces = regions.len(), "Detected face regions");

            let region = regions[0];
            embedder.embed(&image, &region).map_err(map_embedding_error)
        })
        .await
        .map_err(|e| SearchError::EmbeddingFailed(format!("task error: {e}")))?
    }

    /// Find the indexed images most similar to the face in `image`.
    ///
    /// Results are sorted descending by similarity, which is the index's
    /// ascending-distance order with ties broken by ascending id.
    pub async fn search_by_image(
        &self,
        image: &[u8],
        limit: usize,
    ) -> Result<Vec<SearchMatch>, SearchError> {
        let embedding = self.embed_face(image.to_vec()).await?;
        let neighbors = self.index.query(&embedding, limit)?;

        let mut matches = Vec::with_capacity(neighbors.len());
        for neighbor in neighbors {
            let record = self.metadata.get(&neighbor.id)?;
            let (url, source_url) = match record {
                Some(r) => (r.url, r.source_url),
                None => (neighbor.id.clone(), None),
            };
            matches.push(SearchMatch {
                similarity: similarity_from_distance(neighbor.distance),
                distance: neighbor.distance,
                id: neighbor.id,
                url,
                source_url,
            });
        }

        info!(results = matches.len(), limit = limit, "Search complete");
        Ok(matches)
    }

    /// Index an image under an externally assigned id: embed its dominant
    /// face, upsert the vector, then write the metadata record.
    pub async fn index_image(
        &self,
        id: &str,
        image: &[u8],
        url: Option<&str>,
        source_url: Option<&str>,
    ) -> Result<(), SearchError> {
        let embedding = self.embed_face(image.to_vec()).await?;
        self.index.upsert(id, &embedding)?;

        let record = ImageRecord::new(id, url.unwrap_or(id), content_digest(image))
            .with_source_url(source_url.map(String::from));
        self.metadata.put(&record)?;

        info!(id = %id, "Indexed image");
        Ok(())
    }

    /// Remove an image's vector and metadata record. Returns whether a
    /// vector existed.
    pub async fn remove_image(&self, id: &str) -> Result<bool, SearchError> {
        let removed = self.index.remove(id)?;
        self.metadata.delete(id)?;

        info!(id = %id, removed = removed, "Removed image");
        Ok(removed)
    }
}

fn map_embedding_error(e: EmbeddingError) -> SearchError {
    match e {
        EmbeddingError::InvalidImage(msg) => SearchError::InvalidInput(msg),
        other => SearchError::EmbeddingFailed(other.to_string()),
    }
}

fn content_digest(image: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(image);
    format!("{:x}", hasher.finalize())
}
