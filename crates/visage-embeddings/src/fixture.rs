//! Fixture embedding provider.
//!
//! A deterministic [`FaceEmbedder`] that returns pre-registered regions and
//! vectors, keyed by a digest of the image bytes. Used by tests and local
//! development; real neural providers implement the trait out of tree.

use std::collections::HashMap;

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::EmbeddingError;
use crate::model::{EmbedderInfo, Embedding, FaceEmbedder};
use crate::region::FaceRegion;

/// One registered image: its detectable regions and the vector produced for
/// each region, positionally matched.
#[derive(Debug, Clone)]
struct ImageFixture {
    regions: Vec<FaceRegion>,
    vectors: Vec<Embedding>,
}

/// Embedding provider backed by registered fixture data.
///
/// Images that were never registered detect zero faces. A region that was
/// not registered for an image fails to embed, mirroring a provider that
/// cannot process a degenerate crop.
pub struct FixtureEmbedder {
    info: EmbedderInfo,
    images: HashMap<String, ImageFixture>,
}

impl FixtureEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            info: EmbedderInfo {
                name: "fixture".to_string(),
                dimension,
            },
            images: HashMap::new(),
        }
    }

    /// Register an image with its regions and per-region vectors.
    ///
    /// Panics if the counts differ or any vector has the wrong dimension;
    /// fixtures are authored by tests, so malformed ones are a bug there.
    pub fn register(
        &mut self,
        image: &[u8],
        regions: Vec<FaceRegion>,
        vectors: Vec<Embedding>,
    ) -> &mut Self {
        assert_eq!(
            regions.len(),
            vectors.len(),
            "one vector per region required"
        );
        for vector in &vectors {
            assert_eq!(
                vector.dimension(),
                self.info.dimension,
                "fixture vector dimension must match provider dimension"
            );
        }
        self.images
            .insert(digest(image), ImageFixture { regions, vectors });
        self
    }

    /// Register an image with a single full-frame face and its vector.
    pub fn register_face(&mut self, image: &[u8], vector: Embedding) -> &mut Self {
        let region = FaceRegion::new(0.0, 0.0, 160.0, 160.0);
        self.register(image, vec![region], vec![vector])
    }
}

impl FaceEmbedder for FixtureEmbedder {
    fn info(&self) -> &EmbedderInfo {
        &self.info
    }

    fn detect_faces(&self, image: &[u8]) -> Result<Vec<FaceRegion>, EmbeddingError> {
        if image.is_empty() {
            return Err(EmbeddingError::InvalidImage("empty payload".to_string()));
        }
        let key = digest(image);
        let regions = self
            .images
            .get(&key)
            .map(|fixture| fixture.regions.clone())
            .unwrap_or_default();
        debug!(image = %key, faces = regions.len(), "Fixture detection");
        Ok(regions)
    }

    fn embed(&self, image: &[u8], region: &FaceRegion) -> Result<Embedding, EmbeddingError> {
        let fixture = self
            .images
            .get(&digest(image))
            .ok_or_else(|| EmbeddingError::Failed("image not registered".to_string()))?;

        let position = fixture
            .regions
            .iter()
            .position(|candidate| candidate == region)
            .ok_or_else(|| EmbeddingError::Failed("region not registered".to_string()))?;

        Ok(fixture.vectors[position].clone())
    }
}

fn digest(image: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(image);
    format!("{:x}", hasher.finalize())
}
