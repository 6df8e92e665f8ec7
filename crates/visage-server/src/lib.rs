//! # visage-server
//!
//! HTTP surface for the Visage face-similarity search engine.
//!
//! A single search operation accepting raw image bytes, plus ingest and
//! removal endpoints and a health check. The engine context is built once
//! at startup and shared through router state.

pub mod response;
pub mod routes;

use std::sync::Arc;

use visage_embeddings::FaceEmbedder;
use visage_search::SearchEngine;
use visage_storage::ImageMetadata;
use visage_types::Settings;
use visage_vector::{IndexSchema, VectorStore};

pub use routes::build_router;

/// Shared router state.
pub struct AppState {
    pub engine: SearchEngine,
}

/// Construct the engine context from settings and a provider.
///
/// Fails fast on any unusable store or schema conflict; nothing is served
/// until every collaborator is up.
pub fn build_state(
    settings: &Settings,
    embedder: Arc<dyn FaceEmbedder>,
) -> anyhow::Result<Arc<AppState>> {
    let store = VectorStore::open(&settings.index_path)?;
    let schema = IndexSchema::new(&settings.index_name, settings.dimension)
        .with_metric(settings.metric)
        .with_layout(settings.layout);
    let index = store.ensure_index(schema)?;
    let metadata = ImageMetadata::open(&settings.metadata_path)?;

    let engine = SearchEngine::new(embedder, Arc::from(index), Arc::new(metadata));
    Ok(Arc::new(AppState { engine }))
}
