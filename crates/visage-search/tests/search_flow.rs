//! End-to-end search flow over both index layouts.

use std::sync::Arc;

use tempfile::TempDir;
use visage_embeddings::{Embedding, FixtureEmbedder};
use visage_search::{SearchEngine, SearchError};
use visage_storage::ImageMetadata;
use visage_types::StorageLayout;
use visage_vector::{IndexSchema, VectorError, VectorStore};

const DIM: usize = 16;

fn vector(seed: f32) -> Embedding {
    Embedding::new((0..DIM).map(|i| seed + i as f32 * 0.05).collect())
}

fn build_engine(temp: &TempDir, layout: StorageLayout, embedder: FixtureEmbedder) -> SearchEngine {
    let store = VectorStore::open(temp.path().join("vectors")).unwrap();
    let index = store
        .ensure_index(IndexSchema::new("image_vectors", DIM).with_layout(layout))
        .unwrap();
    let metadata = ImageMetadata::open(temp.path().join("metadata")).unwrap();
    SearchEngine::new(Arc::new(embedder), Arc::from(index), Arc::new(metadata))
}

#[tokio::test]
async fn flat_engine_round_trip() {
    let temp = TempDir::new().unwrap();
    let mut embedder = FixtureEmbedder::new(DIM);
    embedder.register_face(b"query", vector(0.0));
    embedder.register_face(b"stored", vector(0.0));
    let engine = build_engine(&temp, StorageLayout::Flat, embedder);

    engine
        .index_image("42", b"stored", Some("https://example.com/42.jpg"), None)
        .await
        .unwrap();

    let matches = engine.search_by_image(b"query", 5).await.unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].id, "42");
    assert_eq!(matches[0].url, "https://example.com/42.jpg");
    assert!((matches[0].similarity - 100.0).abs() < 1e-4);
}

#[tokio::test]
async fn hnsw_engine_round_trip() {
    let temp = TempDir::new().unwrap();
    let mut embedder = FixtureEmbedder::new(DIM);
    embedder.register_face(b"query", vector(0.0));
    embedder.register_face(b"near", vector(0.1));
    embedder.register_face(b"far", vector(9.0));
    let engine = build_engine(&temp, StorageLayout::Hnsw, embedder);

    engine.index_image("near", b"near", None, None).await.unwrap();
    engine.index_image("far", b"far", None, None).await.unwrap();

    let matches = engine.search_by_image(b"query", 2).await.unwrap();
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].id, "near");
    assert!(matches[0].similarity > matches[1].similarity);
}

#[tokio::test]
async fn provider_dimension_mismatch_surfaces_with_its_kind() {
    let temp = TempDir::new().unwrap();
    // Provider produces 4-dim vectors; the index expects 16.
    let mut embedder = FixtureEmbedder::new(4);
    embedder.register_face(b"query", Embedding::new(vec![0.5; 4]));

    let store = VectorStore::open(temp.path().join("vectors")).unwrap();
    let index = store
        .ensure_index(IndexSchema::new("image_vectors", DIM))
        .unwrap();
    let metadata = ImageMetadata::open(temp.path().join("metadata")).unwrap();
    let engine = SearchEngine::new(Arc::new(embedder), Arc::from(index), Arc::new(metadata));

    let result = engine.search_by_image(b"query", 5).await;
    match result {
        Err(SearchError::Vector(VectorError::DimensionMismatch { expected, actual })) => {
            assert_eq!(expected, DIM);
            assert_eq!(actual, 4);
        }
        other => panic!("expected DimensionMismatch, got {other:?}"),
    }
}
