//! # visage-vector
//!
//! Durable vector index with K-nearest-neighbor retrieval for Visage.
//!
//! The store owns the index schema (dimension, distance metric, storage
//! layout) and the binary wire encoding of stored vectors. Creating an
//! index is idempotent: a name is bound to exactly one schema for its
//! lifetime, and conflicting re-creation fails instead of silently
//! reinterpreting stored bytes.
//!
//! ## Features
//! - `VectorCodec`: fixed-width little-endian f32 wire encoding
//! - `FlatIndex`: exact scan over RocksDB-backed records
//! - `HnswIndex`: approximate search via usearch (behind the `hnsw` feature)
//! - Deterministic ordering: ascending distance, ties by ascending id

pub mod codec;
pub mod distance;
pub mod error;
pub mod flat;
#[cfg(feature = "hnsw")]
pub mod hnsw;
pub mod schema;
pub mod store;

pub use codec::VectorCodec;
pub use error::VectorError;
pub use flat::FlatIndex;
#[cfg(feature = "hnsw")]
pub use hnsw::HnswIndex;
pub use schema::IndexSchema;
pub use store::{Neighbor, VectorBackend, VectorStore, CF_IDMAP, CF_SCHEMAS, CF_VECTORS};
