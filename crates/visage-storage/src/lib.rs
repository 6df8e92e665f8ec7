//! # visage-storage
//!
//! Image metadata storage for Visage.
//!
//! Holds the per-image document record (source URL, content hash,
//! timestamps) that decorates search results. Vectors are NOT stored here;
//! the vector index owns them.

pub mod error;
pub mod images;

pub use error::StorageError;
pub use images::{ImageMetadata, ImageRecord, CF_IMAGES};
