//! # visage-search
//!
//! Similarity search orchestration for Visage.
//!
//! Ties the embedding provider, vector index and metadata store together:
//! query image bytes go in, a ranked list of matches comes out. The engine
//! is constructed once at startup and passed by handle into every component
//! that needs it; there is no process-wide instance.

pub mod engine;
pub mod error;
pub mod result;

pub use engine::{similarity_from_distance, SearchEngine};
pub use error::SearchError;
pub use result::SearchMatch;
