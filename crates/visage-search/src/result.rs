//! Search result types.

use serde::Serialize;

/// One ranked match. Ephemeral: constructed per query, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct SearchMatch {
    /// Id of the indexed vector
    pub id: String,
    /// Raw distance under the index metric (lower = more similar)
    pub distance: f32,
    /// Human-interpretable score, strictly decreasing in distance
    pub similarity: f32,
    /// Image URL from the metadata store; falls back to the id when no
    /// record exists
    pub url: String,
    /// Page the image was found on, when the metadata store knows it
    pub source_url: Option<String>,
}
