//! Index schema.
//!
//! A schema is fixed at index creation and never auto-migrated: changing
//! the dimension or metric of live data requires an explicit re-indexing
//! procedure, because reinterpreting stored vector bytes under a different
//! dimension corrupts them undetectably.

use std::fmt;

use serde::{Deserialize, Serialize};
use visage_types::{DistanceMetric, StorageLayout};

/// The fixed contract an index is created with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSchema {
    /// Index name, unique within a store
    pub name: String,
    /// Embedding dimension; every stored and queried vector must match
    pub dimension: usize,
    /// Distance metric
    #[serde(default)]
    pub metric: DistanceMetric,
    /// Storage layout
    #[serde(default)]
    pub layout: StorageLayout,
}

impl IndexSchema {
    pub fn new(name: impl Into<String>, dimension: usize) -> Self {
        Self {
            name: name.into(),
            dimension,
            metric: DistanceMetric::default(),
            layout: StorageLayout::default(),
        }
    }

    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_layout(mut self, layout: StorageLayout) -> Self {
        self.layout = layout;
        self
    }
}

impl fmt::Display for IndexSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dim={} metric={} layout={}",
            self.dimension,
            self.metric.as_str(),
            self.layout.as_str()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_flat_l2() {
        let schema = IndexSchema::new("image_vectors", 512);
        assert_eq!(schema.metric, DistanceMetric::L2);
        assert_eq!(schema.layout, StorageLayout::Flat);
    }

    #[test]
    fn test_display_is_compact() {
        let schema = IndexSchema::new("faces", 128).with_metric(DistanceMetric::Cosine);
        assert_eq!(schema.to_string(), "dim=128 metric=cosine layout=flat");
    }

    #[test]
    fn test_schema_round_trips_through_json() {
        let schema = IndexSchema::new("faces", 64)
            .with_metric(DistanceMetric::Ip)
            .with_layout(StorageLayout::Hnsw);
        let json = serde_json::to_string(&schema).unwrap();
        let back: IndexSchema = serde_json::from_str(&json).unwrap();
        assert_eq!(back, schema);
    }
}
