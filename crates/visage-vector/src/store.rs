//! Vector store: schema registry and backend construction.
//!
//! One RocksDB instance holds every index of a store. Each stored vector is
//! a single record keyed `"<index>/image:<id>"`; the value is the encoded
//! vector blob (exactly `4 * dimension` bytes) followed by the plain-text
//! id. One put per upsert, so a record is never partially written.

use std::sync::Arc;

use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, Options, DB};
use tracing::info;

use visage_embeddings::Embedding;
use visage_types::StorageLayout;

use crate::error::VectorError;
use crate::flat::FlatIndex;
use crate::schema::IndexSchema;

/// Column family holding index schemas, keyed by index name
pub const CF_SCHEMAS: &str = "schemas";
/// Column family holding vector records
pub const CF_VECTORS: &str = "vectors";
/// Column family mapping string ids to ANN keys (HNSW layout only)
pub const CF_IDMAP: &str = "idmap";

/// Key prefix for vector records of an index.
pub(crate) fn record_prefix(index: &str) -> Vec<u8> {
    format!("{index}/image:").into_bytes()
}

/// Key of one vector record.
pub(crate) fn record_key(index: &str, id: &str) -> Vec<u8> {
    format!("{index}/image:{id}").into_bytes()
}

/// Record value: vector blob followed by the plain-text id.
pub(crate) fn encode_record(vector_blob: &[u8], id: &str) -> Vec<u8> {
    let mut value = Vec::with_capacity(vector_blob.len() + id.len());
    value.extend_from_slice(vector_blob);
    value.extend_from_slice(id.as_bytes());
    value
}

/// Split a record value back into vector blob and id. The blob length is
/// fixed by the schema, so no length framing is needed.
pub(crate) fn decode_record(value: &[u8], blob_len: usize) -> Result<(&[u8], &str), VectorError> {
    if value.len() < blob_len {
        return Err(VectorError::Corrupt(format!(
            "record too short: {} bytes, need at least {blob_len}",
            value.len()
        )));
    }
    let (blob, id_bytes) = value.split_at(blob_len);
    let id = std::str::from_utf8(id_bytes)
        .map_err(|_| VectorError::Corrupt("record id is not valid UTF-8".to_string()))?;
    Ok((blob, id))
}

/// One (id, distance) pair returned by a KNN query.
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    /// Externally assigned record id
    pub id: String,
    /// Distance under the index schema's metric (lower = more similar)
    pub distance: f32,
}

impl Neighbor {
    pub fn new(id: impl Into<String>, distance: f32) -> Self {
        Self {
            id: id.into(),
            distance,
        }
    }
}

/// Trait for vector index backends.
///
/// Implementations must be thread-safe; the store assumes no exclusivity
/// and never caches query results across requests.
pub trait VectorBackend: Send + Sync {
    /// The schema this index was created with
    fn schema(&self) -> &IndexSchema;

    /// Number of vectors currently stored
    fn len(&self) -> Result<usize, VectorError>;

    fn is_empty(&self) -> Result<bool, VectorError> {
        Ok(self.len()? == 0)
    }

    /// Insert or fully replace the vector stored under `id`.
    fn upsert(&self, id: &str, vector: &Embedding) -> Result<(), VectorError>;

    /// Remove the vector stored under `id`. Returns whether it existed.
    fn remove(&self, id: &str) -> Result<bool, VectorError>;

    /// Return up to `k` stored vectors closest to `vector`, ascending by
    /// distance, ties broken by ascending id. Fewer than `k` stored means
    /// all of them; an empty index yields an empty result, not an error.
    fn query(&self, vector: &Embedding, k: usize) -> Result<Vec<Neighbor>, VectorError>;
}

/// Durable vector store owning the RocksDB handle.
pub struct VectorStore {
    db: Arc<DB>,
}

impl VectorStore {
    /// Open or create the store at `path`.
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, VectorError> {
        let path = path.as_ref();

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cfs = vec![
            ColumnFamilyDescriptor::new(CF_SCHEMAS, Options::default()),
            ColumnFamilyDescriptor::new(CF_VECTORS, Options::default()),
            ColumnFamilyDescriptor::new(CF_IDMAP, Options::default()),
        ];

        let db = DB::open_cf_descriptors(&opts, path, cfs)?;

        info!(path = ?path, "Opened vector store");
        Ok(Self { db: Arc::new(db) })
    }

    fn schemas_cf(&self) -> &ColumnFamily {
        self.db.cf_handle(CF_SCHEMAS).expect("CF_SCHEMAS missing")
    }

    /// Idempotent index creation.
    ///
    /// No stored schema: persists the given one and opens the backend.
    /// Identical stored schema: opens the backend, no modification.
    /// Any difference (dimension, metric or layout): `SchemaConflict`.
    /// A layout whose capability is not compiled in: `Unsupported`.
    pub fn ensure_index(&self, schema: IndexSchema) -> Result<Box<dyn VectorBackend>, VectorError> {
        match self.db.get_cf(self.schemas_cf(), schema.name.as_bytes())? {
            Some(bytes) => {
                let existing: IndexSchema = serde_json::from_slice(&bytes)
                    .map_err(|e| VectorError::Serialization(e.to_string()))?;
                if existing != schema {
                    return Err(VectorError::SchemaConflict {
                        name: schema.name.clone(),
                        existing: existing.to_string(),
                        requested: schema.to_string(),
                    });
                }
                info!(index = %schema.name, "Index already exists");
            }
            None => {
                let bytes = serde_json::to_vec(&schema)
                    .map_err(|e| VectorError::Serialization(e.to_string()))?;
                self.db
                    .put_cf(self.schemas_cf(), schema.name.as_bytes(), bytes)?;
                info!(index = %schema.name, schema = %schema, "Created index");
            }
        }

        self.open_backend(schema)
    }

    fn open_backend(&self, schema: IndexSchema) -> Result<Box<dyn VectorBackend>, VectorError> {
        match schema.layout {
            StorageLayout::Flat => Ok(Box::new(FlatIndex::new(Arc::clone(&self.db), schema))),
            #[cfg(feature = "hnsw")]
            StorageLayout::Hnsw => Ok(Box::new(crate::hnsw::HnswIndex::open(
                Arc::clone(&self.db),
                schema,
            )?)),
            #[cfg(not(feature = "hnsw"))]
            StorageLayout::Hnsw => Err(VectorError::Unsupported(
                "storage layout 'hnsw' not compiled in (enable the `hnsw` feature)".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use visage_types::DistanceMetric;

    #[test]
    fn test_ensure_index_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let store = VectorStore::open(temp.path()).unwrap();

        let schema = IndexSchema::new("faces", 8);
        let first = store.ensure_index(schema.clone()).unwrap();
        first.upsert("a", &Embedding::new(vec![0.5; 8])).unwrap();

        // Identical schema: succeeds, nothing lost.
        let second = store.ensure_index(schema).unwrap();
        assert_eq!(second.len().unwrap(), 1);
    }

    #[test]
    fn test_ensure_index_rejects_different_dimension() {
        let temp = TempDir::new().unwrap();
        let store = VectorStore::open(temp.path()).unwrap();

        store.ensure_index(IndexSchema::new("faces", 8)).unwrap();
        let result = store.ensure_index(IndexSchema::new("faces", 16));
        assert!(matches!(result, Err(VectorError::SchemaConflict { .. })));
    }

    #[test]
    fn test_ensure_index_rejects_different_metric() {
        let temp = TempDir::new().unwrap();
        let store = VectorStore::open(temp.path()).unwrap();

        store.ensure_index(IndexSchema::new("faces", 8)).unwrap();
        let result =
            store.ensure_index(IndexSchema::new("faces", 8).with_metric(DistanceMetric::Cosine));
        assert!(matches!(result, Err(VectorError::SchemaConflict { .. })));
    }

    #[test]
    fn test_schema_survives_reopen() {
        let temp = TempDir::new().unwrap();
        {
            let store = VectorStore::open(temp.path()).unwrap();
            store.ensure_index(IndexSchema::new("faces", 8)).unwrap();
        }

        let store = VectorStore::open(temp.path()).unwrap();
        let result = store.ensure_index(IndexSchema::new("faces", 32));
        assert!(matches!(result, Err(VectorError::SchemaConflict { .. })));
    }

    #[test]
    fn test_independent_indexes_coexist() {
        let temp = TempDir::new().unwrap();
        let store = VectorStore::open(temp.path()).unwrap();

        let faces = store.ensure_index(IndexSchema::new("faces", 4)).unwrap();
        let scenes = store.ensure_index(IndexSchema::new("scenes", 4)).unwrap();

        faces.upsert("f1", &Embedding::new(vec![0.0; 4])).unwrap();
        assert_eq!(faces.len().unwrap(), 1);
        assert_eq!(scenes.len().unwrap(), 0);
    }

    #[cfg(not(feature = "hnsw"))]
    #[test]
    fn test_missing_capability_fails_fast() {
        let temp = TempDir::new().unwrap();
        let store = VectorStore::open(temp.path()).unwrap();

        let result =
            store.ensure_index(IndexSchema::new("faces", 8).with_layout(StorageLayout::Hnsw));
        assert!(matches!(result, Err(VectorError::Unsupported(_))));
    }

    #[test]
    fn test_record_codec_helpers() {
        let value = encode_record(&[1, 2, 3, 4], "doc-1");
        let (blob, id) = decode_record(&value, 4).unwrap();
        assert_eq!(blob, &[1, 2, 3, 4]);
        assert_eq!(id, "doc-1");
    }

    #[test]
    fn test_decode_record_rejects_short_value() {
        let result = decode_record(&[1, 2], 4);
        assert!(matches!(result, Err(VectorError::Corrupt(_))));
    }
}
