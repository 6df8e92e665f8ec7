//! HNSW index backend using usearch.
//!
//! Approximate nearest neighbor over the same durable record store the flat
//! backend uses: RocksDB records remain the source of truth, the in-memory
//! graph is rebuilt from them at open. External string ids are mapped to
//! u64 graph keys through a persisted id map.
//!
//! Parameters tuned for quality over speed:
//! - M = 16 (connections per layer)
//! - ef_construction = 200 (build-time quality)
//! - ef_search = 100 (search-time quality)

use std::sync::{Arc, RwLock};

use rocksdb::{ColumnFamily, Direction, IteratorMode, WriteBatch, DB};
use tracing::{debug, info};
use usearch::{Index, IndexOptions, MetricKind, ScalarKind};

use visage_embeddings::Embedding;
use visage_types::DistanceMetric;

use crate::codec::VectorCodec;
use crate::error::VectorError;
use crate::schema::IndexSchema;
use crate::store::{
    decode_record, encode_record, record_key, record_prefix, Neighbor, VectorBackend, CF_IDMAP,
    CF_VECTORS,
};

const CONNECTIVITY: usize = 16;
const EXPANSION_ADD: usize = 200;
const EXPANSION_SEARCH: usize = 100;
const INITIAL_CAPACITY: usize = 1024;

fn metric_kind(metric: DistanceMetric) -> MetricKind {
    match metric {
        DistanceMetric::L2 => MetricKind::L2sq,
        DistanceMetric::Cosine => MetricKind::Cos,
        DistanceMetric::Ip => MetricKind::IP,
    }
}

/// usearch reports squared distances for L2; convert so both backends
/// report the same scale.
fn schema_distance(metric: DistanceMetric, raw: f32) -> f32 {
    match metric {
        DistanceMetric::L2 => raw.sqrt(),
        DistanceMetric::Cosine | DistanceMetric::Ip => raw,
    }
}

fn fwd_key(index: &str, id: &str) -> Vec<u8> {
    format!("{index}/fwd:{id}").into_bytes()
}

fn rev_key(index: &str, ann_key: u64) -> Vec<u8> {
    let mut key = format!("{index}/rev:").into_bytes();
    key.extend_from_slice(&ann_key.to_be_bytes());
    key
}

fn counter_key(index: &str) -> Vec<u8> {
    format!("{index}/next").into_bytes()
}

fn ann_key_from_bytes(bytes: &[u8]) -> Result<u64, VectorError> {
    let arr: [u8; 8] = bytes
        .try_into()
        .map_err(|_| VectorError::Corrupt("malformed ANN key".to_string()))?;
    Ok(u64::from_le_bytes(arr))
}

/// HNSW index wrapper around usearch.
///
/// The write lock also serializes id-map allocation, so concurrent upserts
/// never race on the key counter.
pub struct HnswIndex {
    db: Arc<DB>,
    schema: IndexSchema,
    codec: VectorCodec,
    index: RwLock<Index>,
}

impl HnswIndex {
    /// Open the index, rebuilding the in-memory graph from stored records.
    pub(crate) fn open(db: Arc<DB>, schema: IndexSchema) -> Result<Self, VectorError> {
        let codec = VectorCodec::new(schema.dimension);

        let options = IndexOptions {
            dimensions: schema.dimension,
            metric: metric_kind(schema.metric),
            quantization: ScalarKind::F32,
            connectivity: CONNECTIVITY,
            expansion_add: EXPANSION_ADD,
            expansion_search: EXPANSION_SEARCH,
            multi: false,
        };

        let index = Index::new(&options).map_err(|e| VectorError::Unsupported(e.to_string()))?;

        let cf_vectors = db.cf_handle(CF_VECTORS).expect("CF_VECTORS missing");
        let cf_idmap = db.cf_handle(CF_IDMAP).expect("CF_IDMAP missing");

        let prefix = record_prefix(&schema.name);
        let mut entries = Vec::new();
        let iter = db.iterator_cf(
            cf_vectors,
            IteratorMode::From(prefix.as_slice(), Direction::Forward),
        );
        for item in iter {
            let (key, value) = item?;
            if !key.starts_with(&prefix) {
                break;
            }
            let (blob, id) = decode_record(&value, codec.encoded_len())?;
            let vector = codec.decode(blob)?;
            let fwd = db
                .get_cf(cf_idmap, fwd_key(&schema.name, id))?
                .ok_or_else(|| VectorError::Corrupt(format!("no ANN key for id '{id}'")))?;
            entries.push((ann_key_from_bytes(&fwd)?, vector));
        }

        index
            .reserve(entries.len().max(INITIAL_CAPACITY))
            .map_err(|e| VectorError::Unavailable(e.to_string()))?;
        for (ann_key, vector) in &entries {
            index
                .add(*ann_key, vector.as_slice())
                .map_err(|e| VectorError::Unavailable(e.to_string()))?;
        }

        info!(index = %schema.name, vectors = entries.len(), "Rebuilt HNSW graph");
        Ok(Self {
            db,
            schema,
            codec,
            index: RwLock::new(index),
        })
    }

    fn vectors_cf(&self) -> &ColumnFamily {
        self.db.cf_handle(CF_VECTORS).expect("CF_VECTORS missing")
    }

    fn idmap_cf(&self) -> &ColumnFamily {
        self.db.cf_handle(CF_IDMAP).expect("CF_IDMAP missing")
    }

    fn next_ann_key(&self) -> Result<u64, VectorError> {
        match self.db.get_cf(self.idmap_cf(), counter_key(&self.schema.name))? {
            Some(bytes) => ann_key_from_bytes(&bytes),
            None => Ok(1),
        }
    }
}

impl VectorBackend for HnswIndex {
    fn schema(&self) -> &IndexSchema {
        &self.schema
    }

    fn len(&self) -> Result<usize, VectorError> {
        Ok(self.index.read().unwrap().size())
    }

    #[allow(clippy::readonly_write_lock)] // usearch::Index uses interior mutability
    fn upsert(&self, id: &str, vector: &Embedding) -> Result<(), VectorError> {
        let blob = self.codec.encode(vector)?;

        // Write lock guards the graph AND the key counter.
        let index = self.index.write().unwrap();

        let existing = self.db.get_cf(self.idmap_cf(), fwd_key(&self.schema.name, id))?;
        let ann_key = match &existing {
            Some(bytes) => {
                let key = ann_key_from_bytes(bytes)?;
                index
                    .remove(key)
                    .map_err(|e| VectorError::Unavailable(e.to_string()))?;
                key
            }
            None => self.next_ann_key()?,
        };

        if index.size() + 1 > index.capacity() {
            let grown = ((index.size() + 1) * 2).max(INITIAL_CAPACITY);
            index
                .reserve(grown)
                .map_err(|e| VectorError::Unavailable(e.to_string()))?;
        }

        index
            .add(ann_key, vector.as_slice())
            .map_err(|e| VectorError::Unavailable(e.to_string()))?;

        let mut batch = WriteBatch::default();
        batch.put_cf(
            self.vectors_cf(),
            record_key(&self.schema.name, id),
            encode_record(&blob, id),
        );
        if existing.is_none() {
            batch.put_cf(
                self.idmap_cf(),
                fwd_key(&self.schema.name, id),
                ann_key.to_le_bytes(),
            );
            batch.put_cf(
                self.idmap_cf(),
                rev_key(&self.schema.name, ann_key),
                id.as_bytes(),
            );
            batch.put_cf(
                self.idmap_cf(),
                counter_key(&self.schema.name),
                (ann_key + 1).to_le_bytes(),
            );
        }
        self.db.write(batch)?;

        debug!(index = %self.schema.name, id = %id, ann_key = ann_key, "Upserted vector");
        Ok(())
    }

    #[allow(clippy::readonly_write_lock)] // usearch::Index uses interior mutability
    fn remove(&self, id: &str) -> Result<bool, VectorError> {
        let index = self.index.write().unwrap();

        let Some(bytes) = self.db.get_cf(self.idmap_cf(), fwd_key(&self.schema.name, id))? else {
            return Ok(false);
        };
        let ann_key = ann_key_from_bytes(&bytes)?;

        index
            .remove(ann_key)
            .map_err(|e| VectorError::Unavailable(e.to_string()))?;

        let mut batch = WriteBatch::default();
        batch.delete_cf(self.vectors_cf(), record_key(&self.schema.name, id));
        batch.delete_cf(self.idmap_cf(), fwd_key(&self.schema.name, id));
        batch.delete_cf(self.idmap_cf(), rev_key(&self.schema.name, ann_key));
        self.db.write(batch)?;

        debug!(index = %self.schema.name, id = %id, "Removed vector");
        Ok(true)
    }

    fn query(&self, vector: &Embedding, k: usize) -> Result<Vec<Neighbor>, VectorError> {
        if vector.dimension() != self.schema.dimension {
            return Err(VectorError::DimensionMismatch {
                expected: self.schema.dimension,
                actual: vector.dimension(),
            });
        }

        let results = {
            let index = self.index.read().unwrap();
            index
                .search(vector.as_slice(), k)
                .map_err(|e| VectorError::Unavailable(e.to_string()))?
        };

        let mut neighbors = Vec::with_capacity(results.keys.len());
        for (ann_key, raw) in results.keys.iter().zip(results.distances.iter()) {
            let id_bytes = self
                .db
                .get_cf(self.idmap_cf(), rev_key(&self.schema.name, *ann_key))?
                .ok_or_else(|| {
                    VectorError::Corrupt(format!("no id for ANN key {ann_key}"))
                })?;
            let id = String::from_utf8(id_bytes)
                .map_err(|_| VectorError::Corrupt("stored id is not valid UTF-8".to_string()))?;
            neighbors.push(Neighbor::new(id, schema_distance(self.schema.metric, *raw)));
        }

        neighbors.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then_with(|| a.id.cmp(&b.id))
        });

        debug!(index = %self.schema.name, k = k, found = neighbors.len(), "Query complete");
        Ok(neighbors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::VectorStore;
    use tempfile::TempDir;
    use visage_types::StorageLayout;

    fn open_hnsw(temp: &TempDir, dimension: usize) -> Box<dyn VectorBackend> {
        let store = VectorStore::open(temp.path()).unwrap();
        store
            .ensure_index(
                IndexSchema::new("faces", dimension).with_layout(StorageLayout::Hnsw),
            )
            .unwrap()
    }

    fn embedding(values: &[f32]) -> Embedding {
        Embedding::new(values.to_vec())
    }

    #[test]
    fn test_add_and_search() {
        let temp = TempDir::new().unwrap();
        let index = open_hnsw(&temp, 3);

        index.upsert("a", &embedding(&[0.0, 0.0, 0.0])).unwrap();
        index.upsert("b", &embedding(&[2.0, 0.0, 0.0])).unwrap();

        let results = index.query(&embedding(&[0.0, 0.0, 0.0]), 2).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "a");
        // Euclidean scale, not usearch's squared value.
        assert!((results[1].distance - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_upsert_replaces_vector() {
        let temp = TempDir::new().unwrap();
        let index = open_hnsw(&temp, 2);

        index.upsert("doc", &embedding(&[9.0, 9.0])).unwrap();
        index.upsert("doc", &embedding(&[0.0, 0.0])).unwrap();

        assert_eq!(index.len().unwrap(), 1);
        let results = index.query(&embedding(&[0.0, 0.0]), 1).unwrap();
        assert!(results[0].distance.abs() < 1e-6);
    }

    #[test]
    fn test_remove() {
        let temp = TempDir::new().unwrap();
        let index = open_hnsw(&temp, 2);

        index.upsert("doc", &embedding(&[1.0, 0.0])).unwrap();
        assert!(index.remove("doc").unwrap());
        assert!(!index.remove("doc").unwrap());
        assert_eq!(index.len().unwrap(), 0);
    }

    #[test]
    fn test_empty_index_returns_empty() {
        let temp = TempDir::new().unwrap();
        let index = open_hnsw(&temp, 4);
        let results = index.query(&embedding(&[0.0; 4]), 5).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_graph_rebuilds_after_reopen() {
        let temp = TempDir::new().unwrap();
        {
            let index = open_hnsw(&temp, 2);
            index.upsert("kept", &embedding(&[0.5, 0.5])).unwrap();
            index.upsert("other", &embedding(&[8.0, 8.0])).unwrap();
        }

        let index = open_hnsw(&temp, 2);
        assert_eq!(index.len().unwrap(), 2);
        let results = index.query(&embedding(&[0.5, 0.5]), 1).unwrap();
        assert_eq!(results[0].id, "kept");
    }

    #[test]
    fn test_query_rejects_wrong_dimension() {
        let temp = TempDir::new().unwrap();
        let index = open_hnsw(&temp, 4);
        let result = index.query(&embedding(&[1.0; 3]), 2);
        assert!(matches!(
            result,
            Err(VectorError::DimensionMismatch { .. })
        ));
    }
}
