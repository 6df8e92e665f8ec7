//! Exact-scan index backend.
//!
//! Every stored vector lives as one RocksDB record; a query decodes and
//! scores all of them under the schema metric. Exact by construction, and
//! the baseline the approximate backend is measured against.

use std::sync::Arc;

use rocksdb::{ColumnFamily, Direction, IteratorMode, DB};
use tracing::debug;

use visage_embeddings::Embedding;

use crate::codec::VectorCodec;
use crate::distance;
use crate::error::VectorError;
use crate::schema::IndexSchema;
use crate::store::{
    decode_record, encode_record, record_key, record_prefix, Neighbor, VectorBackend, CF_VECTORS,
};

/// Flat (exact scan) vector index.
pub struct FlatIndex {
    db: Arc<DB>,
    schema: IndexSchema,
    codec: VectorCodec,
}

impl FlatIndex {
    pub(crate) fn new(db: Arc<DB>, schema: IndexSchema) -> Self {
        let codec = VectorCodec::new(schema.dimension);
        Self { db, schema, codec }
    }

    fn cf(&self) -> &ColumnFamily {
        self.db.cf_handle(CF_VECTORS).expect("CF_VECTORS missing")
    }

    /// Iterate all records of this index, applying `f` to each decoded
    /// (id, values) pair.
    fn for_each_record<F>(&self, mut f: F) -> Result<(), VectorError>
    where
        F: FnMut(&str, &[f32]),
    {
        let prefix = record_prefix(&self.schema.name);
        let iter = self.db.iterator_cf(
            self.cf(),
            IteratorMode::From(prefix.as_slice(), Direction::Forward),
        );

        for item in iter {
            let (key, value) = item?;
            if !key.starts_with(&prefix) {
                break;
            }
            let (blob, id) = decode_record(&value, self.codec.encoded_len())?;
            let vector = self.codec.decode(blob)?;
            f(id, vector.as_slice());
        }
        Ok(())
    }
}

impl VectorBackend for FlatIndex {
    fn schema(&self) -> &IndexSchema {
        &self.schema
    }

    fn len(&self) -> Result<usize, VectorError> {
        let mut count = 0;
        self.for_each_record(|_, _| count += 1)?;
        Ok(count)
    }

    fn upsert(&self, id: &str, vector: &Embedding) -> Result<(), VectorError> {
        let blob = self.codec.encode(vector)?;
        let value = encode_record(&blob, id);
        self.db
            .put_cf(self.cf(), record_key(&self.schema.name, id), value)?;

        debug!(index = %self.schema.name, id = %id, "Upserted vector");
        Ok(())
    }

    fn remove(&self, id: &str) -> Result<bool, VectorError> {
        let key = record_key(&self.schema.name, id);
        let existed = self.db.get_cf(self.cf(), &key)?.is_some();
        if existed {
            self.db.delete_cf(self.cf(), &key)?;
            debug!(index = %self.schema.name, id = %id, "Removed vector");
        }
        Ok(existed)
    }

    fn query(&self, vector: &Embedding, k: usize) -> Result<Vec<Neighbor>, VectorError> {
        if vector.dimension() != self.schema.dimension {
            return Err(VectorError::DimensionMismatch {
                expected: self.schema.dimension,
                actual: vector.dimension(),
            });
        }

        let mut neighbors = Vec::new();
        self.for_each_record(|id, stored| {
            let d = distance::between(self.schema.metric, vector.as_slice(), stored);
            neighbors.push(Neighbor::new(id, d));
        })?;

        neighbors.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then_with(|| a.id.cmp(&b.id))
        });
        neighbors.truncate(k);

        debug!(index = %self.schema.name, k = k, found = neighbors.len(), "Query complete");
        Ok(neighbors)
    }
}
