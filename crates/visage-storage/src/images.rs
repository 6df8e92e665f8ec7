//! Image metadata storage.
//!
//! Maps externally assigned image ids to their document record. Stored in
//! RocksDB as JSON values; absence of a record is a valid outcome, not an
//! error.

use std::path::Path;

use chrono::{DateTime, Utc};
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, Options, DB};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::StorageError;

/// Column family name for image records
pub const CF_IMAGES: &str = "images";

/// Per-image document record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Externally assigned id, shared with the vector index
    pub id: String,
    /// URL the image itself was fetched from
    pub url: String,
    /// Page the image was found on, when known
    #[serde(default)]
    pub source_url: Option<String>,
    /// Hex digest of the image bytes
    pub content_hash: String,
    /// When the record was created
    pub created_at: DateTime<Utc>,
}

impl ImageRecord {
    pub fn new(
        id: impl Into<String>,
        url: impl Into<String>,
        content_hash: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            source_url: None,
            content_hash: content_hash.into(),
            created_at: Utc::now(),
        }
    }

    /// Set the source page URL (builder pattern).
    pub fn with_source_url(mut self, source_url: Option<String>) -> Self {
        self.source_url = source_url;
        self
    }
}

/// Image metadata storage using RocksDB.
pub struct ImageMetadata {
    db: DB,
}

impl ImageMetadata {
    /// Open or create metadata storage.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf = ColumnFamilyDescriptor::new(CF_IMAGES, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf])?;

        info!(path = ?path, "Opened image metadata storage");
        Ok(Self { db })
    }

    fn cf(&self) -> &ColumnFamily {
        self.db.cf_handle(CF_IMAGES).expect("CF_IMAGES missing")
    }

    /// Store an image record, replacing any previous record for the id.
    pub fn put(&self, record: &ImageRecord) -> Result<(), StorageError> {
        let value = serde_json::to_vec(record)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.db.put_cf(self.cf(), record.id.as_bytes(), value)?;

        debug!(id = %record.id, url = %record.url, "Stored image record");
        Ok(())
    }

    /// Get an image record by id.
    pub fn get(&self, id: &str) -> Result<Option<ImageRecord>, StorageError> {
        match self.db.get_cf(self.cf(), id.as_bytes())? {
            Some(bytes) => {
                let record: ImageRecord = serde_json::from_slice(&bytes)
                    .map_err(|e| StorageError::Serialization(e.to_string()))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Delete an image record by id. Returns whether it existed.
    pub fn delete(&self, id: &str) -> Result<bool, StorageError> {
        let existed = self.db.get_cf(self.cf(), id.as_bytes())?.is_some();
        if existed {
            self.db.delete_cf(self.cf(), id.as_bytes())?;
        }
        Ok(existed)
    }

    /// Count total records
    pub fn count(&self) -> Result<usize, StorageError> {
        let iter = self.db.iterator_cf(self.cf(), rocksdb::IteratorMode::Start);
        let mut count = 0;
        for item in iter {
            item?;
            count += 1;
        }
        Ok(count)
    }
}
