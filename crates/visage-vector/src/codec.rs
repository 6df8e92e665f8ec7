//! Vector wire encoding.
//!
//! Stored and queried vectors travel as fixed-width little-endian 32-bit
//! float blobs of exactly `4 * dimension` bytes. Decoding is the exact
//! inverse of encoding, bit-exact for finite f32 values.

use visage_embeddings::Embedding;

use crate::error::VectorError;

/// Codec bound to one index dimension.
#[derive(Debug, Clone, Copy)]
pub struct VectorCodec {
    dimension: usize,
}

impl VectorCodec {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Byte length of an encoded vector.
    pub fn encoded_len(&self) -> usize {
        4 * self.dimension
    }

    /// Encode a vector into its binary wire form.
    ///
    /// Rejects vectors whose length differs from the codec dimension.
    pub fn encode(&self, vector: &Embedding) -> Result<Vec<u8>, VectorError> {
        if vector.dimension() != self.dimension {
            return Err(VectorError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.dimension(),
            });
        }

        let mut bytes = Vec::with_capacity(self.encoded_len());
        for value in &vector.values {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        Ok(bytes)
    }

    /// Decode a binary blob back into a vector.
    pub fn decode(&self, bytes: &[u8]) -> Result<Embedding, VectorError> {
        if bytes.len() != self.encoded_len() {
            return Err(VectorError::DimensionMismatch {
                expected: self.dimension,
                actual: bytes.len() / 4,
            });
        }

        let values = bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();
        Ok(Embedding::new(values))
    }
}
