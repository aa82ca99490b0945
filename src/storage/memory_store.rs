//! An in-memory store.

use bytes::Bytes;

use super::{check_bounds, ReadableStorageTraits, StorageError};

/// An in-memory store over an immutable byte buffer.
///
/// Cloning is cheap, the buffer is reference counted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Bytes,
}

impl MemoryStore {
    /// Create a new memory store holding `data`.
    #[must_use]
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }

    /// Return the underlying bytes.
    #[must_use]
    pub fn bytes(&self) -> &Bytes {
        &self.data
    }
}

impl ReadableStorageTraits for MemoryStore {
    fn read(&self, position: u64, length: u64) -> Result<Vec<u8>, StorageError> {
        check_bounds(position, length, self.data.len() as u64)?;
        let start = usize::try_from(position).map_err(|e| StorageError::Other(e.to_string()))?;
        let end = usize::try_from(position + length).map_err(|e| StorageError::Other(e.to_string()))?;
        Ok(self.data[start..end].to_vec())
    }

    fn size(&self) -> Result<u64, StorageError> {
        Ok(self.data.len() as u64)
    }
}
