use thiserror::Error;

use crate::{data_type::HEAP_ID_SIZE, storage::StorageError};

/// A heap id, the stored reference to a variable length value in a global heap collection.
///
/// A heap id is stored as 16 little endian bytes: the value length (`u32`), the address of the heap collection (`u64`) and the index of the object within the collection (`u32`).
/// For a string the length is in bytes, for a sequence it is in elements.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct HeapId {
    len: u32,
    collection_address: u64,
    object_index: u32,
}

/// An invalid heap id error.
#[derive(Copy, Clone, Debug, Error, Eq, PartialEq)]
#[error("heap id must be {HEAP_ID_SIZE} bytes, got {0}")]
pub struct InvalidHeapIdError(usize);

impl TryFrom<&[u8]> for HeapId {
    type Error = InvalidHeapIdError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let bytes: &[u8; HEAP_ID_SIZE] = bytes
            .try_into()
            .map_err(|_| InvalidHeapIdError(bytes.len()))?;
        Ok(Self::from_bytes(bytes))
    }
}

impl HeapId {
    /// Create a new heap id.
    #[must_use]
    pub const fn new(len: u32, collection_address: u64, object_index: u32) -> Self {
        Self {
            len,
            collection_address,
            object_index,
        }
    }

    /// Decode a stored heap id.
    #[must_use]
    pub fn from_bytes(bytes: &[u8; HEAP_ID_SIZE]) -> Self {
        let [l0, l1, l2, l3, a0, a1, a2, a3, a4, a5, a6, a7, i0, i1, i2, i3] = *bytes;
        Self {
            len: u32::from_le_bytes([l0, l1, l2, l3]),
            collection_address: u64::from_le_bytes([a0, a1, a2, a3, a4, a5, a6, a7]),
            object_index: u32::from_le_bytes([i0, i1, i2, i3]),
        }
    }

    /// Encode the heap id as stored.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; HEAP_ID_SIZE] {
        let mut bytes = [0; HEAP_ID_SIZE];
        bytes[..4].copy_from_slice(&self.len.to_le_bytes());
        bytes[4..12].copy_from_slice(&self.collection_address.to_le_bytes());
        bytes[12..].copy_from_slice(&self.object_index.to_le_bytes());
        bytes
    }

    /// The value length.
    #[must_use]
    pub const fn len(&self) -> u32 {
        self.len
    }

    /// Returns true if the value is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The address of the heap collection.
    #[must_use]
    pub const fn collection_address(&self) -> u64 {
        self.collection_address
    }

    /// The index of the object within the heap collection.
    #[must_use]
    pub const fn object_index(&self) -> u32 {
        self.object_index
    }

    /// Returns true if the heap id is all zeros, as for an element that was never written.
    ///
    /// A null heap id does not reference a heap object.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        self.len == 0 && self.collection_address == 0 && self.object_index == 0
    }
}

/// Heap reader traits.
///
/// A heap reader resolves heap ids to the bytes of variable length values, e.g. by parsing HDF5 global heap collections.
pub trait HeapReader: Send + Sync {
    /// Read the bytes of the heap object referenced by `id`.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the object cannot be read.
    fn read_heap_object(&self, id: &HeapId) -> Result<Vec<u8>, StorageError>;

    /// Read the bytes of the heap objects referenced by `ids`.
    ///
    /// The default implementation reads each object in turn.
    /// Implementations may read objects of the same collection together.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if any object cannot be read.
    fn read_heap_objects(&self, ids: &[HeapId]) -> Result<Vec<Vec<u8>>, StorageError> {
        ids.iter().map(|id| self.read_heap_object(id)).collect()
    }
}
