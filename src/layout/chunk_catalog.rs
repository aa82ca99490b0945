use serde::{Deserialize, Serialize};

use crate::{section::Section, storage::StorageError};

/// The on-disk description of one stored chunk.
///
/// The offset is the index of the first element of the chunk and is aligned to the chunk shape.
/// HDF5 chunk offsets carry an extra trailing dimension (always zero) for the element size, which is ignored.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ChunkDescriptor {
    offset: Vec<u64>,
    position: u64,
    size: u32,
    #[serde(default)]
    filter_mask: u32,
}

impl ChunkDescriptor {
    /// Create a new chunk descriptor.
    ///
    /// `position` is the byte position of the stored chunk, `size` its stored size in bytes, and bit `i` of `filter_mask` is set if filter `i` was not applied to the chunk.
    #[must_use]
    pub fn new(offset: Vec<u64>, position: u64, size: u32, filter_mask: u32) -> Self {
        Self {
            offset,
            position,
            size,
            filter_mask,
        }
    }

    /// The chunk offset in the index space.
    #[must_use]
    pub fn offset(&self) -> &[u64] {
        &self.offset
    }

    /// The byte position of the stored chunk.
    #[must_use]
    pub const fn position(&self) -> u64 {
        self.position
    }

    /// The stored size of the chunk in bytes.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// The filter skip mask.
    #[must_use]
    pub const fn filter_mask(&self) -> u32 {
        self.filter_mask
    }
}

/// Chunk catalog traits.
///
/// A chunk catalog enumerates the stored chunks of a variable, e.g. by walking an HDF5 B-tree or a GRIB offset table.
/// Chunks that were never written are simply absent.
pub trait ChunkCatalog: Send + Sync {
    /// Iterate over the chunks of the catalog that may intersect `want`.
    ///
    /// Implementations may return chunks that do not intersect `want` and may return chunks in any order.
    /// Only chunk metadata is produced, chunk data is never read.
    fn iter_chunks<'a>(
        &'a self,
        want: &Section,
    ) -> Box<dyn Iterator<Item = Result<ChunkDescriptor, StorageError>> + 'a>;
}

/// An in-memory chunk catalog.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChunkIndex {
    chunks: Vec<ChunkDescriptor>,
}

impl From<Vec<ChunkDescriptor>> for ChunkIndex {
    fn from(chunks: Vec<ChunkDescriptor>) -> Self {
        Self { chunks }
    }
}

impl FromIterator<ChunkDescriptor> for ChunkIndex {
    fn from_iter<T: IntoIterator<Item = ChunkDescriptor>>(iter: T) -> Self {
        Self {
            chunks: iter.into_iter().collect(),
        }
    }
}

impl ChunkIndex {
    /// Create a new chunk index.
    #[must_use]
    pub fn new(chunks: Vec<ChunkDescriptor>) -> Self {
        Self { chunks }
    }

    /// The chunks, in catalog order.
    #[must_use]
    pub fn chunks(&self) -> &[ChunkDescriptor] {
        &self.chunks
    }

    /// The number of chunks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Returns true if the index has no chunks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

impl ChunkCatalog for ChunkIndex {
    fn iter_chunks<'a>(
        &'a self,
        _want: &Section,
    ) -> Box<dyn Iterator<Item = Result<ChunkDescriptor, StorageError>> + 'a> {
        Box::new(self.chunks.iter().cloned().map(Ok))
    }
}
