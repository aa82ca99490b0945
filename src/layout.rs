//! Storage layouts.
//!
//! A layout walks a wanted [`Section`](crate::section::Section) across the physical storage of a variable and yields [`LayoutChunk`]s: contiguous runs of elements to copy into a row-major destination buffer for the section.
//! Copying every yielded run reconstructs the wanted section exactly.
//!
//! - [`TiledLayout`] handles chunked (tiled) storage described by a [`ChunkCatalog`] and decoded through a [`FilterPipeline`].
//! - [`RegularLayout`] handles contiguous storage.
//!
//! Both layouts coalesce trailing dimensions that are contiguous in the source and the destination, so reading whole chunks produces one run per chunk.
//!
//! Destination regions not covered by any run (chunks missing from the catalog) are left to the caller, which fills them with the fill value.

mod chunk_cache;
mod chunk_catalog;
mod contiguous_runs;
mod layout_options;
mod regular_layout;
mod tiled_layout;

pub use chunk_cache::{ChunkCache, ChunkCacheLru};
pub use chunk_catalog::{ChunkCatalog, ChunkDescriptor, ChunkIndex};
pub use layout_options::{CancelToken, LayoutOptions, LayoutOptionsBuilder};
pub use regular_layout::RegularLayout;
pub use tiled_layout::TiledLayout;

use std::sync::Arc;

use thiserror::Error;

use crate::{
    array::ArrayShape,
    filter::{FilterError, FilterPipeline},
    section::SectionError,
    storage::StorageError,
    tiling::TilingError,
};

/// A layout error.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// The wanted section is invalid for the variable shape.
    #[error(transparent)]
    InvalidSection(#[from] SectionError),
    /// The chunk shape is incompatible with the variable shape.
    #[error(transparent)]
    IncompatibleChunkShape(#[from] TilingError),
    /// A chunk offset has fewer dimensions than the variable.
    #[error("chunk offset {offset:?} has fewer dimensions than the variable rank {rank}")]
    IncompatibleChunkOffset {
        /// The chunk offset.
        offset: Vec<u64>,
        /// The variable rank.
        rank: usize,
    },
    /// The chunk catalog failed.
    #[error("chunk catalog error: {0}")]
    Catalog(#[source] StorageError),
    /// A stored chunk could not be read.
    #[error("failed to read chunk {offset:?} at position {position}: {source}")]
    ChunkRead {
        /// The chunk offset.
        offset: Vec<u64>,
        /// The stored chunk position.
        position: u64,
        /// The storage error.
        source: StorageError,
    },
    /// A stored chunk could not be decoded.
    #[error("failed to decode chunk {offset:?} at position {position}: {source}")]
    Filter {
        /// The chunk offset.
        offset: Vec<u64>,
        /// The stored chunk position.
        position: u64,
        /// The filter error.
        source: FilterError,
    },
    /// A stored chunk exceeds the maximum chunk size.
    #[error("stored chunk {offset:?} at position {position} has size {size} exceeding the maximum chunk size {max}")]
    ChunkTooLarge {
        /// The chunk offset.
        offset: Vec<u64>,
        /// The stored chunk position.
        position: u64,
        /// The stored size.
        size: u64,
        /// The maximum chunk size.
        max: usize,
    },
    /// Storage dimensions without a trailing element size dimension.
    #[error("storage dimensions {0:?} have no element size dimension")]
    InvalidStorageDims(Vec<u64>),
    /// The layout was cancelled.
    #[error("the layout was cancelled")]
    Cancelled,
}

/// The source of the elements of a [`LayoutChunk`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LayoutSource {
    /// Unfiltered elements stored at a byte position of the storage.
    FilePosition(u64),
    /// Elements of a decoded chunk, starting at element `elem_offset`.
    Bytes {
        /// The decoded chunk.
        data: Arc<Vec<u8>>,
        /// The element offset of the run within the decoded chunk.
        elem_offset: u64,
    },
}

/// A run of contiguous elements to copy into the destination.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayoutChunk {
    dest_elem: u64,
    source: LayoutSource,
    nelems: u64,
}

impl LayoutChunk {
    /// Create a new layout chunk.
    #[must_use]
    pub fn new(dest_elem: u64, source: LayoutSource, nelems: u64) -> Self {
        Self {
            dest_elem,
            source,
            nelems,
        }
    }

    /// The destination element offset, in the row-major order of the wanted section.
    #[must_use]
    pub const fn dest_elem(&self) -> u64 {
        self.dest_elem
    }

    /// The source of the elements.
    #[must_use]
    pub const fn source(&self) -> &LayoutSource {
        &self.source
    }

    /// The number of elements.
    #[must_use]
    pub const fn nelems(&self) -> u64 {
        self.nelems
    }
}

/// The chunked storage of a variable.
#[derive(Clone)]
pub struct ChunkedStorage {
    chunk_shape: ArrayShape,
    element_size: Option<usize>,
    catalog: Arc<dyn ChunkCatalog>,
    filters: FilterPipeline,
}

impl core::fmt::Debug for ChunkedStorage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ChunkedStorage")
            .field("chunk_shape", &self.chunk_shape)
            .field("element_size", &self.element_size)
            .field("filters", &self.filters)
            .finish_non_exhaustive()
    }
}

impl ChunkedStorage {
    /// Create a new chunked storage with `chunk_shape`.
    #[must_use]
    pub fn new(
        chunk_shape: ArrayShape,
        catalog: Arc<dyn ChunkCatalog>,
        filters: FilterPipeline,
    ) -> Self {
        Self {
            chunk_shape,
            element_size: None,
            catalog,
            filters,
        }
    }

    /// Create a new chunked storage from HDF5 storage dimensions, the chunk shape followed by the element size.
    ///
    /// # Errors
    /// Returns [`LayoutError::InvalidStorageDims`] if `storage_dims` is empty or the element size is zero or exceeds [`usize::MAX`].
    pub fn from_storage_dims(
        storage_dims: &[u64],
        catalog: Arc<dyn ChunkCatalog>,
        filters: FilterPipeline,
    ) -> Result<Self, LayoutError> {
        let invalid = || LayoutError::InvalidStorageDims(storage_dims.to_vec());
        let (element_size, chunk_shape) = storage_dims.split_last().ok_or_else(invalid)?;
        let element_size = usize::try_from(*element_size)
            .ok()
            .filter(|&size| size > 0)
            .ok_or_else(invalid)?;
        Ok(Self {
            chunk_shape: chunk_shape.to_vec(),
            element_size: Some(element_size),
            catalog,
            filters,
        })
    }

    /// The chunk shape.
    #[must_use]
    pub fn chunk_shape(&self) -> &[u64] {
        &self.chunk_shape
    }

    /// The element size recorded with the storage dimensions, if created with [`from_storage_dims`](Self::from_storage_dims).
    #[must_use]
    pub const fn element_size(&self) -> Option<usize> {
        self.element_size
    }

    /// The chunk catalog.
    #[must_use]
    pub fn catalog(&self) -> &dyn ChunkCatalog {
        self.catalog.as_ref()
    }

    /// The filter pipeline.
    #[must_use]
    pub const fn filters(&self) -> &FilterPipeline {
        &self.filters
    }
}

/// The layout of a section across any storage.
pub enum SectionLayout<'a> {
    /// Chunked storage.
    Tiled(TiledLayout<'a>),
    /// Contiguous storage.
    Regular(RegularLayout),
    /// Unallocated storage, every element takes the fill value.
    Fill,
}

impl Iterator for SectionLayout<'_> {
    type Item = Result<LayoutChunk, LayoutError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Tiled(layout) => layout.next(),
            Self::Regular(layout) => layout.next().map(Ok),
            Self::Fill => None,
        }
    }
}
