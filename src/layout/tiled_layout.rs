use std::sync::Arc;

use crate::{
    array::ArrayShape,
    section::Section,
    storage::ReadableStorageTraits,
    tiling::Tiling,
};

use super::{
    contiguous_runs::{ContiguousRuns, Run},
    ChunkDescriptor, ChunkedStorage, LayoutChunk, LayoutError, LayoutOptions, LayoutSource,
};

/// The data of the chunk currently being walked.
enum ChunkData {
    FilePosition(u64),
    Decoded(Arc<Vec<u8>>),
}

struct CurrentChunk {
    data: ChunkData,
    runs: ContiguousRuns,
}

/// The layout of a wanted section across chunked storage.
///
/// Chunk descriptors are collected from the catalog when the layout is created.
/// Chunks that do not intersect the wanted section are dropped and the rest are sorted by [tile order](Tiling::order).
/// Each intersecting chunk is then read and decoded lazily, when the iterator reaches it.
///
/// Unfiltered chunks are not read by the layout: their runs refer to [file positions](LayoutSource::FilePosition).
///
/// After an error (including cancellation) the iterator ends.
pub struct TiledLayout<'a> {
    want: Section,
    want_strides: Vec<u64>,
    shape: ArrayShape,
    chunk_shape: ArrayShape,
    element_size: usize,
    chunks: std::vec::IntoIter<ChunkDescriptor>,
    chunked: &'a ChunkedStorage,
    storage: &'a dyn ReadableStorageTraits,
    options: &'a LayoutOptions,
    current: Option<CurrentChunk>,
    finished: bool,
}

impl<'a> TiledLayout<'a> {
    /// Create the layout of `want` across the `chunked` storage of a variable with `shape` and elements of `element_size` bytes.
    ///
    /// Omitted trailing dimensions of `want` select whole dimensions.
    ///
    /// # Errors
    /// Returns a [`LayoutError`] if `want` is invalid for `shape`, the chunk shape is incompatible with `shape`, or the catalog fails.
    pub fn new(
        want: &Section,
        shape: &[u64],
        chunked: &'a ChunkedStorage,
        element_size: usize,
        storage: &'a dyn ReadableStorageTraits,
        options: &'a LayoutOptions,
    ) -> Result<Self, LayoutError> {
        let want = want.fill(shape)?;
        want.check_in_bounds(shape)?;
        let tiling = Tiling::new(shape, chunked.chunk_shape())?;
        let rank = shape.len();
        let chunk_shape = chunked.chunk_shape()[..rank].to_vec();

        let mut chunks = Vec::new();
        for descriptor in chunked.catalog().iter_chunks(&want) {
            let descriptor = descriptor.map_err(LayoutError::Catalog)?;
            if descriptor.offset().len() < rank {
                return Err(LayoutError::IncompatibleChunkOffset {
                    offset: descriptor.offset().to_vec(),
                    rank,
                });
            }
            if want.intersects_box(descriptor.offset(), &chunk_shape) {
                chunks.push(descriptor);
            }
        }
        chunks.sort_by_key(|descriptor| tiling.order(&descriptor.offset()[..rank]));
        tracing::debug!(
            want = %want,
            chunks = chunks.len(),
            "tiled layout"
        );

        Ok(Self {
            want_strides: want.row_strides(),
            want,
            shape: shape.to_vec(),
            chunk_shape,
            element_size,
            chunks: chunks.into_iter(),
            chunked,
            storage,
            options,
            current: None,
            finished: false,
        })
    }

    /// The wanted section, filled to the variable rank.
    #[must_use]
    pub fn want(&self) -> &Section {
        &self.want
    }

    /// The number of intersecting chunks not yet reached.
    #[must_use]
    pub fn chunks_remaining(&self) -> usize {
        self.chunks.len()
    }

    fn load(&self, descriptor: &ChunkDescriptor) -> Result<ChunkData, LayoutError> {
        let filters = self.chunked.filters();
        let position = descriptor.position();
        if filters.is_empty() {
            return Ok(ChunkData::FilePosition(position));
        }
        let chunk_cache = self.options.chunk_cache();
        if let Some(decoded) = chunk_cache.and_then(|cache| cache.retrieve(position)) {
            return Ok(ChunkData::Decoded(decoded));
        }

        let offset = || descriptor.offset().to_vec();
        let size = u64::from(descriptor.size());
        let max = self.options.filter_options().max_chunk_size();
        if usize::try_from(size).map_or(true, |size| size > max) {
            return Err(LayoutError::ChunkTooLarge {
                offset: offset(),
                position,
                size,
                max,
            });
        }
        let encoded = self
            .storage
            .read(position, size)
            .map_err(|source| LayoutError::ChunkRead {
                offset: offset(),
                position,
                source,
            })?;
        let decoded = filters
            .decode(
                encoded,
                descriptor.filter_mask(),
                self.options.filter_options(),
            )
            .map_err(|source| LayoutError::Filter {
                offset: offset(),
                position,
                source,
            })?;
        tracing::debug!(
            offset = ?descriptor.offset(),
            position,
            stored = size,
            decoded = decoded.len(),
            "decoded chunk"
        );
        let decoded = Arc::new(decoded);
        if let Some(cache) = chunk_cache {
            cache.insert(position, decoded.clone());
        }
        Ok(ChunkData::Decoded(decoded))
    }
}

impl Iterator for TiledLayout<'_> {
    type Item = Result<LayoutChunk, LayoutError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.finished {
                return None;
            }
            if let Some(current) = &mut self.current {
                if let Some(run) = current.runs.next() {
                    return Some(Ok(layout_chunk(&current.data, run, self.element_size)));
                }
                self.current = None;
            }

            let Some(descriptor) = self.chunks.next() else {
                self.finished = true;
                return None;
            };
            if self.options.is_cancelled() {
                self.finished = true;
                return Some(Err(LayoutError::Cancelled));
            }
            let Some(runs) = ContiguousRuns::new(
                &self.want,
                &self.want_strides,
                &self.shape,
                descriptor.offset(),
                &self.chunk_shape,
            ) else {
                continue;
            };
            match self.load(&descriptor) {
                Ok(data) => self.current = Some(CurrentChunk { data, runs }),
                Err(err) => {
                    self.finished = true;
                    return Some(Err(err));
                }
            }
        }
    }
}

fn layout_chunk(data: &ChunkData, run: Run, element_size: usize) -> LayoutChunk {
    let source = match data {
        ChunkData::FilePosition(position) => {
            LayoutSource::FilePosition(position + run.src * element_size as u64)
        }
        ChunkData::Decoded(data) => LayoutSource::Bytes {
            data: data.clone(),
            elem_offset: run.src,
        },
    };
    LayoutChunk::new(run.dst, source, run.len)
}
