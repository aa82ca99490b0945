//! Tiling of a multidimensional index space into equally sized chunks.
//!
//! A [`Tiling`] maps an index point to the coordinate of the tile (chunk) containing it, and to a scalar tile *order*.
//! The order is the row-major linearisation of the tile coordinate over the grid of tiles, which is how chunk catalogs are typically laid out on disk.
//! The [layout engine](crate::layout) sorts chunk catalogs by this order before walking them.

use std::cmp::Ordering;

use thiserror::Error;

use crate::{
    array::{ArrayIndices, ArrayShape},
    section::row_major_strides,
};

/// A tiling of an index space.
///
/// The chunk shape may have more dimensions than the index space.
/// Extra trailing chunk dimensions (e.g. the element size dimension of HDF5 chunked storage) are ignored.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Tiling {
    shape: ArrayShape,
    chunk: ArrayShape,
    stride: Vec<u64>,
}

/// A tiling creation error.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum TilingError {
    /// The chunk shape has fewer dimensions than the index space.
    #[error("chunk shape {chunk:?} has fewer dimensions than shape {shape:?}")]
    IncompatibleRank {
        /// The shape of the index space.
        shape: ArrayShape,
        /// The chunk shape.
        chunk: ArrayShape,
    },
    /// A chunk dimension is zero.
    #[error("chunk shape {0:?} has a zero extent")]
    ZeroChunkExtent(ArrayShape),
}

impl Tiling {
    /// Create a new tiling of an index space with `shape` into chunks of `chunk`.
    ///
    /// Each dimension of the index space is extended to at least one chunk.
    ///
    /// # Errors
    /// Returns a [`TilingError`] if `chunk` has fewer dimensions than `shape` or a used chunk dimension is zero.
    pub fn new(shape: &[u64], chunk: &[u64]) -> Result<Self, TilingError> {
        if chunk.len() < shape.len() {
            return Err(TilingError::IncompatibleRank {
                shape: shape.to_vec(),
                chunk: chunk.to_vec(),
            });
        }
        if chunk[..shape.len()].contains(&0) {
            return Err(TilingError::ZeroChunkExtent(chunk.to_vec()));
        }
        let shape: ArrayShape = std::iter::zip(shape, chunk)
            .map(|(&s, &c)| std::cmp::max(s, c))
            .collect();
        let tile_counts: ArrayShape = std::iter::zip(&shape, chunk)
            .map(|(s, c)| s.div_ceil(*c))
            .collect();
        Ok(Self {
            stride: row_major_strides(&tile_counts),
            chunk: chunk.to_vec(),
            shape,
        })
    }

    /// The rank of the tiled index space.
    #[must_use]
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// The index space shape, extended to at least one chunk in each dimension.
    #[must_use]
    pub fn shape(&self) -> &[u64] {
        &self.shape
    }

    /// The chunk shape, including any extra trailing dimensions.
    #[must_use]
    pub fn chunk_shape(&self) -> &[u64] {
        &self.chunk
    }

    /// The number of tiles in each dimension.
    #[must_use]
    pub fn tile_counts(&self) -> ArrayShape {
        std::iter::zip(&self.shape, &self.chunk)
            .map(|(s, c)| s.div_ceil(*c))
            .collect()
    }

    /// Return the tile containing the index `point`.
    ///
    /// Only the leading `min(rank, point.len())` dimensions are used, so points carrying extra trailing dimensions are accepted.
    /// Points outside of the shape are not rejected.
    #[must_use]
    pub fn tile(&self, point: &[u64]) -> ArrayIndices {
        let rank = std::cmp::min(self.rank(), point.len());
        for (i, (p, s)) in std::iter::zip(&point[..rank], &self.shape).enumerate() {
            if p >= s {
                // Seen at the trailing edge of some real-world chunked datasets.
                tracing::debug!(
                    dim = i,
                    index = p,
                    extent = s,
                    "tile point lies outside of the tiled shape"
                );
            }
        }
        std::iter::zip(&point[..rank], &self.chunk)
            .map(|(p, c)| p / c)
            .collect()
    }

    /// Return the order of the tile containing `point`.
    ///
    /// The order saturates at [`u64::MAX`] for points far outside of the shape.
    #[must_use]
    pub fn order(&self, point: &[u64]) -> u64 {
        std::iter::zip(self.tile(point), &self.stride)
            .fold(0, |order, (t, s)| order.saturating_add(t.saturating_mul(*s)))
    }

    /// Compare two points by the order of their tiles.
    ///
    /// Returns `order(p1) - order(p2)`: negative if `p1` is in an earlier tile, positive if later, and zero if in the same tile.
    /// The difference saturates at the bounds of [`i64`].
    #[must_use]
    pub fn compare(&self, p1: &[u64], p2: &[u64]) -> i64 {
        let (o1, o2) = (self.order(p1), self.order(p2));
        if o1 >= o2 {
            i64::try_from(o1 - o2).unwrap_or(i64::MAX)
        } else {
            i64::try_from(o2 - o1).map_or(i64::MIN + 1, |d| -d)
        }
    }

    /// Compare two points by the order of their tiles.
    #[must_use]
    pub fn cmp_points(&self, p1: &[u64], p2: &[u64]) -> Ordering {
        self.order(p1).cmp(&self.order(p2))
    }
}
