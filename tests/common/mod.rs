#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use cdm_tiled::{
    layout::ChunkDescriptor,
    section::Section,
    storage::{MemoryStore, ReadableStorageTraits, StorageError},
};
use itertools::Itertools;
use parking_lot::Mutex;

/// A memory store recording every read.
pub struct CountingStore {
    inner: MemoryStore,
    reads: AtomicUsize,
    positions: Mutex<Vec<(u64, u64)>>,
}

impl CountingStore {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            inner: MemoryStore::new(bytes),
            reads: AtomicUsize::new(0),
            positions: Mutex::new(vec![]),
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// The `(position, length)` of every read, in order.
    pub fn positions(&self) -> Vec<(u64, u64)> {
        self.positions.lock().clone()
    }
}

impl ReadableStorageTraits for CountingStore {
    fn read(&self, position: u64, length: u64) -> Result<Vec<u8>, StorageError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.positions.lock().push((position, length));
        self.inner.read(position, length)
    }

    fn size(&self) -> Result<u64, StorageError> {
        self.inner.size()
    }
}

/// Every index of `shape` in row-major order.
pub fn indices(shape: &[u64]) -> Vec<Vec<u64>> {
    shape.iter().map(|&n| 0..n).multi_cartesian_product().collect()
}

/// The row-major linear index of `point` within `shape`.
pub fn linear(point: &[u64], shape: &[u64]) -> u64 {
    point
        .iter()
        .zip(shape)
        .fold(0, |acc, (&p, &n)| acc * n + p)
}

/// The linear indices of the elements selected by `want` within `shape`, in row-major order of `want`.
pub fn expected_i32(want: &Section, shape: &[u64]) -> Vec<i32> {
    want.ranges()
        .iter()
        .map(|range| (0..range.len()).map(|i| range.element(i)))
        .multi_cartesian_product()
        .map(|point| linear(&point, shape) as i32)
        .collect()
}

/// Write an int32 variable of `shape` whose elements hold their linear index, in little endian chunks of `chunk`.
///
/// Chunks are stored at their nominal size (ragged chunks are zero padded) and passed through `encode`.
/// Chunk offsets carry a trailing zero element size dimension if `element_dim`.
pub fn write_chunks_i32(
    shape: &[u64],
    chunk: &[u64],
    element_dim: bool,
    encode: impl Fn(Vec<u8>) -> Vec<u8>,
) -> (Vec<ChunkDescriptor>, Vec<u8>) {
    let tile_counts: Vec<u64> = shape
        .iter()
        .zip(chunk)
        .map(|(&n, &c)| n.div_ceil(c))
        .collect();
    let mut descriptors = vec![];
    let mut bytes = vec![];
    for tile in indices(&tile_counts) {
        let origin: Vec<u64> = tile.iter().zip(chunk).map(|(t, c)| t * c).collect();
        let mut data = vec![];
        for local in indices(chunk) {
            let point: Vec<u64> = local.iter().zip(&origin).map(|(l, o)| l + o).collect();
            let value = if point.iter().zip(shape).all(|(p, n)| p < n) {
                linear(&point, shape) as i32
            } else {
                0
            };
            data.extend(value.to_le_bytes());
        }
        let data = encode(data);
        let mut offset = origin;
        if element_dim {
            offset.push(0);
        }
        descriptors.push(ChunkDescriptor::new(
            offset,
            bytes.len() as u64,
            data.len() as u32,
            0,
        ));
        bytes.extend(data);
    }
    (descriptors, bytes)
}
