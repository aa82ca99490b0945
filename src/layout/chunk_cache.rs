use std::sync::Arc;

mod chunk_cache_lru;

pub use chunk_cache_lru::ChunkCacheLru;

/// Traits for a decoded chunk cache.
///
/// Chunks are keyed by the byte position of the stored chunk, so a cache must only be used with a single storage.
pub trait ChunkCache: Send + Sync {
    /// Retrieve a decoded chunk from the cache. Returns [`None`] if the chunk is not present.
    ///
    /// The chunk cache implementation may modify the cache (e.g. update LRU cache) on retrieval.
    fn retrieve(&self, position: u64) -> Option<Arc<Vec<u8>>>;

    /// Insert a decoded chunk into the cache.
    fn insert(&self, position: u64, chunk: Arc<Vec<u8>>);

    /// Return the number of chunks in the cache.
    #[must_use]
    fn len(&self) -> usize;

    /// Returns true if the cache is empty.
    #[must_use]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
