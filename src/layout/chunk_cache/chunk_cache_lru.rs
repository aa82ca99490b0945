use std::{num::NonZeroUsize, sync::Arc};

use lru::LruCache;
use parking_lot::Mutex;

use super::ChunkCache;

/// A decoded chunk cache with a fixed chunk capacity.
pub struct ChunkCacheLru {
    cache: Mutex<LruCache<u64, Arc<Vec<u8>>>>,
}

impl core::fmt::Debug for ChunkCacheLru {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let cache = self.cache.lock();
        f.debug_struct("ChunkCacheLru")
            .field("len", &cache.len())
            .field("cap", &cache.cap())
            .finish()
    }
}

impl ChunkCacheLru {
    /// Create a new [`ChunkCacheLru`] with a capacity of `chunk_capacity`.
    #[must_use]
    pub fn new(chunk_capacity: NonZeroUsize) -> Self {
        Self {
            cache: Mutex::new(LruCache::new(chunk_capacity)),
        }
    }

    /// Remove all chunks from the cache.
    pub fn clear(&self) {
        self.cache.lock().clear();
    }
}

impl ChunkCache for ChunkCacheLru {
    fn retrieve(&self, position: u64) -> Option<Arc<Vec<u8>>> {
        self.cache.lock().get(&position).cloned()
    }

    fn insert(&self, position: u64, chunk: Arc<Vec<u8>>) {
        self.cache.lock().put(position, chunk);
    }

    fn len(&self) -> usize {
        self.cache.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_cache_lru() {
        let cache = ChunkCacheLru::new(NonZeroUsize::new(2).unwrap());
        assert!(cache.is_empty());
        cache.insert(0, Arc::new(vec![0]));
        cache.insert(100, Arc::new(vec![1]));
        assert_eq!(cache.retrieve(0).as_deref(), Some(&vec![0]));
        // 100 is now least recently used
        cache.insert(200, Arc::new(vec![2]));
        assert_eq!(cache.len(), 2);
        assert!(cache.retrieve(100).is_none());
        assert!(cache.retrieve(0).is_some());
        cache.clear();
        assert!(cache.is_empty());
    }
}
