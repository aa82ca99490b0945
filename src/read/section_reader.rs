use std::{num::NonZeroUsize, sync::Arc};

use crate::{
    array::Array,
    layout::{ChunkCache, ChunkCacheLru, LayoutOptions},
    section::Section,
    storage::ReadableStorageTraits,
};

use super::{read_section, HeapReader, ReadError, VariableStorage};

/// Section reader traits.
///
/// A section reader is a read strategy selected by the caller and passed explicitly to the code that reads sections.
pub trait SectionReader: Send + Sync {
    /// Read `want` of `variable` into an array.
    ///
    /// # Errors
    /// Returns a [`ReadError`] if the read fails, see [`read_section`].
    fn read_section(
        &self,
        variable: &VariableStorage,
        want: &Section,
        storage: &dyn ReadableStorageTraits,
        heap: Option<&dyn HeapReader>,
        options: &LayoutOptions,
    ) -> Result<Array, ReadError>;
}

/// A section reader that reads directly through the storage.
#[derive(Clone, Copy, Debug, Default)]
pub struct DirectSectionReader;

impl SectionReader for DirectSectionReader {
    fn read_section(
        &self,
        variable: &VariableStorage,
        want: &Section,
        storage: &dyn ReadableStorageTraits,
        heap: Option<&dyn HeapReader>,
        options: &LayoutOptions,
    ) -> Result<Array, ReadError> {
        read_section(variable, want, storage, heap, options)
    }
}

/// A section reader that keeps decoded chunks in an LRU cache across reads.
///
/// The cache is keyed by chunk file position, so a cached section reader must only be used with one storage.
/// Any chunk cache in the supplied options is replaced.
#[derive(Clone, Debug)]
pub struct CachedSectionReader {
    cache: Arc<ChunkCacheLru>,
}

impl CachedSectionReader {
    /// Create a new cached section reader holding up to `chunk_capacity` decoded chunks.
    #[must_use]
    pub fn new(chunk_capacity: NonZeroUsize) -> Self {
        Self {
            cache: Arc::new(ChunkCacheLru::new(chunk_capacity)),
        }
    }

    /// The decoded chunk cache.
    #[must_use]
    pub fn cache(&self) -> &ChunkCacheLru {
        &self.cache
    }
}

impl SectionReader for CachedSectionReader {
    fn read_section(
        &self,
        variable: &VariableStorage,
        want: &Section,
        storage: &dyn ReadableStorageTraits,
        heap: Option<&dyn HeapReader>,
        options: &LayoutOptions,
    ) -> Result<Array, ReadError> {
        let mut options = options.clone();
        let cache: Arc<dyn ChunkCache> = self.cache.clone();
        options.set_chunk_cache(Some(cache));
        read_section(variable, want, storage, heap, &options)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::{
        data_type::{DataType, Endianness, TypeInfo},
        filter::{FilterDescriptor, FilterPipeline, ShuffleFilter},
        layout::{ChunkDescriptor, ChunkIndex, ChunkedStorage},
        read::StorageLayout,
        storage::{MemoryStore, StorageError},
    };

    struct CountingStore {
        inner: MemoryStore,
        reads: AtomicUsize,
    }

    impl ReadableStorageTraits for CountingStore {
        fn read(&self, position: u64, length: u64) -> Result<Vec<u8>, StorageError> {
            self.reads.fetch_add(1, Ordering::Relaxed);
            self.inner.read(position, length)
        }

        fn size(&self) -> Result<u64, StorageError> {
            self.inner.size()
        }
    }

    fn shuffled_variable() -> (VariableStorage, CountingStore) {
        let values: Vec<u8> = [1u16, 2, 3, 4]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        let encoded = ShuffleFilter::new(2).encode(&values);
        let catalog = ChunkIndex::new(vec![ChunkDescriptor::new(vec![0, 0], 0, 8, 0)]);
        let chunked = ChunkedStorage::new(
            vec![4, 2],
            Arc::new(catalog),
            FilterPipeline::new(vec![FilterDescriptor::shuffle(2)]),
        );
        let variable = VariableStorage::new(
            vec![4],
            TypeInfo::new(DataType::UInt16, Endianness::Little),
            StorageLayout::Chunked(chunked),
        );
        let store = CountingStore {
            inner: MemoryStore::new(encoded),
            reads: AtomicUsize::new(0),
        };
        (variable, store)
    }

    #[test]
    fn cached_section_reader() {
        let (variable, store) = shuffled_variable();
        let reader = CachedSectionReader::new(NonZeroUsize::new(4).unwrap());
        let options = LayoutOptions::default();
        for want in ["0:3", "1:2", "3:3"] {
            let want: Section = want.parse().unwrap();
            let array = reader
                .read_section(&variable, &want, &store, None, &options)
                .unwrap();
            assert_eq!(array.num_elements() as u64, want.num_elements());
        }
        assert_eq!(store.reads.load(Ordering::Relaxed), 1);
        assert_eq!(reader.cache().len(), 1);
    }

    #[test]
    fn direct_section_reader() {
        let (variable, store) = shuffled_variable();
        let options = LayoutOptions::default();
        let readers: [&dyn SectionReader; 2] = [
            &DirectSectionReader,
            &CachedSectionReader::new(NonZeroUsize::new(1).unwrap()),
        ];
        for reader in readers {
            let array = reader
                .read_section(&variable, &"1:3".parse().unwrap(), &store, None, &options)
                .unwrap();
            assert_eq!(array.as_slice::<u16>(), Some([2u16, 3, 4].as_slice()));
        }
        assert_eq!(store.reads.load(Ordering::Relaxed), 2);
    }
}
