//! Random access byte storage.
//!
//! The layout engine and read assembler fetch stored chunk bytes, contiguous data and heap objects through [`ReadableStorageTraits`].
//! A store is a positional byte source, such as a [file](FilesystemStore) or an [in-memory buffer](MemoryStore).
//!
//! Stores must be [`Send`] and [`Sync`].
//! A store backed by a single file handle serialises its seek and read operations internally.

mod filesystem_store;
mod memory_store;

pub use filesystem_store::FilesystemStore;
pub use memory_store::MemoryStore;

use std::sync::Arc;

use thiserror::Error;

/// Readable storage traits.
pub trait ReadableStorageTraits: Send + Sync {
    /// Read `length` bytes starting at byte `position`.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying error with the store or the requested bytes extend beyond the end of the store.
    fn read(&self, position: u64, length: u64) -> Result<Vec<u8>, StorageError>;

    /// Return the size in bytes of the store.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying error with the store.
    fn size(&self) -> Result<u64, StorageError>;
}

/// [`Arc`] wrapped readable storage.
pub type ReadableStorage = Arc<dyn ReadableStorageTraits>;

impl<T: ReadableStorageTraits + ?Sized> ReadableStorageTraits for Arc<T> {
    fn read(&self, position: u64, length: u64) -> Result<Vec<u8>, StorageError> {
        (**self).read(position, length)
    }

    fn size(&self) -> Result<u64, StorageError> {
        (**self).size()
    }
}

/// A storage error.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An IO error.
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    /// A read extends beyond the end of the store.
    #[error("read of {length} bytes at position {position} is out of bounds of store with size {size}")]
    OutOfBounds {
        /// The read position.
        position: u64,
        /// The read length.
        length: u64,
        /// The size of the store.
        size: u64,
    },
    /// Any other error.
    #[error("{0}")]
    Other(String),
}

impl From<&str> for StorageError {
    fn from(err: &str) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<String> for StorageError {
    fn from(err: String) -> Self {
        Self::Other(err)
    }
}

/// Check that a read of `length` bytes at `position` is within a store of `size` bytes.
fn check_bounds(position: u64, length: u64, size: u64) -> Result<(), StorageError> {
    match position.checked_add(length) {
        Some(end) if end <= size => Ok(()),
        _ => Err(StorageError::OutOfBounds {
            position,
            length,
            size,
        }),
    }
}
