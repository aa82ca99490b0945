//! A file store.

use std::{
    fs::File,
    io::{Read, Seek, SeekFrom},
    path::{Path, PathBuf},
};

use parking_lot::Mutex;

use super::{check_bounds, ReadableStorageTraits, StorageError};

/// A read only store over a single file.
///
/// The file handle is shared, so each seek and read pair is performed under a lock.
/// Callers wanting concurrent reads without contention should open one store per thread.
#[derive(Debug)]
pub struct FilesystemStore {
    path: PathBuf,
    file: Mutex<File>,
    size: u64,
}

impl FilesystemStore {
    /// Open the file at `path`.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the file cannot be opened or its metadata cannot be read.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        let size = file.metadata()?.len();
        Ok(Self {
            path,
            file: Mutex::new(file),
            size,
        })
    }

    /// Return the path of the file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReadableStorageTraits for FilesystemStore {
    fn read(&self, position: u64, length: u64) -> Result<Vec<u8>, StorageError> {
        check_bounds(position, length, self.size)?;
        let mut data = vec![0; usize::try_from(length).map_err(|e| StorageError::Other(e.to_string()))?];
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(position))?;
        file.read_exact(&mut data)?;
        Ok(data)
    }

    fn size(&self) -> Result<u64, StorageError> {
        Ok(self.size)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn filesystem_store_read() -> Result<(), Box<dyn std::error::Error>> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(&(0u8..32).collect::<Vec<_>>())?;
        file.flush()?;

        let store = FilesystemStore::new(file.path())?;
        assert_eq!(store.size()?, 32);
        assert_eq!(store.read(30, 2)?, vec![30, 31]);
        assert_eq!(store.read(0, 3)?, vec![0, 1, 2]);
        assert!(store.read(31, 2).is_err());
        Ok(())
    }

    #[test]
    fn filesystem_store_missing() {
        assert!(FilesystemStore::new("/this/path/does/not/exist.h5").is_err());
    }
}
