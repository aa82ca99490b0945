//! `cdm_tiled` global configuration options.

use std::sync::{OnceLock, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// The environment variable overriding the default [inflate buffer size](#inflate-buffer-size).
pub const INFLATE_BUFFER_SIZE_ENV: &str = "CDM_TILED_INFLATE_BUFFER_SIZE";

/// The default [inflate buffer size](#inflate-buffer-size).
pub const DEFAULT_INFLATE_BUFFER_SIZE: usize = 512;

/// Global configuration options for the `cdm_tiled` crate.
///
/// Retrieve the global [`Config`] with [`global_config`] and modify it with [`global_config_mut`].
///
/// ## Inflate Buffer Size
/// > default: `512`
///
/// The size in bytes of the buffer the deflate filter reads compressed input through.
/// The default can be overridden with the `CDM_TILED_INFLATE_BUFFER_SIZE` environment variable, which is read once when the global configuration is first accessed.
/// Non-positive or non-integer values are ignored with a warning.
///
/// ## Maximum Chunk Size
/// > default: [`isize::MAX`]
///
/// The maximum size in bytes of a stored or decoded chunk.
/// Decoding a chunk which would exceed this size is an error.
///
/// Note that both options can be overridden for any read operation through [`FilterOptions`](crate::filter::FilterOptions).
#[derive(Debug, Clone)]
pub struct Config {
    inflate_buffer_size: usize,
    max_chunk_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            inflate_buffer_size: DEFAULT_INFLATE_BUFFER_SIZE,
            max_chunk_size: isize::MAX.unsigned_abs(),
        }
    }
}

impl Config {
    /// Create the default configuration with overrides from the environment applied.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(value) = std::env::var(INFLATE_BUFFER_SIZE_ENV) {
            match value.trim().parse::<usize>() {
                Ok(size) => config.set_inflate_buffer_size(size),
                Err(err) => tracing::warn!(
                    variable = INFLATE_BUFFER_SIZE_ENV,
                    value,
                    %err,
                    "ignoring invalid inflate buffer size"
                ),
            }
        }
        config
    }

    /// Get the [inflate buffer size](#inflate-buffer-size) configuration.
    #[must_use]
    pub fn inflate_buffer_size(&self) -> usize {
        self.inflate_buffer_size
    }

    /// Set the [inflate buffer size](#inflate-buffer-size) configuration.
    ///
    /// A size of zero is ignored with a warning and the current size is kept.
    pub fn set_inflate_buffer_size(&mut self, inflate_buffer_size: usize) {
        if inflate_buffer_size == 0 {
            tracing::warn!(
                current = self.inflate_buffer_size,
                "ignoring zero inflate buffer size"
            );
        } else {
            self.inflate_buffer_size = inflate_buffer_size;
        }
    }

    /// Get the [maximum chunk size](#maximum-chunk-size) configuration.
    #[must_use]
    pub fn max_chunk_size(&self) -> usize {
        self.max_chunk_size
    }

    /// Set the [maximum chunk size](#maximum-chunk-size) configuration.
    pub fn set_max_chunk_size(&mut self, max_chunk_size: usize) {
        self.max_chunk_size = max_chunk_size;
    }
}

static CONFIG: OnceLock<RwLock<Config>> = OnceLock::new();

/// Returns a reference to the global `cdm_tiled` configuration.
///
/// # Panics
/// This function panics if the underlying lock has been poisoned and might panic if the global config is already held by the current thread.
pub fn global_config() -> RwLockReadGuard<'static, Config> {
    CONFIG
        .get_or_init(|| RwLock::new(Config::from_env()))
        .read()
        .unwrap()
}

/// Returns a mutable reference to the global `cdm_tiled` configuration.
///
/// # Panics
/// This function panics if the underlying lock has been poisoned and might panic if the global config is already held by the current thread.
pub fn global_config_mut() -> RwLockWriteGuard<'static, Config> {
    CONFIG
        .get_or_init(|| RwLock::new(Config::from_env()))
        .write()
        .unwrap()
}
