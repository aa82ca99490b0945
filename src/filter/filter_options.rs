//! Filter options for decoding.

use crate::config::global_config;

/// Filter options for decoding.
///
/// Defaults are taken from the [global configuration](crate::config::Config).
#[derive(Debug, Clone)]
pub struct FilterOptions {
    inflate_buffer_size: usize,
    max_chunk_size: usize,
}

impl Default for FilterOptions {
    fn default() -> Self {
        let config = global_config();
        Self {
            inflate_buffer_size: config.inflate_buffer_size(),
            max_chunk_size: config.max_chunk_size(),
        }
    }
}

impl FilterOptions {
    /// Create a new filter options builder.
    #[must_use]
    pub fn builder() -> FilterOptionsBuilder {
        FilterOptionsBuilder::new()
    }

    /// Return the inflate buffer size.
    #[must_use]
    pub fn inflate_buffer_size(&self) -> usize {
        self.inflate_buffer_size
    }

    /// Return the maximum chunk size.
    #[must_use]
    pub fn max_chunk_size(&self) -> usize {
        self.max_chunk_size
    }

    /// Set the maximum chunk size.
    pub fn set_max_chunk_size(&mut self, max_chunk_size: usize) {
        self.max_chunk_size = max_chunk_size;
    }
}

/// Builder for [`FilterOptions`].
#[derive(Debug, Clone)]
pub struct FilterOptionsBuilder {
    options: FilterOptions,
}

impl Default for FilterOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterOptionsBuilder {
    /// Create a new filter options builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            options: FilterOptions::default(),
        }
    }

    /// Build into filter options.
    #[must_use]
    pub fn build(&self) -> FilterOptions {
        self.options.clone()
    }

    /// Set the inflate buffer size.
    ///
    /// A size of zero is ignored.
    #[must_use]
    pub fn inflate_buffer_size(mut self, inflate_buffer_size: usize) -> Self {
        if inflate_buffer_size > 0 {
            self.options.inflate_buffer_size = inflate_buffer_size;
        }
        self
    }

    /// Set the maximum chunk size.
    #[must_use]
    pub fn max_chunk_size(mut self, max_chunk_size: usize) -> Self {
        self.options.max_chunk_size = max_chunk_size;
        self
    }
}
