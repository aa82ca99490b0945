//! Chunk filters.
//!
//! A filter is a reversible byte transform applied to each chunk when it is written, such as compression, byte shuffling or a checksum.
//! Filters are identified by their HDF5 numeric filter id and carry integer client data.
//!
//! Reading applies the filters of a [`FilterPipeline`] in reverse order, skipping any filter whose bit is set in the chunk's filter mask.
//!
//! ## Supported Filters
//! | Id | Filter | Decoding |
//! |---:|---|---|
//! | 1 | [`deflate`](DeflateFilter) | zlib inflate (requires the `deflate` feature) |
//! | 2 | [`shuffle`](ShuffleFilter) | byte unshuffle with element size `client_data[0]` |
//! | 3 | [`fletcher32`](Fletcher32Filter) | strip the trailing checksum, not verified |
//!
//! Any other filter id fails with [`FilterError::UnsupportedFilter`] unless it is skipped.

#[cfg(feature = "deflate")]
mod deflate;
mod filter_options;
mod filter_pipeline;
mod fletcher32;
mod shuffle;

#[cfg(feature = "deflate")]
pub use deflate::DeflateFilter;
pub use filter_options::{FilterOptions, FilterOptionsBuilder};
pub use filter_pipeline::FilterPipeline;
pub use fletcher32::Fletcher32Filter;
pub use shuffle::ShuffleFilter;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The deflate (zlib) filter id.
pub const FILTER_ID_DEFLATE: u16 = 1;
/// The byte shuffle filter id.
pub const FILTER_ID_SHUFFLE: u16 = 2;
/// The Fletcher-32 checksum filter id.
pub const FILTER_ID_FLETCHER32: u16 = 3;

/// A filter description, as recorded in a dataset's filter pipeline message.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct FilterDescriptor {
    id: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default)]
    client_data: Vec<u32>,
}

impl FilterDescriptor {
    /// Create a new filter descriptor.
    #[must_use]
    pub fn new(id: u16, client_data: Vec<u32>) -> Self {
        Self {
            id,
            name: None,
            client_data,
        }
    }

    /// Set the filter name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// A deflate filter descriptor.
    #[must_use]
    pub fn deflate(level: u32) -> Self {
        Self::new(FILTER_ID_DEFLATE, vec![level]).with_name("deflate")
    }

    /// A shuffle filter descriptor for elements of `element_size` bytes.
    #[must_use]
    pub fn shuffle(element_size: u32) -> Self {
        Self::new(FILTER_ID_SHUFFLE, vec![element_size]).with_name("shuffle")
    }

    /// A Fletcher-32 filter descriptor.
    #[must_use]
    pub fn fletcher32() -> Self {
        Self::new(FILTER_ID_FLETCHER32, vec![]).with_name("fletcher32")
    }

    /// The filter id.
    #[must_use]
    pub const fn id(&self) -> u16 {
        self.id
    }

    /// The optional filter name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The filter client data.
    #[must_use]
    pub fn client_data(&self) -> &[u32] {
        &self.client_data
    }
}

impl core::fmt::Display for FilterDescriptor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name} ({})", self.id),
            None => write!(f, "{}", self.id),
        }
    }
}

/// A filter error.
#[derive(Debug, Error)]
pub enum FilterError {
    /// The filter id is not supported.
    #[error("unsupported filter id {0}")]
    UnsupportedFilter(u16),
    /// The filter client data is invalid.
    #[error("invalid client data {client_data:?} for filter {id}: {reason}")]
    InvalidClientData {
        /// The filter id.
        id: u16,
        /// The client data.
        client_data: Vec<u32>,
        /// Why the client data is invalid.
        reason: String,
    },
    /// An IO error, e.g. a corrupt compressed stream.
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    /// A decoded chunk exceeds the maximum chunk size.
    #[error("decoded chunk size {size} exceeds the maximum chunk size {max}")]
    ChunkTooLarge {
        /// The decoded size, or a lower bound of it.
        size: usize,
        /// The maximum chunk size.
        max: usize,
    },
    /// The input to the Fletcher-32 filter is shorter than its checksum.
    #[error("fletcher32 filter input of {0} bytes is shorter than the 4 byte checksum")]
    TruncatedChecksum(usize),
}

/// Filter traits.
pub trait FilterTraits: core::fmt::Debug + Send + Sync {
    /// The filter id.
    fn id(&self) -> u16;

    /// Reverse the filter on `encoded`.
    ///
    /// # Errors
    /// Returns a [`FilterError`] if the input cannot be decoded.
    fn decode(&self, encoded: Vec<u8>, options: &FilterOptions) -> Result<Vec<u8>, FilterError>;
}

/// Create the filter described by `descriptor`.
///
/// # Errors
/// Returns [`FilterError::UnsupportedFilter`] for an unknown id, or if the id is deflate and the `deflate` feature is disabled.
/// Returns [`FilterError::InvalidClientData`] if the client data is unsuitable for the filter.
pub fn filter_from_descriptor(
    descriptor: &FilterDescriptor,
) -> Result<Box<dyn FilterTraits>, FilterError> {
    match descriptor.id() {
        #[cfg(feature = "deflate")]
        FILTER_ID_DEFLATE => Ok(Box::new(DeflateFilter)),
        FILTER_ID_SHUFFLE => Ok(Box::new(ShuffleFilter::new_with_descriptor(descriptor)?)),
        FILTER_ID_FLETCHER32 => Ok(Box::new(Fletcher32Filter)),
        id => Err(FilterError::UnsupportedFilter(id)),
    }
}
