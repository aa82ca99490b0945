use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::filter::FilterOptions;

use super::ChunkCache;

/// A cancellation flag shared between a reader and the caller.
///
/// Layouts check the token between chunks, never while a chunk is being read or decoded.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a new token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Returns true if cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Options for laying out and reading a section.
#[derive(Clone, Default)]
pub struct LayoutOptions {
    filter_options: FilterOptions,
    chunk_cache: Option<Arc<dyn ChunkCache>>,
    cancel_token: Option<CancelToken>,
}

impl core::fmt::Debug for LayoutOptions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LayoutOptions")
            .field("filter_options", &self.filter_options)
            .field("chunk_cache", &self.chunk_cache.is_some())
            .field("cancel_token", &self.cancel_token)
            .finish()
    }
}

impl LayoutOptions {
    /// Create a new layout options builder.
    #[must_use]
    pub fn builder() -> LayoutOptionsBuilder {
        LayoutOptionsBuilder::new()
    }

    /// Return the filter options.
    #[must_use]
    pub fn filter_options(&self) -> &FilterOptions {
        &self.filter_options
    }

    /// Return the decoded chunk cache.
    #[must_use]
    pub fn chunk_cache(&self) -> Option<&Arc<dyn ChunkCache>> {
        self.chunk_cache.as_ref()
    }

    /// Return the cancellation token.
    #[must_use]
    pub fn cancel_token(&self) -> Option<&CancelToken> {
        self.cancel_token.as_ref()
    }

    /// Set the decoded chunk cache.
    pub fn set_chunk_cache(&mut self, chunk_cache: Option<Arc<dyn ChunkCache>>) {
        self.chunk_cache = chunk_cache;
    }

    /// Returns true if cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel_token
            .as_ref()
            .is_some_and(CancelToken::is_cancelled)
    }
}

/// Builder for [`LayoutOptions`].
#[derive(Clone, Default)]
pub struct LayoutOptionsBuilder {
    options: LayoutOptions,
}

impl LayoutOptionsBuilder {
    /// Create a new layout options builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build into layout options.
    #[must_use]
    pub fn build(&self) -> LayoutOptions {
        self.options.clone()
    }

    /// Set the filter options.
    #[must_use]
    pub fn filter_options(mut self, filter_options: FilterOptions) -> Self {
        self.options.filter_options = filter_options;
        self
    }

    /// Set the decoded chunk cache.
    #[must_use]
    pub fn chunk_cache(mut self, chunk_cache: Arc<dyn ChunkCache>) -> Self {
        self.options.chunk_cache = Some(chunk_cache);
        self
    }

    /// Set the cancellation token.
    #[must_use]
    pub fn cancel_token(mut self, cancel_token: CancelToken) -> Self {
        self.options.cancel_token = Some(cancel_token);
        self
    }
}
