use thiserror::Error;

/// A strided range of indices along one dimension.
///
/// A range selects `first, first + stride, ...` up to and including `last`.
/// The stored `last` is always the last element actually selected.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Range {
    first: u64,
    len: u64,
    stride: u64,
}

/// An invalid range error.
#[derive(Copy, Clone, Debug, Error, Eq, PartialEq)]
pub enum InvalidRangeError {
    /// The first index is after the last index.
    #[error("range first {0} is greater than last {1}")]
    Inverted(u64, u64),
    /// The stride is zero.
    #[error("range stride must be at least 1")]
    ZeroStride,
}

impl core::fmt::Display for Range {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{}:{}", self.first, self.last(), self.stride)
    }
}

impl Range {
    /// Create a new range over `first..=last` with `stride`.
    ///
    /// # Errors
    /// Returns [`InvalidRangeError`] if `first > last` or `stride == 0`.
    pub fn new(first: u64, last: u64, stride: u64) -> Result<Self, InvalidRangeError> {
        if stride == 0 {
            Err(InvalidRangeError::ZeroStride)
        } else if first > last {
            Err(InvalidRangeError::Inverted(first, last))
        } else {
            Ok(Self {
                first,
                len: (last - first) / stride + 1,
                stride,
            })
        }
    }

    /// Create a new stride 1 range over `first..=last`.
    ///
    /// # Errors
    /// Returns [`InvalidRangeError`] if `first > last`.
    pub fn new_contiguous(first: u64, last: u64) -> Result<Self, InvalidRangeError> {
        Self::new(first, last, 1)
    }

    /// Create a range covering a whole dimension of extent `len`.
    ///
    /// A zero extent produces an [`empty`](Self::empty) range.
    #[must_use]
    pub const fn new_full(len: u64) -> Self {
        Self {
            first: 0,
            len,
            stride: 1,
        }
    }

    /// Create an empty range, used for dimensions of zero extent.
    #[must_use]
    pub const fn empty() -> Self {
        Self::new_full(0)
    }

    /// The first selected index.
    #[must_use]
    pub const fn first(&self) -> u64 {
        self.first
    }

    /// The last selected index.
    ///
    /// For an empty range this is equal to [`first`](Self::first).
    #[must_use]
    pub const fn last(&self) -> u64 {
        if self.len == 0 {
            self.first
        } else {
            self.first + (self.len - 1) * self.stride
        }
    }

    /// The stride.
    #[must_use]
    pub const fn stride(&self) -> u64 {
        self.stride
    }

    /// The number of selected indices.
    #[must_use]
    pub const fn len(&self) -> u64 {
        self.len
    }

    /// Returns true if the range selects nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the `i`th selected index.
    #[must_use]
    pub const fn element(&self, i: u64) -> u64 {
        self.first + i * self.stride
    }

    /// Returns true if `index` is selected by this range.
    #[must_use]
    pub fn contains(&self, index: u64) -> bool {
        !self.is_empty()
            && index >= self.first
            && index <= self.last()
            && (index - self.first) % self.stride == 0
    }

    /// Intersect the range with the inclusive index interval `lo..=hi`.
    ///
    /// Returns `(i, n)`: the position within this range of the first selected index in the interval and the number of selected indices in the interval.
    /// Returns [`None`] if no selected index falls in the interval.
    #[must_use]
    pub fn intersect_interval(&self, lo: u64, hi: u64) -> Option<(u64, u64)> {
        if self.is_empty() || hi < lo || hi < self.first || lo > self.last() {
            return None;
        }
        let start = lo.saturating_sub(self.first).div_ceil(self.stride);
        let end = std::cmp::min((hi - self.first) / self.stride, self.len - 1);
        (start <= end).then(|| (start, end - start + 1))
    }
}
