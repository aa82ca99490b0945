//! Array sections.
//!
//! A [`Section`] is the request model for reading a subset of a variable: one strided [`Range`] per dimension.
//! Sections are used in the caller's index space (the *wanted* section) and are translated by the [layout engine](crate::layout) into the local index space of each storage chunk.
//!
//! A section can be written in its textual form, e.g. `"0:9:2,:,3"`, where each comma separated dimension is `first:last:stride`, `first:last`, a single index, or `:` for the whole dimension.

mod range;

pub use range::{InvalidRangeError, Range};

use std::str::FromStr;

use itertools::izip;
use thiserror::Error;

use crate::array::ArrayShape;

/// A section of an array.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Section {
    ranges: Vec<Range>,
}

/// A section error.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum SectionError {
    /// The section rank does not match the array rank.
    #[error("section rank {0} does not match array rank {1}")]
    IncompatibleRank(usize, usize),
    /// A range extends beyond the array shape.
    #[error("section range {range} in dimension {dim} is out of bounds of extent {extent}")]
    OutOfBounds {
        /// The dimension.
        dim: usize,
        /// The offending range.
        range: Range,
        /// The extent of the dimension.
        extent: u64,
    },
    /// An invalid range.
    #[error(transparent)]
    InvalidRange(#[from] InvalidRangeError),
    /// The textual form of a section could not be parsed.
    #[error("invalid section string {0:?}")]
    Parse(String),
}

impl core::fmt::Display for Section {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for (i, range) in self.ranges.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{range}")?;
        }
        Ok(())
    }
}

impl From<Vec<Range>> for Section {
    fn from(ranges: Vec<Range>) -> Self {
        Self { ranges }
    }
}

impl Section {
    /// Create a new section from `ranges`.
    #[must_use]
    pub fn new(ranges: Vec<Range>) -> Self {
        Self { ranges }
    }

    /// Create a section covering the whole of an array with `shape`.
    #[must_use]
    pub fn new_with_shape(shape: &[u64]) -> Self {
        Self {
            ranges: shape.iter().copied().map(Range::new_full).collect(),
        }
    }

    /// Create a stride 1 section from a `start` and `shape`.
    ///
    /// # Errors
    /// Returns [`SectionError::IncompatibleRank`] if the lengths of `start` and `shape` differ.
    pub fn new_with_start_shape(start: &[u64], shape: &[u64]) -> Result<Self, SectionError> {
        if start.len() != shape.len() {
            return Err(SectionError::IncompatibleRank(start.len(), shape.len()));
        }
        let ranges = std::iter::zip(start, shape)
            .map(|(&start, &len)| {
                if len == 0 {
                    Ok(Range::empty())
                } else {
                    Range::new_contiguous(start, start + len - 1)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { ranges })
    }

    /// Return the ranges.
    #[must_use]
    pub fn ranges(&self) -> &[Range] {
        &self.ranges
    }

    /// Return the range of dimension `dim`.
    #[must_use]
    pub fn range(&self, dim: usize) -> Option<&Range> {
        self.ranges.get(dim)
    }

    /// Return the rank.
    #[must_use]
    pub fn rank(&self) -> usize {
        self.ranges.len()
    }

    /// Return the shape of the section, the number of selected indices in each dimension.
    #[must_use]
    pub fn shape(&self) -> ArrayShape {
        self.ranges.iter().map(Range::len).collect()
    }

    /// Return the number of elements selected by the section.
    #[must_use]
    pub fn num_elements(&self) -> u64 {
        self.ranges.iter().map(Range::len).product()
    }

    /// Returns true if the section selects no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranges.iter().any(Range::is_empty)
    }

    /// Return the row-major strides of the section shape, in elements.
    #[must_use]
    pub fn row_strides(&self) -> Vec<u64> {
        row_major_strides(&self.shape())
    }

    /// Fill omitted trailing dimensions with whole dimension ranges of `shape`.
    ///
    /// Ranges already present are kept as is and are not validated.
    ///
    /// # Errors
    /// Returns [`SectionError::IncompatibleRank`] if the section has more ranges than `shape` has dimensions.
    pub fn fill(&self, shape: &[u64]) -> Result<Self, SectionError> {
        if self.rank() > shape.len() {
            return Err(SectionError::IncompatibleRank(self.rank(), shape.len()));
        }
        let mut ranges = self.ranges.clone();
        ranges.extend(shape[self.rank()..].iter().copied().map(Range::new_full));
        Ok(Self { ranges })
    }

    /// Check that the section has the rank of `shape` and that every range is within bounds.
    ///
    /// # Errors
    /// Returns a [`SectionError`] if the rank does not match or a range is out of bounds.
    pub fn check_in_bounds(&self, shape: &[u64]) -> Result<(), SectionError> {
        if self.rank() != shape.len() {
            return Err(SectionError::IncompatibleRank(self.rank(), shape.len()));
        }
        for (dim, (range, &extent)) in std::iter::zip(&self.ranges, shape).enumerate() {
            if !range.is_empty() && range.last() >= extent {
                return Err(SectionError::OutOfBounds {
                    dim,
                    range: *range,
                    extent,
                });
            }
        }
        Ok(())
    }

    /// Returns true if any selected element lies within the box starting at `origin` with `shape`.
    ///
    /// Only the leading `self.rank()` dimensions of `origin` and `shape` are considered.
    /// A box extending beyond [`u64::MAX`] does not intersect.
    #[must_use]
    pub fn intersects_box(&self, origin: &[u64], shape: &[u64]) -> bool {
        izip!(&self.ranges, origin, shape).all(|(range, &o, &s)| {
            s > 0
                && o.checked_add(s - 1)
                    .is_some_and(|hi| range.intersect_interval(o, hi).is_some())
        })
    }
}

impl FromStr for Section {
    type Err = SectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_err = || SectionError::Parse(s.to_string());
        let parse_u64 = |v: &str| v.trim().parse::<u64>().map_err(|_| parse_err());
        let mut ranges = Vec::new();
        if s.trim().is_empty() {
            return Ok(Self { ranges });
        }
        for dim in s.split(',') {
            let parts: Vec<&str> = dim.split(':').collect();
            match parts.as_slice() {
                [index] => {
                    let index = parse_u64(index)?;
                    ranges.push(Range::new_contiguous(index, index)?);
                }
                [first, last] if first.trim().is_empty() && last.trim().is_empty() => {
                    return Err(SectionError::Parse(format!(
                        "{s}: whole dimension ranges need a shape, use Section::fill"
                    )));
                }
                [first, last] => {
                    ranges.push(Range::new_contiguous(parse_u64(first)?, parse_u64(last)?)?);
                }
                [first, last, stride] => {
                    ranges.push(Range::new(
                        parse_u64(first)?,
                        parse_u64(last)?,
                        parse_u64(stride)?,
                    )?);
                }
                _ => return Err(parse_err()),
            }
        }
        Ok(Self { ranges })
    }
}

impl Section {
    /// Parse a section in textual form, resolving `:` dimensions against `shape`.
    ///
    /// Omitted trailing dimensions are filled with whole dimension ranges.
    ///
    /// # Errors
    /// Returns a [`SectionError`] if the text is malformed or has more dimensions than `shape`.
    pub fn parse_with_shape(s: &str, shape: &[u64]) -> Result<Self, SectionError> {
        let mut ranges = Vec::new();
        if !s.trim().is_empty() {
            let dims: Vec<&str> = s.split(',').collect();
            if dims.len() > shape.len() {
                return Err(SectionError::IncompatibleRank(dims.len(), shape.len()));
            }
            for (dim, &extent) in std::iter::zip(dims, shape) {
                if dim.trim() == ":" {
                    ranges.push(Range::new_full(extent));
                } else {
                    let section: Section = dim.parse()?;
                    ranges.extend(section.ranges);
                }
            }
        }
        Self { ranges }.fill(shape)
    }
}

/// Return the row-major (last dimension fastest) strides of `shape`.
#[must_use]
pub fn row_major_strides(shape: &[u64]) -> Vec<u64> {
    let mut strides = vec![0; shape.len()];
    let mut stride: u64 = 1;
    for (s, extent) in strides.iter_mut().zip(shape).rev() {
        *s = stride;
        stride = stride.saturating_mul(*extent);
    }
    strides
}
