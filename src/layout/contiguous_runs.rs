use crate::section::{row_major_strides, Section};

/// A contiguous copy of `len` elements from element `src` of a chunk to element `dst` of the destination.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct Run {
    pub(crate) src: u64,
    pub(crate) dst: u64,
    pub(crate) len: u64,
}

/// The runs copying the intersection of a wanted section and one chunk.
///
/// Trailing dimensions that are contiguous in both the chunk and the destination are coalesced into a single run.
#[derive(Clone, Debug)]
pub(crate) struct ContiguousRuns {
    counts: Vec<u64>,
    src_steps: Vec<u64>,
    dst_steps: Vec<u64>,
    src_base: u64,
    dst_base: u64,
    run_len: u64,
    index: Vec<u64>,
    remaining: u64,
}

impl ContiguousRuns {
    /// Create the runs for the chunk at `origin` with nominal shape `chunk_shape`.
    ///
    /// `extent` is the declared shape of the variable: the chunk is clamped to it, so ragged trailing chunks contribute only their valid elements.
    /// Source offsets still use the nominal chunk shape.
    /// `want` must be filled to the rank of `extent`, and `origin` and `chunk_shape` must have at least that rank.
    ///
    /// Returns [`None`] if the chunk does not intersect `want`.
    pub(crate) fn new(
        want: &Section,
        want_strides: &[u64],
        extent: &[u64],
        origin: &[u64],
        chunk_shape: &[u64],
    ) -> Option<Self> {
        let rank = want.rank();
        let chunk_strides = row_major_strides(&chunk_shape[..rank]);
        let mut counts = Vec::with_capacity(rank);
        let mut src_steps = Vec::with_capacity(rank);
        let mut dst_steps = Vec::with_capacity(rank);
        let mut src_base = 0;
        let mut dst_base = 0;
        for (dim, range) in want.ranges().iter().enumerate() {
            let lo = origin[dim];
            let end = std::cmp::min(lo.saturating_add(chunk_shape[dim]), extent[dim]);
            if end <= lo {
                return None;
            }
            let (start, count) = range.intersect_interval(lo, end - 1)?;
            src_base += (range.element(start) - lo) * chunk_strides[dim];
            dst_base += start * want_strides[dim];
            counts.push(count);
            src_steps.push(range.stride() * chunk_strides[dim]);
            dst_steps.push(want_strides[dim]);
        }

        let mut run_len = 1;
        let mut outer = rank;
        while outer > 0 {
            let dim = outer - 1;
            let contiguous = src_steps[dim] == run_len && dst_steps[dim] == run_len;
            if counts[dim] == 1 || contiguous {
                run_len *= counts[dim];
                outer = dim;
            } else {
                break;
            }
        }
        counts.truncate(outer);
        src_steps.truncate(outer);
        dst_steps.truncate(outer);

        Some(Self {
            remaining: counts.iter().product(),
            index: vec![0; outer],
            counts,
            src_steps,
            dst_steps,
            src_base,
            dst_base,
            run_len,
        })
    }

    /// The number of elements in each run.
    pub(crate) fn run_len(&self) -> u64 {
        self.run_len
    }
}

impl Iterator for ContiguousRuns {
    type Item = Run;

    fn next(&mut self) -> Option<Run> {
        if self.remaining == 0 {
            return None;
        }
        let (mut src, mut dst) = (self.src_base, self.dst_base);
        for ((i, src_step), dst_step) in self.index.iter().zip(&self.src_steps).zip(&self.dst_steps) {
            src += i * src_step;
            dst += i * dst_step;
        }
        self.remaining -= 1;
        for (i, count) in self.index.iter_mut().zip(&self.counts).rev() {
            *i += 1;
            if *i < *count {
                break;
            }
            *i = 0;
        }
        Some(Run {
            src,
            dst,
            len: self.run_len,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.remaining).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}
