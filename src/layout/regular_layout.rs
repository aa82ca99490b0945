use crate::section::Section;

use super::{
    contiguous_runs::ContiguousRuns, LayoutChunk, LayoutError, LayoutSource,
};

/// The layout of a wanted section across contiguous storage.
///
/// The variable is stored row-major and unfiltered starting at a byte position, so every run refers to a [file position](LayoutSource::FilePosition).
#[derive(Debug)]
pub struct RegularLayout {
    want: Section,
    position: u64,
    element_size: u64,
    runs: Option<ContiguousRuns>,
}

impl RegularLayout {
    /// Create the layout of `want` across a variable with `shape` stored contiguously at byte `position` with elements of `element_size` bytes.
    ///
    /// Omitted trailing dimensions of `want` select whole dimensions.
    ///
    /// # Errors
    /// Returns [`LayoutError::InvalidSection`] if `want` is invalid for `shape`.
    pub fn new(
        want: &Section,
        shape: &[u64],
        element_size: usize,
        position: u64,
    ) -> Result<Self, LayoutError> {
        let want = want.fill(shape)?;
        want.check_in_bounds(shape)?;
        let origin = vec![0; shape.len()];
        let runs = ContiguousRuns::new(&want, &want.row_strides(), shape, &origin, shape);
        if let Some(runs) = &runs {
            tracing::debug!(want = %want, run_len = runs.run_len(), "regular layout");
        }
        Ok(Self {
            want,
            position,
            element_size: element_size as u64,
            runs,
        })
    }

    /// The wanted section, filled to the variable rank.
    #[must_use]
    pub fn want(&self) -> &Section {
        &self.want
    }
}

impl Iterator for RegularLayout {
    type Item = LayoutChunk;

    fn next(&mut self) -> Option<LayoutChunk> {
        let run = self.runs.as_mut()?.next()?;
        Some(LayoutChunk::new(
            run.dst,
            LayoutSource::FilePosition(self.position + run.src * self.element_size),
            run.len,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regular_layout_whole() {
        let layout = RegularLayout::new(&Section::default(), &[3, 4], 2, 100).unwrap();
        let chunks: Vec<LayoutChunk> = layout.collect();
        assert_eq!(
            chunks,
            vec![LayoutChunk::new(0, LayoutSource::FilePosition(100), 12)]
        );
    }

    #[test]
    fn regular_layout_subset() {
        let want: Section = "1:2,1:2".parse().unwrap();
        let layout = RegularLayout::new(&want, &[3, 4], 2, 100).unwrap();
        let chunks: Vec<LayoutChunk> = layout.collect();
        assert_eq!(
            chunks,
            vec![
                LayoutChunk::new(0, LayoutSource::FilePosition(110), 2),
                LayoutChunk::new(2, LayoutSource::FilePosition(118), 2),
            ]
        );
    }

    #[test]
    fn regular_layout_empty() {
        let mut layout = RegularLayout::new(&Section::default(), &[0, 4], 4, 0).unwrap();
        assert!(layout.next().is_none());
        assert!(RegularLayout::new(&"0:3".parse().unwrap(), &[3], 4, 0).is_err());
    }
}
