use serde::{Deserialize, Serialize};

use super::{filter_from_descriptor, FilterDescriptor, FilterError, FilterOptions};

/// An ordered list of filters, as applied when writing.
///
/// Decoding applies the filters in reverse.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterPipeline {
    filters: Vec<FilterDescriptor>,
}

impl From<Vec<FilterDescriptor>> for FilterPipeline {
    fn from(filters: Vec<FilterDescriptor>) -> Self {
        Self { filters }
    }
}

impl FilterPipeline {
    /// Create a new filter pipeline.
    #[must_use]
    pub fn new(filters: Vec<FilterDescriptor>) -> Self {
        Self { filters }
    }

    /// The filters, in write order.
    #[must_use]
    pub fn filters(&self) -> &[FilterDescriptor] {
        &self.filters
    }

    /// Returns true if the pipeline has no filters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Decode a stored chunk.
    ///
    /// Filters are applied from last to first.
    /// The filter at index `i` is skipped if bit `i` of `skip_mask` is set; filters beyond index 31 are never skipped.
    ///
    /// # Errors
    /// Returns a [`FilterError`] if a filter that is not skipped is unsupported or fails to decode.
    pub fn decode(
        &self,
        encoded: Vec<u8>,
        skip_mask: u32,
        options: &FilterOptions,
    ) -> Result<Vec<u8>, FilterError> {
        let mut bytes = encoded;
        for (index, descriptor) in self.filters.iter().enumerate().rev() {
            if is_skipped(skip_mask, index) {
                tracing::debug!(filter = %descriptor, index, "skipping filter");
                continue;
            }
            let filter = filter_from_descriptor(descriptor)?;
            let bytes_in = bytes.len();
            bytes = filter.decode(bytes, options)?;
            tracing::debug!(
                filter = %descriptor,
                bytes_in,
                bytes_out = bytes.len(),
                "applied filter"
            );
        }
        Ok(bytes)
    }
}

fn is_skipped(skip_mask: u32, index: usize) -> bool {
    u32::try_from(index)
        .ok()
        .and_then(|index| skip_mask.checked_shr(index))
        .is_some_and(|mask| mask & 1 != 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{ShuffleFilter, FILTER_ID_SHUFFLE};

    #[test]
    fn filter_pipeline_reverse_order() {
        // written as shuffle then fletcher32, so fletcher32 is stripped first
        let pipeline = FilterPipeline::new(vec![
            FilterDescriptor::shuffle(2),
            FilterDescriptor::fletcher32(),
        ]);
        let decoded = pipeline
            .decode(vec![1, 2, 3, 4, 0, 0, 0, 0], 0, &FilterOptions::default())
            .unwrap();
        assert_eq!(decoded, vec![1, 3, 2, 4]);
    }

    #[test]
    fn filter_pipeline_skip_mask() {
        let pipeline = FilterPipeline::new(vec![
            FilterDescriptor::new(999, vec![]),
            FilterDescriptor::shuffle(2),
        ]);
        let options = FilterOptions::default();
        assert!(matches!(
            pipeline.decode(vec![1, 2, 3, 4], 0, &options),
            Err(FilterError::UnsupportedFilter(999))
        ));
        assert_eq!(
            pipeline.decode(vec![1, 2, 3, 4], 0b01, &options).unwrap(),
            vec![1, 3, 2, 4]
        );
        assert_eq!(
            pipeline.decode(vec![1, 2, 3, 4], 0b11, &options).unwrap(),
            vec![1, 2, 3, 4]
        );
    }

    #[test]
    fn filter_pipeline_skip_mask_high_index() {
        let mut filters = vec![FilterDescriptor::shuffle(1); 32];
        filters.push(FilterDescriptor::new(FILTER_ID_SHUFFLE, vec![]));
        let pipeline = FilterPipeline::new(filters);
        assert!(pipeline
            .decode(vec![1, 2], u32::MAX, &FilterOptions::default())
            .is_err());
    }

    #[test]
    fn filter_pipeline_empty() {
        let pipeline = FilterPipeline::default();
        assert!(pipeline.is_empty());
        assert_eq!(
            pipeline
                .decode(vec![5, 6], 0, &FilterOptions::default())
                .unwrap(),
            vec![5, 6]
        );
    }

    #[test]
    fn filter_pipeline_serde() {
        let pipeline = FilterPipeline::from(vec![FilterDescriptor::shuffle(4)]);
        let json = serde_json::to_string(&pipeline).unwrap();
        let pipeline2: FilterPipeline = serde_json::from_str(&json).unwrap();
        assert_eq!(pipeline, pipeline2);
        let data: Vec<u8> = (0..16).collect();
        let encoded = ShuffleFilter::new(4).encode(&data);
        assert_eq!(
            pipeline2
                .decode(encoded, 0, &FilterOptions::default())
                .unwrap(),
            data
        );
    }
}
