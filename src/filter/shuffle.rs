use super::{FilterDescriptor, FilterError, FilterOptions, FilterTraits, FILTER_ID_SHUFFLE};

/// The byte `shuffle` filter.
///
/// Shuffling groups the `i`th byte of every element together, which typically improves compression.
/// Bytes after the last whole element are left in place.
#[derive(Clone, Copy, Debug)]
pub struct ShuffleFilter {
    element_size: usize,
}

impl ShuffleFilter {
    /// Create a new shuffle filter for elements of `element_size` bytes.
    #[must_use]
    pub const fn new(element_size: usize) -> Self {
        Self { element_size }
    }

    /// Create a new shuffle filter from a descriptor.
    ///
    /// # Errors
    /// Returns [`FilterError::InvalidClientData`] if the client data does not hold the element size.
    pub fn new_with_descriptor(descriptor: &FilterDescriptor) -> Result<Self, FilterError> {
        let invalid = |reason: &str| FilterError::InvalidClientData {
            id: descriptor.id(),
            client_data: descriptor.client_data().to_vec(),
            reason: reason.to_string(),
        };
        let element_size = descriptor
            .client_data()
            .first()
            .ok_or_else(|| invalid("missing element size"))?;
        let element_size =
            usize::try_from(*element_size).map_err(|_| invalid("element size exceeds usize"))?;
        Ok(Self::new(element_size))
    }

    /// The element size.
    #[must_use]
    pub const fn element_size(&self) -> usize {
        self.element_size
    }

    /// Shuffle `decoded`.
    ///
    /// Only used to build filtered fixtures in tests and benchmarks, chunks are never written.
    #[doc(hidden)]
    #[must_use]
    pub fn encode(&self, decoded: &[u8]) -> Vec<u8> {
        let n = self.element_size;
        if n <= 1 {
            return decoded.to_vec();
        }
        let m = decoded.len() / n;
        let mut out = decoded.to_vec();
        for i in 0..m {
            for j in 0..n {
                out[j * m + i] = decoded[i * n + j];
            }
        }
        out
    }

    fn unshuffle(&self, encoded: Vec<u8>) -> Vec<u8> {
        let n = self.element_size;
        if n <= 1 || encoded.len() < n {
            return encoded;
        }
        let m = encoded.len() / n;
        let mut out = vec![0; encoded.len()];
        for (i, element) in out.chunks_exact_mut(n).enumerate() {
            for (j, byte) in element.iter_mut().enumerate() {
                *byte = encoded[j * m + i];
            }
        }
        out[m * n..].copy_from_slice(&encoded[m * n..]);
        out
    }
}

impl FilterTraits for ShuffleFilter {
    fn id(&self) -> u16 {
        FILTER_ID_SHUFFLE
    }

    fn decode(&self, encoded: Vec<u8>, _options: &FilterOptions) -> Result<Vec<u8>, FilterError> {
        Ok(self.unshuffle(encoded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shuffle_decode() {
        let options = FilterOptions::default();
        let decoded = ShuffleFilter::new(2)
            .decode(vec![1, 2, 3, 4], &options)
            .unwrap();
        assert_eq!(decoded, vec![1, 3, 2, 4]);

        // bytes 0..8 of two u32 elements
        let decoded = ShuffleFilter::new(4)
            .decode(vec![0, 4, 1, 5, 2, 6, 3, 7], &options)
            .unwrap();
        assert_eq!(decoded, (0..8).collect::<Vec<u8>>());
    }

    #[test]
    fn shuffle_noop() {
        let options = FilterOptions::default();
        let data = vec![9, 8, 7, 6, 5];
        for n in [0, 1] {
            let filter = ShuffleFilter::new(n);
            assert_eq!(filter.encode(&data), data);
            assert_eq!(filter.decode(data.clone(), &options).unwrap(), data);
        }
        // shorter than one element
        assert_eq!(
            ShuffleFilter::new(8).decode(data.clone(), &options).unwrap(),
            data
        );
    }

    #[test]
    fn shuffle_round_trip() {
        let options = FilterOptions::default();
        let data: Vec<u8> = (0..=255).collect();
        for n in [1, 2, 4, 8] {
            let filter = ShuffleFilter::new(n);
            let encoded = filter.encode(&data);
            assert_eq!(filter.decode(encoded, &options).unwrap(), data);
        }
    }

    #[test]
    fn shuffle_remainder_untouched() {
        let options = FilterOptions::default();
        let filter = ShuffleFilter::new(4);
        let data: Vec<u8> = (0..10).collect();
        let encoded = filter.encode(&data);
        assert_eq!(&encoded[8..], &[8, 9]);
        assert_eq!(filter.decode(encoded, &options).unwrap(), data);
    }

    #[test]
    fn shuffle_missing_client_data() {
        assert!(matches!(
            ShuffleFilter::new_with_descriptor(&FilterDescriptor::new(FILTER_ID_SHUFFLE, vec![])),
            Err(FilterError::InvalidClientData { id: 2, .. })
        ));
        let filter =
            ShuffleFilter::new_with_descriptor(&FilterDescriptor::shuffle(8)).unwrap();
        assert_eq!(filter.element_size(), 8);
    }
}
