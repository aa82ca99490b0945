use super::{FilterError, FilterOptions, FilterTraits, FILTER_ID_FLETCHER32};

const CHECKSUM_SIZE: usize = core::mem::size_of::<u32>();

/// The `fletcher32` filter, a trailing 4 byte checksum.
///
/// Decoding strips the checksum without verifying it.
#[derive(Clone, Copy, Debug, Default)]
pub struct Fletcher32Filter;

impl FilterTraits for Fletcher32Filter {
    fn id(&self) -> u16 {
        FILTER_ID_FLETCHER32
    }

    fn decode(
        &self,
        mut encoded: Vec<u8>,
        _options: &FilterOptions,
    ) -> Result<Vec<u8>, FilterError> {
        if encoded.len() < CHECKSUM_SIZE {
            return Err(FilterError::TruncatedChecksum(encoded.len()));
        }
        encoded.truncate(encoded.len() - CHECKSUM_SIZE);
        Ok(encoded)
    }
}
