use std::io::{BufReader, Read};

use flate2::bufread::ZlibDecoder;

use super::{FilterError, FilterOptions, FilterTraits, FILTER_ID_DEFLATE};

/// The `deflate` filter, a zlib stream.
///
/// The compression level in the client data is only relevant when encoding and is ignored.
#[derive(Clone, Copy, Debug, Default)]
pub struct DeflateFilter;

impl FilterTraits for DeflateFilter {
    fn id(&self) -> u16 {
        FILTER_ID_DEFLATE
    }

    fn decode(&self, encoded: Vec<u8>, options: &FilterOptions) -> Result<Vec<u8>, FilterError> {
        let max = options.max_chunk_size();
        let reader = BufReader::with_capacity(options.inflate_buffer_size(), encoded.as_slice());
        let decoder = ZlibDecoder::new(reader);
        let mut out = Vec::with_capacity(std::cmp::min(encoded.len().saturating_mul(8), max));
        // read at most one byte past the maximum to detect overflow
        let limit = u64::try_from(max).unwrap_or(u64::MAX).saturating_add(1);
        decoder.take(limit).read_to_end(&mut out)?;
        if out.len() > max {
            return Err(FilterError::ChunkTooLarge {
                size: out.len(),
                max,
            });
        }
        Ok(out)
    }
}
