use derive_more::Display;
use serde::{Deserialize, Serialize};

/// The byte order of stored elements, either `big` or `little`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endianness {
    /// Little endian.
    #[display("little")]
    Little,

    /// Big endian.
    #[display("big")]
    Big,
}

impl Endianness {
    /// Return true if the endianness matches the endianness of the CPU.
    #[must_use]
    pub fn is_native(self) -> bool {
        self == NATIVE_ENDIAN
    }
}

/// The endianness of the CPU.
pub const NATIVE_ENDIAN: Endianness = if cfg!(target_endian = "big") {
    Endianness::Big
} else {
    Endianness::Little
};

/// Convert `bytes` holding elements of `element_size` bytes between `endianness` and the native byte order.
///
/// This is a no-op if `endianness` is native or the element size is 1.
/// Trailing bytes beyond the last whole element are left untouched.
pub fn reverse_endianness(bytes: &mut [u8], element_size: usize, endianness: Endianness) {
    if endianness.is_native() || element_size <= 1 {
        return;
    }
    bytes
        .chunks_exact_mut(element_size)
        .for_each(<[u8]>::reverse);
}
