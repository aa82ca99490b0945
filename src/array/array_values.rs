use derive_more::From;

use crate::data_type::{reverse_endianness, DataType, Endianness, UnsupportedDataTypeError};

use super::StructureArray;

/// The decoded values of an array, one variant per element representation.
#[derive(Clone, Debug, PartialEq, From)]
pub enum ArrayValues {
    /// `int8` values.
    Int8(Vec<i8>),
    /// `int16` values.
    Int16(Vec<i16>),
    /// `int32` values.
    Int32(Vec<i32>),
    /// `int64` values.
    Int64(Vec<i64>),
    /// `uint8` values.
    UInt8(Vec<u8>),
    /// `uint16` values.
    UInt16(Vec<u16>),
    /// `uint32` values.
    UInt32(Vec<u32>),
    /// `uint64` values.
    UInt64(Vec<u64>),
    /// `float32` values.
    Float32(Vec<f32>),
    /// `float64` values.
    Float64(Vec<f64>),
    /// Single byte characters.
    Char(Vec<char>),
    /// Opaque records.
    Opaque(Vec<Vec<u8>>),
    /// Variable length strings.
    String(Vec<String>),
    /// Variable length sequences, one per element.
    VariableLength(Vec<ArrayValues>),
    /// Compound records.
    Structure(StructureArray),
}

impl ArrayValues {
    /// The number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Int8(v) => v.len(),
            Self::Int16(v) => v.len(),
            Self::Int32(v) => v.len(),
            Self::Int64(v) => v.len(),
            Self::UInt8(v) => v.len(),
            Self::UInt16(v) => v.len(),
            Self::UInt32(v) => v.len(),
            Self::UInt64(v) => v.len(),
            Self::Float32(v) => v.len(),
            Self::Float64(v) => v.len(),
            Self::Char(v) => v.len(),
            Self::Opaque(v) => v.len(),
            Self::String(v) => v.len(),
            Self::VariableLength(v) => v.len(),
            Self::Structure(v) => v.len(),
        }
    }

    /// Returns true if there are no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decode stored fixed size elements of `data_type` with byte order `endianness`.
    ///
    /// Enumerations decode to their base integer type.
    ///
    /// # Errors
    /// Returns [`UnsupportedDataTypeError`] if `data_type` is not a fixed size scalar type (heap and compound types), or is a zero sized opaque type.
    pub fn from_stored_bytes(
        data_type: &DataType,
        endianness: Endianness,
        mut bytes: Vec<u8>,
    ) -> Result<Self, UnsupportedDataTypeError> {
        let storage_type = data_type.storage_type();
        if let Some(unit) = storage_type.byte_order_unit() {
            reverse_endianness(&mut bytes, unit, endianness);
        }
        Ok(match storage_type {
            DataType::Int8 => Self::Int8(bytemuck::allocation::pod_collect_to_vec(&bytes)),
            DataType::Int16 => Self::Int16(bytemuck::allocation::pod_collect_to_vec(&bytes)),
            DataType::Int32 => Self::Int32(bytemuck::allocation::pod_collect_to_vec(&bytes)),
            DataType::Int64 => Self::Int64(bytemuck::allocation::pod_collect_to_vec(&bytes)),
            DataType::UInt8 => Self::UInt8(bytes),
            DataType::UInt16 => Self::UInt16(bytemuck::allocation::pod_collect_to_vec(&bytes)),
            DataType::UInt32 => Self::UInt32(bytemuck::allocation::pod_collect_to_vec(&bytes)),
            DataType::UInt64 => Self::UInt64(bytemuck::allocation::pod_collect_to_vec(&bytes)),
            DataType::Float32 => Self::Float32(bytemuck::allocation::pod_collect_to_vec(&bytes)),
            DataType::Float64 => Self::Float64(bytemuck::allocation::pod_collect_to_vec(&bytes)),
            DataType::Char => Self::Char(bytes.into_iter().map(char::from).collect()),
            DataType::Opaque(size) if *size > 0 => {
                Self::Opaque(bytes.chunks_exact(*size).map(<[u8]>::to_vec).collect())
            }
            _ => return Err(data_type.into()),
        })
    }
}

/// An element type of [`ArrayValues`].
pub trait ArrayElement: Sized {
    /// Return the values as a slice of `Self`, or [`None`] if they hold a different type.
    fn slice(values: &ArrayValues) -> Option<&[Self]>;
}

macro_rules! impl_array_element {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl ArrayElement for $t {
                fn slice(values: &ArrayValues) -> Option<&[Self]> {
                    if let ArrayValues::$variant(v) = values {
                        Some(v.as_slice())
                    } else {
                        None
                    }
                }
            }
        )*
    };
}

impl_array_element!(
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
    f32 => Float32,
    f64 => Float64,
    char => Char,
    Vec<u8> => Opaque,
    String => String,
    ArrayValues => VariableLength,
);
