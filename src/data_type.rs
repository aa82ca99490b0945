//! Data types.
//!
//! A [`DataType`] is one of a closed set of element types found in HDF5 and netCDF-4 datasets.
//! Together with the stored byte order and an optional [`FillValue`] it forms the [`TypeInfo`] consumed by the [read assembler](crate::read).
//!
//! Variable length strings and sequences are stored as fixed size [heap ids](crate::read::HeapId) that reference a separate heap region.

mod compound;
mod endianness;
mod fill_value;

pub use compound::{CompoundMember, CompoundType, IllegalStructureSizeError};
pub use endianness::{reverse_endianness, Endianness, NATIVE_ENDIAN};
pub use fill_value::FillValue;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The size in bytes of a stored heap id.
pub const HEAP_ID_SIZE: usize = 16;

/// A data type.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[rustfmt::skip]
pub enum DataType {
    /// `int8` Integer in `[-2^7, 2^7-1]`.
    Int8,
    /// `int16` Integer in `[-2^15, 2^15-1]`.
    Int16,
    /// `int32` Integer in `[-2^31, 2^31-1]`.
    Int32,
    /// `int64` Integer in `[-2^63, 2^63-1]`.
    Int64,
    /// `uint8` Integer in `[0, 2^8-1]`.
    #[serde(rename = "uint8")]
    UInt8,
    /// `uint16` Integer in `[0, 2^16-1]`.
    #[serde(rename = "uint16")]
    UInt16,
    /// `uint32` Integer in `[0, 2^32-1]`.
    #[serde(rename = "uint32")]
    UInt32,
    /// `uint64` Integer in `[0, 2^64-1]`.
    #[serde(rename = "uint64")]
    UInt64,
    /// `float32` IEEE 754 single-precision floating point.
    Float32,
    /// `float64` IEEE 754 double-precision floating point.
    Float64,
    /// `char` A single byte character.
    Char,
    /// `opaque` Fixed size uninterpreted records, the stored usize is the size in bytes.
    Opaque(usize),
    /// A variable length string, stored as a heap id.
    String,
    /// A variable length sequence of a fixed size base type, stored as a heap id.
    VariableLength(Box<DataType>),
    /// An enumeration over an integer base type.
    Enum(Box<DataType>),
    /// A compound (structure) type.
    Compound(CompoundType),
}

impl core::fmt::Display for DataType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Opaque(size) => write!(f, "opaque({size})"),
            Self::VariableLength(base) => write!(f, "vlen({base})"),
            Self::Enum(base) => write!(f, "enum({base})"),
            _ => f.write_str(self.identifier()),
        }
    }
}

/// An unsupported data type error.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("unsupported data type {0}")]
pub struct UnsupportedDataTypeError(String);

impl From<&DataType> for UnsupportedDataTypeError {
    fn from(data_type: &DataType) -> Self {
        Self(data_type.to_string())
    }
}

/// A fill value incompatibility error.
#[derive(Debug, Error)]
#[error("incompatible fill value {1} for data type {0}")]
pub struct IncompatibleFillValueError(String, FillValue);

impl IncompatibleFillValueError {
    /// Create a new incompatible fill value error.
    #[must_use]
    pub const fn new(data_type_name: String, fill_value: FillValue) -> Self {
        Self(data_type_name, fill_value)
    }
}

impl DataType {
    /// Returns the identifier.
    #[must_use]
    pub const fn identifier(&self) -> &'static str {
        match self {
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::UInt8 => "uint8",
            Self::UInt16 => "uint16",
            Self::UInt32 => "uint32",
            Self::UInt64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Char => "char",
            Self::Opaque(_) => "opaque",
            Self::String => "string",
            Self::VariableLength(_) => "vlen",
            Self::Enum(_) => "enum",
            Self::Compound(_) => "compound",
        }
    }

    /// Returns the stored size in bytes of one element.
    ///
    /// Variable length types have the size of their heap id.
    #[must_use]
    pub fn size(&self) -> usize {
        match self {
            Self::Int8 | Self::UInt8 | Self::Char => 1,
            Self::Int16 | Self::UInt16 => 2,
            Self::Int32 | Self::UInt32 | Self::Float32 => 4,
            Self::Int64 | Self::UInt64 | Self::Float64 => 8,
            Self::Opaque(size) => *size,
            Self::String | Self::VariableLength(_) => HEAP_ID_SIZE,
            Self::Enum(base) => base.size(),
            Self::Compound(compound) => compound.size(),
        }
    }

    /// Returns true if elements are stored as heap ids.
    #[must_use]
    pub const fn is_heap(&self) -> bool {
        matches!(self, Self::String | Self::VariableLength(_))
    }

    /// Returns true for integer types.
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::Int8
                | Self::Int16
                | Self::Int32
                | Self::Int64
                | Self::UInt8
                | Self::UInt16
                | Self::UInt32
                | Self::UInt64
        )
    }

    /// Returns the type that stored bytes are interpreted as.
    ///
    /// An enumeration is read as its base integer type, every other type as itself.
    #[must_use]
    pub fn storage_type(&self) -> &DataType {
        match self {
            Self::Enum(base) => base.storage_type(),
            data_type => data_type,
        }
    }

    /// Returns the size of the unit that byte order applies to, or [`None`] if byte order does not apply to the type as a whole.
    ///
    /// Compound records have per member byte order and opaque records have none.
    #[must_use]
    pub fn byte_order_unit(&self) -> Option<usize> {
        match self.storage_type() {
            Self::Opaque(_) | Self::Compound(_) | Self::String | Self::VariableLength(_) => None,
            data_type => Some(data_type.size()),
        }
    }

    /// Returns the netCDF default fill value of the data type, in native byte order.
    ///
    /// Types without a netCDF default (opaque, compound, variable length) are filled with zeros, so a variable length fill is a null heap id.
    #[must_use]
    #[allow(clippy::unreadable_literal)]
    pub fn default_fill_value(&self) -> FillValue {
        match self {
            Self::Int8 => FillValue::from(-127i8),
            Self::Int16 => FillValue::from(-32767i16),
            Self::Int32 => FillValue::from(-2147483647i32),
            Self::Int64 => FillValue::from(-9223372036854775806i64),
            Self::UInt8 => FillValue::from(255u8),
            Self::UInt16 => FillValue::from(65535u16),
            Self::UInt32 => FillValue::from(4294967295u32),
            Self::UInt64 => FillValue::from(18446744073709551614u64),
            Self::Float32 => FillValue::from(9.96921e36f32),
            Self::Float64 => FillValue::from(9.969209968386869e36f64),
            Self::Char => FillValue::from(0u8),
            Self::Enum(base) => base.default_fill_value(),
            Self::Opaque(_) | Self::String | Self::VariableLength(_) | Self::Compound(_) => {
                FillValue::new(vec![0; self.size()])
            }
        }
    }
}

/// The type information of a stored variable.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct TypeInfo {
    data_type: DataType,
    endianness: Endianness,
    fill_value: Option<FillValue>,
}

impl TypeInfo {
    /// Create new type information without a declared fill value.
    #[must_use]
    pub fn new(data_type: DataType, endianness: Endianness) -> Self {
        Self {
            data_type,
            endianness,
            fill_value: None,
        }
    }

    /// Set the declared fill value.
    ///
    /// # Errors
    /// Returns [`IncompatibleFillValueError`] if the fill value size does not match the element size.
    pub fn with_fill_value(mut self, fill_value: FillValue) -> Result<Self, IncompatibleFillValueError> {
        if fill_value.size() == self.data_type.size() {
            self.fill_value = Some(fill_value);
            Ok(self)
        } else {
            Err(IncompatibleFillValueError::new(
                self.data_type.to_string(),
                fill_value,
            ))
        }
    }

    /// The data type.
    #[must_use]
    pub const fn data_type(&self) -> &DataType {
        &self.data_type
    }

    /// The stored byte order.
    #[must_use]
    pub const fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// The declared fill value.
    #[must_use]
    pub const fn fill_value(&self) -> Option<&FillValue> {
        self.fill_value.as_ref()
    }

    /// The stored element size in bytes.
    #[must_use]
    pub fn element_size(&self) -> usize {
        self.data_type.size()
    }

    /// The fill value of one element in the stored byte order.
    ///
    /// This is the declared fill value, or the [default fill value](DataType::default_fill_value) if none is declared.
    #[must_use]
    pub fn stored_fill_bytes(&self) -> Vec<u8> {
        let mut bytes = self.fill_value.as_ref().map_or_else(
            || self.data_type.default_fill_value().as_ne_bytes().to_vec(),
            |fill_value| fill_value.as_ne_bytes().to_vec(),
        );
        if let Some(unit) = self.data_type.byte_order_unit() {
            reverse_endianness(&mut bytes, unit, self.endianness);
        }
        bytes
    }
}
