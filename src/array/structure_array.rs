use std::sync::Arc;

use thiserror::Error;

use crate::data_type::{CompoundMember, CompoundType, DataType, UnsupportedDataTypeError};

use super::ArrayValues;

/// The size in bytes of a heap object index written into a record.
const HEAP_INDEX_SIZE: usize = core::mem::size_of::<i32>();

/// A variable length value resolved from a heap id.
#[derive(Clone, Debug, PartialEq)]
pub enum HeapObject {
    /// A string.
    String(String),
    /// A sequence of fixed size elements.
    Sequence(ArrayValues),
}

/// A structure array error.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum StructureArrayError {
    /// The record bytes are not a whole number of records.
    #[error("{len} bytes is not a multiple of the record size {record_size}")]
    InvalidLength {
        /// The number of bytes.
        len: usize,
        /// The record size.
        record_size: usize,
    },
    /// There is no member with the given name.
    #[error("structure has no member {0}")]
    MissingMember(String),
    /// A record references a heap object that does not exist or has the wrong kind.
    #[error("invalid heap object index {index} for member {member}")]
    InvalidHeapIndex {
        /// The member name.
        member: String,
        /// The heap object index.
        index: i32,
    },
    /// The member data type cannot be decoded.
    #[error(transparent)]
    UnsupportedDataType(#[from] UnsupportedDataTypeError),
}

/// An array of compound records.
///
/// Records are held as their stored bytes.
/// Variable length members (strings and sequences, including those of nested compound members) are resolved when read: their in-record heap id is replaced by a native `i32` index into the [heap object table](StructureArray::heap).
/// Nested structure arrays share the heap object table of their parent.
#[derive(Clone, Debug, PartialEq)]
pub struct StructureArray {
    compound: CompoundType,
    bytes: Vec<u8>,
    heap: Arc<Vec<HeapObject>>,
}

impl StructureArray {
    /// Create a new structure array from record bytes and a heap object table.
    ///
    /// # Errors
    /// Returns [`StructureArrayError::InvalidLength`] if `bytes` is not a whole number of records.
    pub fn new(
        compound: CompoundType,
        bytes: Vec<u8>,
        heap: Vec<HeapObject>,
    ) -> Result<Self, StructureArrayError> {
        Self::new_shared(compound, bytes, Arc::new(heap))
    }

    fn new_shared(
        compound: CompoundType,
        bytes: Vec<u8>,
        heap: Arc<Vec<HeapObject>>,
    ) -> Result<Self, StructureArrayError> {
        let record_size = compound.size();
        let whole = if record_size == 0 {
            bytes.is_empty()
        } else {
            bytes.len() % record_size == 0
        };
        if whole {
            Ok(Self {
                compound,
                bytes,
                heap,
            })
        } else {
            Err(StructureArrayError::InvalidLength {
                len: bytes.len(),
                record_size,
            })
        }
    }

    /// The compound type of the records.
    #[must_use]
    pub const fn compound(&self) -> &CompoundType {
        &self.compound
    }

    /// The number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes
            .len()
            .checked_div(self.compound.size())
            .unwrap_or_default()
    }

    /// Returns true if there are no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The bytes of record `index`.
    #[must_use]
    pub fn record_bytes(&self, index: usize) -> Option<&[u8]> {
        let size = self.compound.size();
        let start = index.checked_mul(size)?;
        self.bytes.get(start..start.checked_add(size)?)
    }

    /// The heap object table.
    #[must_use]
    pub fn heap(&self) -> &[HeapObject] {
        &self.heap
    }

    /// Decode member `name` of every record.
    ///
    /// Each member is decoded with its own byte order.
    /// Array members contribute their elements in row-major order, so the result holds `len() * member.num_elements()` values.
    ///
    /// # Errors
    /// Returns a [`StructureArrayError`] if there is no such member, a heap object index is invalid, or the member type cannot be decoded.
    pub fn member_values(&self, name: &str) -> Result<ArrayValues, StructureArrayError> {
        let member = self
            .compound
            .member(name)
            .ok_or_else(|| StructureArrayError::MissingMember(name.to_string()))?;
        let bytes = self.member_bytes(member);
        match member.data_type() {
            DataType::Compound(nested) => Ok(ArrayValues::Structure(Self::new_shared(
                nested.clone(),
                bytes,
                self.heap.clone(),
            )?)),
            DataType::String => {
                let strings = self
                    .heap_objects(member, &bytes)
                    .map(|object| match object {
                        Ok((_, HeapObject::String(s))) => Ok(s.clone()),
                        Ok((index, HeapObject::Sequence(_))) => {
                            Err(invalid_heap_index(member, index))
                        }
                        Err(err) => Err(err),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(ArrayValues::String(strings))
            }
            DataType::VariableLength(_) => {
                let sequences = self
                    .heap_objects(member, &bytes)
                    .map(|object| match object {
                        Ok((_, HeapObject::Sequence(values))) => Ok(values.clone()),
                        Ok((index, HeapObject::String(_))) => {
                            Err(invalid_heap_index(member, index))
                        }
                        Err(err) => Err(err),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(ArrayValues::VariableLength(sequences))
            }
            data_type => Ok(ArrayValues::from_stored_bytes(
                data_type,
                member.endianness(),
                bytes,
            )?),
        }
    }

    /// Concatenate the bytes of `member` across all records.
    fn member_bytes(&self, member: &CompoundMember) -> Vec<u8> {
        let (offset, size) = (member.offset(), member.size());
        let mut bytes = Vec::with_capacity(self.len() * size);
        for record in self.bytes.chunks_exact(self.compound.size().max(1)) {
            bytes.extend_from_slice(&record[offset..offset + size]);
        }
        bytes
    }

    fn heap_objects<'a>(
        &'a self,
        member: &'a CompoundMember,
        bytes: &'a [u8],
    ) -> impl Iterator<Item = Result<(i32, &'a HeapObject), StructureArrayError>> + 'a {
        bytes
            .chunks_exact(member.data_type().size())
            .map(move |slot| {
                let mut index = [0; HEAP_INDEX_SIZE];
                index.copy_from_slice(&slot[..HEAP_INDEX_SIZE]);
                let index = i32::from_ne_bytes(index);
                usize::try_from(index)
                    .ok()
                    .and_then(|i| self.heap.get(i))
                    .map(|object| (index, object))
                    .ok_or_else(|| invalid_heap_index(member, index))
            })
    }
}

fn invalid_heap_index(member: &CompoundMember, index: i32) -> StructureArrayError {
    StructureArrayError::InvalidHeapIndex {
        member: member.name().to_string(),
        index,
    }
}

/// Overwrite the heap id in `slot` with a heap object index.
pub(crate) fn write_heap_index(slot: &mut [u8], index: i32) {
    slot.fill(0);
    slot[..HEAP_INDEX_SIZE].copy_from_slice(&index.to_ne_bytes());
}
