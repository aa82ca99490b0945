use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{DataType, Endianness};

/// A member of a compound data type.
///
/// A member may itself be an array of elements (e.g. a fixed length `char[8]`), described by its `shape`.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct CompoundMember {
    name: String,
    offset: usize,
    data_type: DataType,
    endianness: Endianness,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    shape: Vec<u64>,
}

impl CompoundMember {
    /// Create a new scalar compound member at byte `offset` within the record.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        offset: usize,
        data_type: DataType,
        endianness: Endianness,
    ) -> Self {
        Self {
            name: name.into(),
            offset,
            data_type,
            endianness,
            shape: vec![],
        }
    }

    /// Set the member shape, making it an array member.
    #[must_use]
    pub fn with_shape(mut self, shape: Vec<u64>) -> Self {
        self.shape = shape;
        self
    }

    /// The member name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The byte offset of the member within the record.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// The member data type.
    #[must_use]
    pub const fn data_type(&self) -> &DataType {
        &self.data_type
    }

    /// The member byte order.
    #[must_use]
    pub const fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// The member shape, empty for a scalar member.
    #[must_use]
    pub fn shape(&self) -> &[u64] {
        &self.shape
    }

    /// The number of elements in the member.
    #[must_use]
    pub fn num_elements(&self) -> usize {
        self.shape
            .iter()
            .map(|&s| usize::try_from(s).unwrap_or(usize::MAX))
            .fold(1, usize::saturating_mul)
    }

    /// The size in bytes of the member.
    #[must_use]
    pub fn size(&self) -> usize {
        self.data_type.size().saturating_mul(self.num_elements())
    }

    /// Returns true if the member, or any member nested within it, is stored as a heap reference.
    #[must_use]
    pub fn has_heap_data(&self) -> bool {
        match &self.data_type {
            DataType::Compound(compound) => compound.has_heap_data(),
            data_type => data_type.is_heap(),
        }
    }
}

/// A record size smaller than the extent of a member.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("illegal structure size {record_size}, member {member} requires {required} bytes")]
pub struct IllegalStructureSizeError {
    /// The record size.
    pub record_size: usize,
    /// The member name.
    pub member: String,
    /// The number of bytes required by the member.
    pub required: usize,
}

/// A compound (structure) data type: a fixed size record of named members.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct CompoundType {
    size: usize,
    members: Vec<CompoundMember>,
}

impl CompoundType {
    /// Create a new compound data type with records of `size` bytes.
    ///
    /// # Errors
    /// Returns [`IllegalStructureSizeError`] if any member extends beyond the record size.
    pub fn new(size: usize, members: Vec<CompoundMember>) -> Result<Self, IllegalStructureSizeError> {
        let compound = Self { size, members };
        compound.validate()?;
        Ok(compound)
    }

    /// Check that every member lies within the record.
    ///
    /// Compound types deserialized from a persisted description are not validated until this is called.
    ///
    /// # Errors
    /// Returns [`IllegalStructureSizeError`] if any member extends beyond the record size.
    pub fn validate(&self) -> Result<(), IllegalStructureSizeError> {
        for member in &self.members {
            if let DataType::Compound(nested) = member.data_type() {
                nested.validate()?;
            }
            let required = member.offset().saturating_add(member.size());
            if required > self.size {
                return Err(IllegalStructureSizeError {
                    record_size: self.size,
                    member: member.name().to_string(),
                    required,
                });
            }
        }
        Ok(())
    }

    /// The record size in bytes.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// The members.
    #[must_use]
    pub fn members(&self) -> &[CompoundMember] {
        &self.members
    }

    /// Find a member by name.
    #[must_use]
    pub fn member(&self, name: &str) -> Option<&CompoundMember> {
        self.members.iter().find(|member| member.name() == name)
    }

    /// Returns true if any member, including nested members, is stored as a heap reference.
    #[must_use]
    pub fn has_heap_data(&self) -> bool {
        self.members.iter().any(CompoundMember::has_heap_data)
    }
}
