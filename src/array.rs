//! Typed result arrays.
//!
//! An [`Array`] is the result of [reading a section](crate::read::read_section): a shape, the variable's [`DataType`], and the decoded [`ArrayValues`] in row-major order.
//!
//! [`ArrayValues`] is a closed set of variants, one per element representation.
//! Enumerations are returned as their base integer variant and compound records as a [`StructureArray`].
//!
//! ## Example
//! ```rust
//! # use cdm_tiled::{array::{Array, ArrayValues}, data_type::DataType};
//! let array = Array::new(vec![2, 2], DataType::Int16, ArrayValues::Int16(vec![1, 2, 3, 4]))?;
//! assert_eq!(array.as_slice::<i16>(), Some([1, 2, 3, 4].as_slice()));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod array_values;
mod structure_array;

pub use array_values::{ArrayElement, ArrayValues};
pub use structure_array::{HeapObject, StructureArray, StructureArrayError};
pub(crate) use structure_array::write_heap_index;

use thiserror::Error;

use crate::data_type::DataType;

/// An array shape. Dimensions may be zero.
pub type ArrayShape = Vec<u64>;

/// An ND index to an element in an array.
pub type ArrayIndices = Vec<u64>;

/// An array creation error.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("{values} values are incompatible with array shape {shape:?}")]
pub struct ArrayCreateError {
    /// The number of values.
    pub values: usize,
    /// The array shape.
    pub shape: ArrayShape,
}

/// A typed array.
#[derive(Clone, Debug, PartialEq)]
pub struct Array {
    shape: ArrayShape,
    data_type: DataType,
    values: ArrayValues,
}

impl Array {
    /// Create a new array.
    ///
    /// # Errors
    /// Returns [`ArrayCreateError`] if the number of values does not match the number of elements of `shape`.
    pub fn new(
        shape: ArrayShape,
        data_type: DataType,
        values: ArrayValues,
    ) -> Result<Self, ArrayCreateError> {
        let num_elements = shape.iter().product::<u64>();
        if u64::try_from(values.len()).is_ok_and(|len| len == num_elements) {
            Ok(Self {
                shape,
                data_type,
                values,
            })
        } else {
            Err(ArrayCreateError {
                values: values.len(),
                shape,
            })
        }
    }

    /// The array shape.
    #[must_use]
    pub fn shape(&self) -> &[u64] {
        &self.shape
    }

    /// The data type of the variable the array was read from.
    #[must_use]
    pub const fn data_type(&self) -> &DataType {
        &self.data_type
    }

    /// The array values.
    #[must_use]
    pub const fn values(&self) -> &ArrayValues {
        &self.values
    }

    /// Consume the array and return its values.
    #[must_use]
    pub fn into_values(self) -> ArrayValues {
        self.values
    }

    /// The number of elements.
    #[must_use]
    pub fn num_elements(&self) -> usize {
        self.values.len()
    }

    /// Return the elements as a slice of `T`, or [`None`] if the values are not of type `T`.
    #[must_use]
    pub fn as_slice<T: ArrayElement>(&self) -> Option<&[T]> {
        T::slice(&self.values)
    }
}
