//! Section reads.
//!
//! [`read_section`] reads a wanted [`Section`] of a stored variable into an [`Array`]:
//!  - the wanted section is filled and validated against the variable shape,
//!  - the output is pre-filled with the fill value (elements of missing chunks keep it),
//!  - the [`SectionLayout`] of the storage is walked and each run is copied into place,
//!  - heap ids of variable length elements and compound members are resolved through a [`HeapReader`],
//!  - the assembled bytes are converted to native byte order.
//!
//! [`layout_section`] exposes the raw [`LayoutChunk`](crate::layout::LayoutChunk) stream instead.
//!
//! A [`SectionReader`] is a read strategy passed to callers at call time, e.g. to share a decoded chunk cache across reads.

mod assembler;
mod heap;
mod section_reader;

pub use heap::{HeapId, HeapReader, InvalidHeapIdError};
pub use section_reader::{CachedSectionReader, DirectSectionReader, SectionReader};

use thiserror::Error;

use crate::{
    array::{Array, ArrayCreateError, ArrayShape, StructureArrayError},
    data_type::{DataType, IllegalStructureSizeError, TypeInfo, UnsupportedDataTypeError},
    layout::{
        ChunkedStorage, LayoutError, LayoutOptions, RegularLayout, SectionLayout, TiledLayout,
    },
    section::Section,
    storage::{ReadableStorageTraits, StorageError},
};

use assembler::Assembler;

/// The physical storage layout of a variable.
#[derive(Clone, Debug)]
pub enum StorageLayout {
    /// Chunked storage.
    Chunked(ChunkedStorage),
    /// Unfiltered row-major storage starting at a byte position.
    Contiguous {
        /// The byte position of the first element.
        position: u64,
    },
    /// No storage was allocated, every element takes the fill value.
    Unallocated,
}

/// A stored variable: its shape, type information and storage layout.
#[derive(Clone, Debug)]
pub struct VariableStorage {
    shape: ArrayShape,
    type_info: TypeInfo,
    layout: StorageLayout,
}

impl VariableStorage {
    /// Create a new variable storage.
    #[must_use]
    pub fn new(shape: ArrayShape, type_info: TypeInfo, layout: StorageLayout) -> Self {
        Self {
            shape,
            type_info,
            layout,
        }
    }

    /// The variable shape.
    #[must_use]
    pub fn shape(&self) -> &[u64] {
        &self.shape
    }

    /// The type information.
    #[must_use]
    pub const fn type_info(&self) -> &TypeInfo {
        &self.type_info
    }

    /// The storage layout.
    #[must_use]
    pub const fn layout(&self) -> &StorageLayout {
        &self.layout
    }
}

/// A read error.
#[derive(Debug, Error)]
pub enum ReadError {
    /// The layout failed.
    #[error(transparent)]
    Layout(#[from] LayoutError),
    /// A storage read failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// Heap ids must be resolved but no heap reader was supplied.
    #[error("variable length data requires a heap reader")]
    MissingHeapReader,
    /// A heap id is invalid.
    #[error(transparent)]
    InvalidHeapId(#[from] InvalidHeapIdError),
    /// The heap reader returned the wrong number of heap objects.
    #[error("requested {requested} heap objects, the heap reader returned {returned}")]
    HeapObjectCount {
        /// The number of requested heap objects.
        requested: usize,
        /// The number of returned heap objects.
        returned: usize,
    },
    /// The heap object table of a structure array cannot be indexed with an `i32`.
    #[error("too many heap objects ({0}) for a structure array")]
    TooManyHeapObjects(usize),
    /// A heap object has an invalid size for its data type.
    #[error("heap object of {size} bytes is invalid for data type {data_type}")]
    InvalidHeapObject {
        /// The heap object size.
        size: usize,
        /// The data type.
        data_type: String,
    },
    /// A decoded chunk is smaller than a run requires.
    #[error("decoded chunk of {size} bytes is smaller than the {required} bytes required")]
    ChunkSizeMismatch {
        /// The decoded chunk size.
        size: usize,
        /// The required size.
        required: u64,
    },
    /// A layout chunk lies outside the wanted section.
    #[error("layout chunk of {nelems} elements at element {dest_elem} lies outside the wanted section")]
    InvalidLayoutChunk {
        /// The destination element offset.
        dest_elem: u64,
        /// The number of elements.
        nelems: u64,
    },
    /// The element size of the storage does not match the data type.
    #[error("storage element size {storage} does not match data type size {data_type}")]
    ElementSizeMismatch {
        /// The storage element size.
        storage: usize,
        /// The data type size.
        data_type: usize,
    },
    /// The wanted section is too large to hold in memory.
    #[error("section of {num_elements} elements of {element_size} bytes is too large")]
    SectionTooLarge {
        /// The number of elements.
        num_elements: u64,
        /// The element size.
        element_size: usize,
    },
    /// The compound record size is too small for its members.
    #[error(transparent)]
    IllegalStructureSize(#[from] IllegalStructureSizeError),
    /// The data type cannot be read.
    #[error(transparent)]
    UnsupportedDataType(#[from] UnsupportedDataTypeError),
    /// The structure array could not be created.
    #[error(transparent)]
    StructureArray(#[from] StructureArrayError),
    /// The array could not be created.
    #[error(transparent)]
    ArrayCreate(#[from] ArrayCreateError),
    /// The read was cancelled.
    #[error("the read was cancelled")]
    Cancelled,
}

fn layout_error(err: LayoutError) -> ReadError {
    match err {
        LayoutError::Cancelled => ReadError::Cancelled,
        err => ReadError::Layout(err),
    }
}

/// Return the layout of `want` across the storage of `variable`.
///
/// Omitted trailing dimensions of `want` select whole dimensions.
/// Unallocated storage yields an empty [`SectionLayout::Fill`].
///
/// # Errors
/// Returns a [`ReadError`] if `want` is invalid for the variable shape or the chunk catalog fails.
pub fn layout_section<'a>(
    variable: &'a VariableStorage,
    want: &Section,
    storage: &'a dyn ReadableStorageTraits,
    options: &'a LayoutOptions,
) -> Result<SectionLayout<'a>, ReadError> {
    let shape = variable.shape();
    let element_size = variable.type_info().element_size();
    match variable.layout() {
        StorageLayout::Chunked(chunked) => Ok(SectionLayout::Tiled(
            TiledLayout::new(want, shape, chunked, element_size, storage, options)
                .map_err(layout_error)?,
        )),
        StorageLayout::Contiguous { position } => Ok(SectionLayout::Regular(RegularLayout::new(
            want,
            shape,
            element_size,
            *position,
        )?)),
        StorageLayout::Unallocated => {
            let want = want.fill(shape).map_err(LayoutError::from)?;
            want.check_in_bounds(shape).map_err(LayoutError::from)?;
            Ok(SectionLayout::Fill)
        }
    }
}

/// Read `want` of `variable` into an array with the shape of the (filled) wanted section.
///
/// Elements not covered by stored chunks take the declared fill value, or the default fill value of the data type.
/// `heap` is only required if non-null heap ids are encountered.
///
/// # Errors
/// Returns a [`ReadError`] if
///  - `want` is invalid for the variable shape,
///  - the data type has zero size or a compound type has an illegal record size,
///  - the storage element size does not match the data type,
///  - a storage, catalog, filter or heap read fails,
///  - the read is cancelled.
pub fn read_section(
    variable: &VariableStorage,
    want: &Section,
    storage: &dyn ReadableStorageTraits,
    heap: Option<&dyn HeapReader>,
    options: &LayoutOptions,
) -> Result<Array, ReadError> {
    let type_info = variable.type_info();
    if let DataType::Compound(compound) = type_info.data_type() {
        compound.validate()?;
    }
    if let StorageLayout::Chunked(chunked) = variable.layout() {
        match chunked.element_size() {
            Some(storage_size) if storage_size != type_info.element_size() => {
                return Err(ReadError::ElementSizeMismatch {
                    storage: storage_size,
                    data_type: type_info.element_size(),
                });
            }
            _ => {}
        }
    }

    let want = want.fill(variable.shape()).map_err(LayoutError::from)?;
    want.check_in_bounds(variable.shape()).map_err(LayoutError::from)?;
    tracing::debug!(want = %want, data_type = %type_info.data_type(), "read section");
    let mut assembler = Assembler::new(type_info, want.shape(), storage, heap)?;
    for chunk in layout_section(variable, &want, storage, options)? {
        assembler.place(&chunk.map_err(layout_error)?)?;
    }
    assembler.finish()
}
