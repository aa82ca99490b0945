use crate::{
    array::{write_heap_index, Array, ArrayValues, HeapObject, StructureArray},
    data_type::{CompoundType, DataType, Endianness, TypeInfo, UnsupportedDataTypeError, HEAP_ID_SIZE},
    layout::{LayoutChunk, LayoutSource},
    storage::ReadableStorageTraits,
};

use super::{HeapId, HeapReader, ReadError};

/// A heap reference within a compound record.
struct HeapSlot {
    offset: usize,
    data_type: DataType,
    endianness: Endianness,
}

/// Assembles the stored bytes of a wanted section from layout chunks, then converts them to an [`Array`].
///
/// The buffer starts filled with the stored fill value, so elements without a layout chunk keep it.
pub(super) struct Assembler<'a> {
    type_info: &'a TypeInfo,
    shape: Vec<u64>,
    element_size: usize,
    bytes: Vec<u8>,
    storage: &'a dyn ReadableStorageTraits,
    heap: Option<&'a dyn HeapReader>,
    heap_objects: Vec<Option<HeapObject>>,
}

impl<'a> Assembler<'a> {
    pub(super) fn new(
        type_info: &'a TypeInfo,
        shape: Vec<u64>,
        storage: &'a dyn ReadableStorageTraits,
        heap: Option<&'a dyn HeapReader>,
    ) -> Result<Self, ReadError> {
        let element_size = type_info.element_size();
        if element_size == 0 {
            return Err(UnsupportedDataTypeError::from(type_info.data_type()).into());
        }
        let num_elements = shape
            .iter()
            .try_fold(1u64, |acc, &n| acc.checked_mul(n))
            .unwrap_or(u64::MAX);
        let size = num_elements
            .checked_mul(element_size as u64)
            .and_then(|size| usize::try_from(size).ok())
            .filter(|&size| isize::try_from(size).is_ok())
            .ok_or(ReadError::SectionTooLarge {
                num_elements,
                element_size,
            })?;
        let bytes = type_info.stored_fill_bytes().repeat(size / element_size);
        let heap_objects = if type_info.data_type().is_heap() {
            vec![None; size / element_size]
        } else {
            vec![]
        };
        Ok(Self {
            type_info,
            shape,
            element_size,
            bytes,
            storage,
            heap,
            heap_objects,
        })
    }

    /// Copy the elements of a layout chunk into place.
    #[allow(clippy::cast_possible_truncation)]
    pub(super) fn place(&mut self, chunk: &LayoutChunk) -> Result<(), ReadError> {
        let element_size = self.element_size as u64;
        let invalid = || ReadError::InvalidLayoutChunk {
            dest_elem: chunk.dest_elem(),
            nelems: chunk.nelems(),
        };
        let len = chunk.nelems().checked_mul(element_size).ok_or_else(invalid)?;
        let start = chunk.dest_elem().checked_mul(element_size).ok_or_else(invalid)?;
        let end = start.checked_add(len).ok_or_else(invalid)?;
        if end > self.bytes.len() as u64 {
            return Err(invalid());
        }
        // bounded by the buffer length
        let dest = &mut self.bytes[start as usize..end as usize];
        match chunk.source() {
            LayoutSource::FilePosition(position) => {
                let data = self.storage.read(*position, len)?;
                dest.copy_from_slice(&data);
            }
            LayoutSource::Bytes { data, elem_offset } => {
                let src_start = elem_offset.saturating_mul(element_size);
                let src_end = src_start.saturating_add(len);
                if src_end > data.len() as u64 {
                    return Err(ReadError::ChunkSizeMismatch {
                        size: data.len(),
                        required: src_end,
                    });
                }
                dest.copy_from_slice(&data[src_start as usize..src_end as usize]);
            }
        }
        if self.type_info.data_type().is_heap() {
            self.resolve_heap_run(start as usize, end as usize)?;
        }
        Ok(())
    }

    /// Resolve the heap ids placed in `bytes[start..end]` with one batched heap read.
    fn resolve_heap_run(&mut self, start: usize, end: usize) -> Result<(), ReadError> {
        let mut elements = Vec::new();
        let mut ids = Vec::new();
        for (i, slot) in self.bytes[start..end].chunks_exact(HEAP_ID_SIZE).enumerate() {
            let id = HeapId::try_from(slot)?;
            if !id.is_null() {
                elements.push(start / HEAP_ID_SIZE + i);
                ids.push(id);
            }
        }
        if ids.is_empty() {
            return Ok(());
        }
        let heap = self.heap.ok_or(ReadError::MissingHeapReader)?;
        let objects = heap.read_heap_objects(&ids)?;
        if objects.len() != ids.len() {
            return Err(ReadError::HeapObjectCount {
                requested: ids.len(),
                returned: objects.len(),
            });
        }
        for (element, object) in elements.into_iter().zip(objects) {
            self.heap_objects[element] = Some(heap_object(
                self.type_info.data_type(),
                self.type_info.endianness(),
                object,
            )?);
        }
        Ok(())
    }

    /// Convert the assembled bytes into an array.
    pub(super) fn finish(self) -> Result<Array, ReadError> {
        let data_type = self.type_info.data_type();
        let endianness = self.type_info.endianness();
        let values = match data_type {
            DataType::String => ArrayValues::String(
                self.heap_objects
                    .into_iter()
                    .map(|object| match object {
                        Some(HeapObject::String(s)) => s,
                        _ => String::new(),
                    })
                    .collect(),
            ),
            DataType::VariableLength(base) => {
                let empty = ArrayValues::from_stored_bytes(base, endianness, vec![])?;
                ArrayValues::VariableLength(
                    self.heap_objects
                        .into_iter()
                        .map(|object| match object {
                            Some(HeapObject::Sequence(values)) => values,
                            _ => empty.clone(),
                        })
                        .collect(),
                )
            }
            DataType::Compound(compound) => {
                let mut bytes = self.bytes;
                let heap_objects = resolve_records(compound, &mut bytes, self.heap)?;
                ArrayValues::Structure(StructureArray::new(
                    compound.clone(),
                    bytes,
                    heap_objects,
                )?)
            }
            data_type => ArrayValues::from_stored_bytes(data_type, endianness, self.bytes)?,
        };
        Ok(Array::new(self.shape, data_type.clone(), values)?)
    }
}

/// Decode the bytes of a heap object referenced by an element of `data_type`.
fn heap_object(
    data_type: &DataType,
    endianness: Endianness,
    bytes: Vec<u8>,
) -> Result<HeapObject, ReadError> {
    match data_type {
        DataType::String => Ok(HeapObject::String(
            String::from_utf8_lossy(&bytes).into_owned(),
        )),
        DataType::VariableLength(base) => {
            let base_size = base.size();
            if base_size == 0 || bytes.len() % base_size != 0 {
                return Err(ReadError::InvalidHeapObject {
                    size: bytes.len(),
                    data_type: data_type.to_string(),
                });
            }
            Ok(HeapObject::Sequence(ArrayValues::from_stored_bytes(
                base, endianness, bytes,
            )?))
        }
        data_type => Err(UnsupportedDataTypeError::from(data_type).into()),
    }
}

/// The empty value of a heap reference that was never written.
fn empty_heap_object(data_type: &DataType, endianness: Endianness) -> Result<HeapObject, ReadError> {
    match data_type {
        DataType::VariableLength(base) => Ok(HeapObject::Sequence(
            ArrayValues::from_stored_bytes(base, endianness, vec![])?,
        )),
        _ => Ok(HeapObject::String(String::new())),
    }
}

fn collect_heap_slots(compound: &CompoundType, base: usize, slots: &mut Vec<HeapSlot>) {
    for member in compound.members() {
        if !member.has_heap_data() {
            continue;
        }
        let element_size = member.data_type().size();
        for element in 0..member.num_elements() {
            let offset = base + member.offset() + element * element_size;
            match member.data_type() {
                DataType::Compound(nested) => collect_heap_slots(nested, offset, slots),
                data_type => slots.push(HeapSlot {
                    offset,
                    data_type: data_type.clone(),
                    endianness: member.endianness(),
                }),
            }
        }
    }
}

/// Resolve the heap references of every record, replacing each with an index into the returned heap object table.
fn resolve_records(
    compound: &CompoundType,
    bytes: &mut [u8],
    heap: Option<&dyn HeapReader>,
) -> Result<Vec<HeapObject>, ReadError> {
    let mut heap_objects = Vec::new();
    if !compound.has_heap_data() || compound.size() == 0 {
        return Ok(heap_objects);
    }
    let mut slots = Vec::new();
    collect_heap_slots(compound, 0, &mut slots);

    for record in bytes.chunks_exact_mut(compound.size()) {
        let ids = slots
            .iter()
            .map(|slot| HeapId::try_from(&record[slot.offset..slot.offset + HEAP_ID_SIZE]))
            .collect::<Result<Vec<_>, _>>()?;
        let referenced: Vec<HeapId> = ids.iter().copied().filter(|id| !id.is_null()).collect();
        let objects = if referenced.is_empty() {
            vec![]
        } else {
            let heap = heap.ok_or(ReadError::MissingHeapReader)?;
            heap.read_heap_objects(&referenced)?
        };
        if objects.len() != referenced.len() {
            return Err(ReadError::HeapObjectCount {
                requested: referenced.len(),
                returned: objects.len(),
            });
        }
        let mut objects = objects.into_iter();
        for (slot, id) in slots.iter().zip(ids) {
            let bytes = if id.is_null() { None } else { objects.next() };
            let object = match bytes {
                Some(bytes) => heap_object(&slot.data_type, slot.endianness, bytes)?,
                None => empty_heap_object(&slot.data_type, slot.endianness)?,
            };
            let index = i32::try_from(heap_objects.len())
                .map_err(|_| ReadError::TooManyHeapObjects(heap_objects.len()))?;
            heap_objects.push(object);
            write_heap_index(&mut record[slot.offset..slot.offset + HEAP_ID_SIZE], index);
        }
    }
    Ok(heap_objects)
}
