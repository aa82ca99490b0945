mod common;

use std::{error::Error, sync::Arc};

use cdm_tiled::{
    data_type::{DataType, Endianness, TypeInfo},
    filter::{FilterDescriptor, FilterPipeline, ShuffleFilter},
    layout::{
        ChunkCatalog, ChunkDescriptor, ChunkIndex, ChunkedStorage, LayoutChunk, LayoutOptions,
        LayoutSource, SectionLayout,
    },
    read::{layout_section, read_section, StorageLayout, VariableStorage},
    section::Section,
    storage::StorageError,
    tiling::Tiling,
};

use common::{expected_i32, indices, write_chunks_i32, CountingStore};

fn shuffled_i32(
    shape: &[u64],
    chunk: &[u64],
    catalog_order: impl Fn(&mut Vec<ChunkDescriptor>),
) -> (VariableStorage, CountingStore) {
    let (mut descriptors, bytes) =
        write_chunks_i32(shape, chunk, false, |data| ShuffleFilter::new(4).encode(&data));
    catalog_order(&mut descriptors);
    let chunked = ChunkedStorage::new(
        chunk.to_vec(),
        Arc::new(ChunkIndex::new(descriptors)),
        FilterPipeline::new(vec![FilterDescriptor::shuffle(4)]),
    );
    let variable = VariableStorage::new(
        shape.to_vec(),
        TypeInfo::new(DataType::Int32, Endianness::Little),
        StorageLayout::Chunked(chunked),
    );
    (variable, CountingStore::new(bytes))
}

fn collect_chunks(
    variable: &VariableStorage,
    want: &Section,
    store: &CountingStore,
) -> Result<Vec<LayoutChunk>, Box<dyn Error>> {
    let options = LayoutOptions::default();
    let layout = layout_section(variable, want, store, &options)?;
    Ok(layout.collect::<Result<Vec<_>, _>>()?)
}

#[test]
fn layout_ragged_chunk() -> Result<(), Box<dyn Error>> {
    let (variable, store) = shuffled_i32(&[10], &[4], |_| {});
    let want: Section = "0:9".parse()?;
    let chunks = collect_chunks(&variable, &want, &store)?;
    let nelems: Vec<u64> = chunks.iter().map(LayoutChunk::nelems).collect();
    assert_eq!(nelems, vec![4, 4, 2]);

    let array = read_section(&variable, &want, &store, None, &LayoutOptions::default())?;
    assert_eq!(array.as_slice::<i32>(), Some(expected_i32(&want, &[10]).as_slice()));
    Ok(())
}

#[test]
fn layout_coverage() -> Result<(), Box<dyn Error>> {
    let cases: [(&[u64], &[u64]); 7] = [
        (&[10], &[3]),
        (&[7, 5], &[3, 2]),
        (&[7, 5], &[7, 5]),
        (&[7, 5], &[1, 1]),
        (&[7, 5], &[8, 8]),
        (&[4, 6, 5], &[2, 4, 3]),
        (&[3, 1, 4], &[1, 1, 4]),
    ];
    for (shape, chunk) in cases {
        let (variable, store) = shuffled_i32(shape, chunk, |_| {});
        let want = Section::default();
        let mut chunks = collect_chunks(&variable, &want, &store)?;
        chunks.sort_by_key(LayoutChunk::dest_elem);
        let mut next = 0;
        for chunk in &chunks {
            assert_eq!(chunk.dest_elem(), next, "shape {shape:?} chunk {chunk:?}");
            next += chunk.nelems();
        }
        assert_eq!(next, shape.iter().product::<u64>());

        let array = read_section(&variable, &want, &store, None, &LayoutOptions::default())?;
        let want = want.fill(shape)?;
        assert_eq!(array.as_slice::<i32>(), Some(expected_i32(&want, shape).as_slice()));
    }
    Ok(())
}

#[test]
fn layout_coalesces_whole_chunks() -> Result<(), Box<dyn Error>> {
    // chunks span whole rows, so each chunk is one run
    let (variable, store) = shuffled_i32(&[6, 4], &[2, 4], |_| {});
    let chunks = collect_chunks(&variable, &Section::default(), &store)?;
    assert_eq!(chunks.len(), 3);
    assert!(chunks.iter().all(|chunk| chunk.nelems() == 8));
    Ok(())
}

#[test]
fn layout_skips_chunks() -> Result<(), Box<dyn Error>> {
    let (variable, store) = shuffled_i32(&[16], &[4], |_| {});
    let want: Section = "5:6".parse()?;
    let array = read_section(&variable, &want, &store, None, &LayoutOptions::default())?;
    assert_eq!(array.as_slice::<i32>(), Some([5, 6].as_slice()));
    // only the second chunk is read
    assert_eq!(store.positions(), vec![(16, 16)]);

    let (variable, store) = shuffled_i32(&[8, 8], &[2, 2], |_| {});
    let want: Section = "3:4,2:5:3".parse()?;
    let array = read_section(&variable, &want, &store, None, &LayoutOptions::default())?;
    assert_eq!(array.as_slice::<i32>(), Some(expected_i32(&want, &[8, 8]).as_slice()));
    // rows 3 and 4 touch two chunk rows, columns 2 and 5 touch two chunk columns
    assert_eq!(store.reads(), 4);
    Ok(())
}

#[test]
fn layout_unsorted_catalog() -> Result<(), Box<dyn Error>> {
    let shape = [9, 7];
    let chunk = [2, 3];
    let (sorted, sorted_store) = shuffled_i32(&shape, &chunk, |_| {});
    let (reversed, reversed_store) =
        shuffled_i32(&shape, &chunk, |descriptors| descriptors.reverse());
    let want: Section = "1:8:2,0:6".parse()?;
    let sorted_chunks = collect_chunks(&sorted, &want, &sorted_store)?;
    let reversed_chunks = collect_chunks(&reversed, &want, &reversed_store)?;
    let dest = |chunks: &[LayoutChunk]| -> Vec<(u64, u64)> {
        chunks.iter().map(|c| (c.dest_elem(), c.nelems())).collect()
    };
    assert_eq!(dest(&sorted_chunks), dest(&reversed_chunks));

    let array = read_section(&reversed, &want, &reversed_store, None, &LayoutOptions::default())?;
    assert_eq!(array.as_slice::<i32>(), Some(expected_i32(&want, &shape).as_slice()));
    Ok(())
}

#[test]
fn layout_strided_multidimensional() -> Result<(), Box<dyn Error>> {
    let shape = [7, 5, 6];
    let (variable, store) = shuffled_i32(&shape, &[3, 2, 4], |_| {});
    for want in ["1:6:2,0:4:3,1:5:2", "6,4,5", "0:6:6,1:3,0:5:5", "2:4"] {
        let want = Section::parse_with_shape(want, &shape)?;
        let array = read_section(&variable, &want, &store, None, &LayoutOptions::default())?;
        assert_eq!(array.shape(), want.shape().as_slice());
        assert_eq!(
            array.as_slice::<i32>(),
            Some(expected_i32(&want, &shape).as_slice()),
            "want {want}"
        );
    }
    Ok(())
}

#[test]
fn layout_storage_dims() -> Result<(), Box<dyn Error>> {
    let shape = [5, 5];
    let (descriptors, bytes) = write_chunks_i32(&shape, &[3, 2], true, |data| data);
    let chunked = ChunkedStorage::from_storage_dims(
        &[3, 2, 4],
        Arc::new(ChunkIndex::new(descriptors)),
        FilterPipeline::default(),
    )?;
    let variable = VariableStorage::new(
        shape.to_vec(),
        TypeInfo::new(DataType::Int32, Endianness::Little),
        StorageLayout::Chunked(chunked),
    );
    let store = CountingStore::new(bytes);
    let want: Section = "1:4,1:3".parse()?;

    // unfiltered chunks are not read by the layout
    let chunks = collect_chunks(&variable, &want, &store)?;
    assert!(chunks
        .iter()
        .all(|chunk| matches!(chunk.source(), LayoutSource::FilePosition(_))));
    assert_eq!(store.reads(), 0);

    let array = read_section(&variable, &want, &store, None, &LayoutOptions::default())?;
    assert_eq!(array.as_slice::<i32>(), Some(expected_i32(&want, &shape).as_slice()));
    Ok(())
}

#[test]
fn layout_contiguous() -> Result<(), Box<dyn Error>> {
    let shape = [4, 3, 5];
    let bytes: Vec<u8> = (0..60i32).flat_map(i32::to_le_bytes).collect();
    let mut padded = vec![0xff; 8];
    padded.extend(bytes);
    let variable = VariableStorage::new(
        shape.to_vec(),
        TypeInfo::new(DataType::Int32, Endianness::Little),
        StorageLayout::Contiguous { position: 8 },
    );
    let store = CountingStore::new(padded);
    let want: Section = "0:3:3,1:2,0:4:2".parse()?;
    let array = read_section(&variable, &want, &store, None, &LayoutOptions::default())?;
    assert_eq!(array.as_slice::<i32>(), Some(expected_i32(&want, &shape).as_slice()));

    let whole = collect_chunks(&variable, &Section::default(), &store)?;
    assert_eq!(whole, vec![LayoutChunk::new(0, LayoutSource::FilePosition(8), 60)]);
    Ok(())
}

#[test]
fn layout_unallocated() -> Result<(), Box<dyn Error>> {
    let variable = VariableStorage::new(
        vec![3, 3],
        TypeInfo::new(DataType::Int32, Endianness::Little),
        StorageLayout::Unallocated,
    );
    let store = CountingStore::new(vec![]);
    let options = LayoutOptions::default();
    let mut layout = layout_section(&variable, &"0:1".parse()?, &store, &options)?;
    assert!(matches!(layout, SectionLayout::Fill));
    assert!(layout.next().is_none());
    assert!(layout_section(&variable, &"0:3".parse()?, &store, &options).is_err());
    Ok(())
}

struct FailingCatalog;

impl ChunkCatalog for FailingCatalog {
    fn iter_chunks<'a>(
        &'a self,
        _want: &Section,
    ) -> Box<dyn Iterator<Item = Result<ChunkDescriptor, StorageError>> + 'a> {
        Box::new(std::iter::once(Err(StorageError::from("b-tree node is corrupt"))))
    }
}

#[test]
fn layout_catalog_error() {
    let chunked = ChunkedStorage::new(vec![2], Arc::new(FailingCatalog), FilterPipeline::default());
    let variable = VariableStorage::new(
        vec![4],
        TypeInfo::new(DataType::Int32, Endianness::Little),
        StorageLayout::Chunked(chunked),
    );
    let store = CountingStore::new(vec![]);
    let options = LayoutOptions::default();
    assert!(layout_section(&variable, &Section::default(), &store, &options).is_err());
}

#[test]
fn layout_chunk_far_outside_shape() -> Result<(), Box<dyn Error>> {
    let (variable, store) = shuffled_i32(&[8], &[4], |descriptors| {
        let stray = ChunkDescriptor::new(vec![u64::MAX], 1000, 16, 0);
        descriptors.insert(0, stray);
    });
    let want = Section::default();
    let chunks = collect_chunks(&variable, &want, &store)?;
    assert_eq!(chunks.len(), 2);

    let array = read_section(&variable, &want, &store, None, &LayoutOptions::default())?;
    assert_eq!(array.as_slice::<i32>(), Some(expected_i32(&want.fill(&[8])?, &[8]).as_slice()));
    // the stray chunk is never read
    assert!(store.positions().iter().all(|&(position, _)| position != 1000));
    Ok(())
}

#[test]
fn tiling_total_order() -> Result<(), Box<dyn Error>> {
    let shape = [5, 4, 3];
    let chunk = [2, 3, 2];
    let tiling = Tiling::new(&shape, &chunk)?;
    let points = indices(&shape);
    for a in &points {
        // round trip
        let tile = tiling.tile(a);
        let back: Vec<u64> = (0..3).map(|i| tile[i] * chunk[i] + a[i] % chunk[i]).collect();
        assert_eq!(&back, a);

        for b in &points {
            assert_eq!(tiling.compare(a, b), -tiling.compare(b, a));
            if tiling.tile(a) == tiling.tile(b) {
                assert_eq!(tiling.compare(a, b), 0);
            }
            for c in points.iter().step_by(7) {
                if tiling.compare(a, b) <= 0 && tiling.compare(b, c) <= 0 {
                    assert!(tiling.compare(a, c) <= 0);
                }
            }
        }
    }
    Ok(())
}
