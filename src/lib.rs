//! A rust library for reading sections of chunked and contiguous multidimensional variables stored in HDF5, netCDF and GRIB files.
//!
//! `cdm_tiled` maps a requested [`Section`](section::Section) (per-dimension ranges with first, last and stride) onto the physical storage of a variable and produces exactly the elements requested, decoded and reassembled in row-major order.
//! Parsing file headers (B-trees, heaps, GRIB indexes) is left to the caller, which supplies:
//!  - a [`ChunkCatalog`](layout::ChunkCatalog) of stored chunks,
//!  - a [`ReadableStorage`](storage::ReadableStorage) for positional byte reads,
//!  - a [`HeapReader`](read::HeapReader) if the variable holds variable length data.
//!
//! ## Getting Started
//! [`read::read_section`] and [`read::VariableStorage`] are good places to start.
//! The [`layout`] module describes how a section is walked across chunked storage and the [`filter`] module how stored chunks are decoded.
//!
//! ## Example
//! ```rust
//! # use std::sync::Arc;
//! use cdm_tiled::{
//!     data_type::{DataType, Endianness, TypeInfo},
//!     filter::FilterPipeline,
//!     layout::{ChunkDescriptor, ChunkIndex, ChunkedStorage, LayoutOptions},
//!     read::{read_section, StorageLayout, VariableStorage},
//!     section::Section,
//!     storage::MemoryStore,
//! };
//!
//! // A 1D int32 variable of 6 elements stored in chunks of 4 elements
//! let values: Vec<u8> = (0..8i32).flat_map(i32::to_le_bytes).collect();
//! let store = MemoryStore::new(values);
//! let catalog = ChunkIndex::new(vec![
//!     ChunkDescriptor::new(vec![0], 0, 16, 0),
//!     ChunkDescriptor::new(vec![4], 16, 16, 0),
//! ]);
//! let chunked = ChunkedStorage::new(vec![4], Arc::new(catalog), FilterPipeline::default());
//! let variable = VariableStorage::new(
//!     vec![6],
//!     TypeInfo::new(DataType::Int32, Endianness::Little),
//!     StorageLayout::Chunked(chunked),
//! );
//!
//! let want: Section = "1:5:2".parse()?;
//! let array = read_section(&variable, &want, &store, None, &LayoutOptions::default())?;
//! assert_eq!(array.as_slice::<i32>(), Some([1, 3, 5].as_slice()));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Crate Features
//! #### Default
//!  - `deflate`: the deflate (zlib) filter, filter id 1.
//!
//! ## Logging
//! `cdm_tiled` emits [`tracing`](https://docs.rs/tracing) events: `debug` for chunk decoding and layout progress, `warn` for ignored configuration values.

#![warn(unused_variables)]
#![warn(dead_code)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![deny(clippy::missing_panics_doc)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod array;
pub mod config;
pub mod data_type;
pub mod filter;
pub mod layout;
pub mod read;
pub mod section;
pub mod storage;
pub mod tiling;
