//! # GBMP Map
//!
//! Map data extraction for tile-based city maps.
//!
//! ## Pipeline
//!
//! 1. [`MapParser`] walks the container and decodes the `DMAP` chunk into
//!    [`MapAttributes`]: base grid, raw column table, block table
//! 2. [`ColumnDecompressor`] resolves every cell's column into a
//!    [`BlockStack`], one row at a time
//! 3. [`MapGrid`] holds the dense 256 x 256 result
//!
//! [`MapWriter`] does the reverse for synthetic maps.
//!
//! ## Example
//!
//! ```rust,ignore
//! use gbmp_map::{parse_map, decompress};
//!
//! let attributes = parse_map(&bytes, *b"GBMP", 500)?;
//! let grid = decompress(&attributes)?;
//! for (z, block) in grid.stack(10, 20).blocks() {
//!     println!("z={z} lid={}", block.lid.texture_id());
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod block;
pub mod column;
pub mod error;
pub mod face;
pub mod grid;
pub mod parser;
pub mod writer;

pub use block::{BlockEntry, BLOCK_RECORD_SIZE};
pub use column::{ColumnEntry, MAX_COLUMN_BLOCKS, NO_BLOCK};
pub use error::{MapError, MapResult};
pub use face::FaceCode;
pub use grid::{decompress, BlockStack, ColumnDecoder, ColumnDecompressor, DecodedRow, MapGrid};
pub use parser::{
    parse_map, MapAttributes, MapParser, ParsedChunk, BASE_GRID_LEN, DMAP_TAG, MAP_SIZE,
};
pub use writer::{encode_dmap, ColumnTableWriter, MapWriter, DEFAULT_MAGIC};
