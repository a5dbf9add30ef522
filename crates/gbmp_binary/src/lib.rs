//! # GBMP Binary
//!
//! Low-level byte decoding shared by the map loader.
//!
//! ## Design Principles
//!
//! 1. **Borrowed input** - Cursors and chunks point into the caller's buffer
//! 2. **Strict bounds** - A short read is an error, never a zero-filled value
//! 3. **Declarative records** - Layouts are [`RecordSchema`] values, validated once
//!
//! ## Core Components
//!
//! - `ByteCursor`: positioned reads of integers, arrays, strings and records
//! - `RecordSchema`: ordered named fields with fixed widths and byte order
//! - `ChunkLoader`: iterator over a magic-prefixed tagged-chunk container
//!
//! ## Example
//!
//! ```rust,ignore
//! use gbmp_binary::ChunkLoader;
//!
//! for chunk in ChunkLoader::new(&bytes, *b"GBMP", 500)? {
//!     let chunk = chunk?;
//!     println!("{} ({} bytes)", chunk.tag(), chunk.size());
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod chunk;
pub mod cursor;
pub mod error;
pub mod schema;

pub use chunk::{Chunk, ChunkInfo, ChunkLoader, ChunkTag, CHUNK_HEADER_SIZE};
pub use cursor::{pack_int_be, pack_int_le, ByteCursor};
pub use error::{BinaryError, BinaryResult};
pub use schema::{
    ArrayValue, Endian, Field, FieldKind, FieldValue, IntWidth, Record, RecordSchema,
    RecordSchemaBuilder,
};
