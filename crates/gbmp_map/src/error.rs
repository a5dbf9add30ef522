//! # Map Error Types

use gbmp_binary::BinaryError;
use thiserror::Error;

/// Errors that can occur while parsing or decompressing a map.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    /// Low-level decoding failure.
    #[error(transparent)]
    Binary(#[from] BinaryError),

    /// The container ended without the required chunk.
    #[error("container has no {0} chunk")]
    MissingChunk(&'static str),

    /// The base grid does not hold one entry per cell.
    #[error("base grid has {actual} entries, expected {expected}")]
    BaseGridSize {
        /// Required entry count (256 * 256).
        expected: usize,
        /// Entry count supplied.
        actual: usize,
    },

    /// A base grid entry points outside the column table.
    #[error("column for cell ({x}, {y}) at byte {offset} does not fit in a {len}-byte column table")]
    ColumnOffset {
        /// Cell x.
        x: usize,
        /// Cell y.
        y: usize,
        /// Byte offset derived from the base grid.
        offset: usize,
        /// Column table length in bytes.
        len: usize,
    },
}

/// Result type for map operations.
pub type MapResult<T> = Result<T, MapError>;
