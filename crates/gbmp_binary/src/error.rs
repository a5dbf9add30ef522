//! # Binary Error Types
//!
//! All errors that can occur while reading raw bytes.

use thiserror::Error;

/// Errors that can occur while decoding binary data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BinaryError {
    /// A read asked for more bytes than the buffer holds.
    #[error("out of range: need {requested} bytes at offset {position}, {available} available")]
    OutOfRange {
        /// Cursor position at the time of the read.
        position: usize,
        /// Number of bytes requested.
        requested: usize,
        /// Number of bytes left in the buffer.
        available: usize,
    },

    /// The container does not start with the expected magic.
    #[error("bad magic: expected {expected:?}, found {found:?}")]
    BadMagic {
        /// The magic the caller asked for.
        expected: String,
        /// The bytes actually found at offset 0.
        found: String,
    },

    /// Fewer than 8 bytes remain where a chunk header should start.
    #[error("truncated chunk header at offset {offset}: {available} bytes left")]
    TruncatedChunkHeader {
        /// Offset of the partial header.
        offset: usize,
        /// Bytes left in the buffer.
        available: usize,
    },

    /// A record schema could not be constructed.
    #[error("invalid schema: {0}")]
    Schema(String),

    /// A decoded record has no field with this name.
    #[error("record has no field `{0}`")]
    MissingField(String),

    /// A record field holds a different kind of value than requested.
    #[error("field `{field}` is not {expected}")]
    FieldType {
        /// Name of the field.
        field: String,
        /// What the caller expected ("an integer", "an array").
        expected: &'static str,
    },
}

/// Result type for binary decoding operations.
pub type BinaryResult<T> = Result<T, BinaryError>;
