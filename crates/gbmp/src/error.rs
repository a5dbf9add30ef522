//! # Load Error Types

use gbmp_binary::BinaryError;
use gbmp_map::MapError;
use thiserror::Error;

/// Errors that abort a map load.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// Map parsing or decompression failed.
    #[error(transparent)]
    Map(#[from] MapError),

    /// Container-level decoding failed.
    #[error(transparent)]
    Binary(#[from] BinaryError),

    /// The loader configuration is unusable.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// Result type for pipeline operations.
pub type LoadResult<T> = Result<T, LoadError>;
