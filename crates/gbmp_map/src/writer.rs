//! # Map Writer
//!
//! Serialises map attributes back into a container. Used to build synthetic
//! maps for tests and benchmarks; output is readable by [`MapParser`].
//!
//! [`MapParser`]: crate::parser::MapParser

use gbmp_binary::ChunkTag;

use crate::block::BLOCK_RECORD_SIZE;
use crate::column::ColumnEntry;
use crate::parser::{MapAttributes, DMAP_TAG};

/// Default container magic.
pub const DEFAULT_MAGIC: [u8; 4] = *b"GBMP";

/// Encodes the `DMAP` payload for `attributes`.
#[must_use]
pub fn encode_dmap(attributes: &MapAttributes) -> Vec<u8> {
    let columns = attributes.columns();
    let blocks = attributes.blocks();
    let mut out = Vec::with_capacity(
        attributes.base().len() * 4 + columns.len() + blocks.len() * BLOCK_RECORD_SIZE + 8,
    );

    for value in attributes.base() {
        out.extend_from_slice(&value.to_le_bytes());
    }
    // Table length is stored in words; pad the tail to a word boundary.
    let words = columns.len().div_ceil(4);
    out.extend_from_slice(&(words as u32).to_le_bytes());
    out.extend_from_slice(columns);
    out.resize(out.len() + (words * 4 - columns.len()), 0);

    out.extend_from_slice(&(blocks.len() as u32).to_le_bytes());
    for block in blocks {
        block.encode(&mut out);
    }
    out
}

/// Builder for a chunked container.
#[derive(Debug, Clone)]
pub struct MapWriter {
    magic: [u8; 4],
    chunks: Vec<(ChunkTag, Vec<u8>)>,
}

impl Default for MapWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl MapWriter {
    /// Empty container with the default magic.
    #[must_use]
    pub fn new() -> Self {
        Self::with_magic(DEFAULT_MAGIC)
    }

    /// Empty container with a custom magic.
    #[must_use]
    pub fn with_magic(magic: [u8; 4]) -> Self {
        Self {
            magic,
            chunks: Vec::new(),
        }
    }

    /// Appends an arbitrary chunk.
    #[must_use]
    pub fn chunk(mut self, tag: [u8; 4], payload: Vec<u8>) -> Self {
        self.chunks.push((ChunkTag(tag), payload));
        self
    }

    /// Appends a `DMAP` chunk.
    #[must_use]
    pub fn map(mut self, attributes: &MapAttributes) -> Self {
        self.chunks.push((DMAP_TAG, encode_dmap(attributes)));
        self
    }

    /// Serialises the container.
    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        let total = 4 + self.chunks.iter().map(|(_, p)| 8 + p.len()).sum::<usize>();
        let mut out = Vec::with_capacity(total);
        out.extend_from_slice(&self.magic);
        for (tag, payload) in &self.chunks {
            out.extend_from_slice(&tag.bytes());
            out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
            out.extend_from_slice(payload);
        }
        out
    }
}

/// Accumulates a column table, handing out base-grid word offsets.
#[derive(Debug, Clone, Default)]
pub struct ColumnTableWriter {
    bytes: Vec<u8>,
}

impl ColumnTableWriter {
    /// Empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column and returns its word offset for the base grid.
    pub fn push(&mut self, column: &ColumnEntry) -> u32 {
        let word = (self.bytes.len() / 4) as u32;
        column.encode(&mut self.bytes);
        word
    }

    /// Finished table bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}
