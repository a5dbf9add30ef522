//! # Column Records
//!
//! A column describes one map cell's vertical stack:
//!
//! ```text
//! height:u8 offset:u8 pad:u16 block_index:u32 * min(height - offset, 8)
//! ```
//!
//! The table is variable-length: a column only stores indices for the slots
//! it actually fills, so a fixed 8-index read would run off the end of the
//! last column. Readers stop at `height - offset` entries.

use gbmp_binary::{BinaryResult, ByteCursor, Endian, IntWidth, RecordSchema};

/// Maximum number of block indices a column can carry.
pub const MAX_COLUMN_BLOCKS: usize = 8;

/// Filler index for slots with no block. Never a valid table index.
pub const NO_BLOCK: u32 = u32::MAX;

/// Size of the height/offset/pad header.
pub const COLUMN_HEADER_SIZE: usize = 4;

/// One decoded column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnEntry {
    /// Total vertical extent: the stack has this many slots.
    pub height: u8,
    /// First slot that may hold a block.
    pub offset: u8,
    block_indices: [u32; MAX_COLUMN_BLOCKS],
    stored: u8,
}

impl ColumnEntry {
    /// Layout of the column header.
    ///
    /// # Errors
    ///
    /// Never fails for this fixed layout.
    pub fn header_schema() -> BinaryResult<RecordSchema> {
        RecordSchema::from_notation(&[
            ("height", "8LE", None),
            ("offset", "8LE", None),
            ("pad", "16LE", None),
        ])
    }

    /// Builds a column. Indices past [`MAX_COLUMN_BLOCKS`] are dropped.
    #[must_use]
    pub fn new(height: u8, offset: u8, indices: &[u32]) -> Self {
        let stored = indices.len().min(MAX_COLUMN_BLOCKS);
        let mut block_indices = [0; MAX_COLUMN_BLOCKS];
        block_indices[..stored].copy_from_slice(&indices[..stored]);
        Self {
            height,
            offset,
            block_indices,
            stored: stored as u8,
        }
    }

    /// Number of index slots the record carries for this height/offset.
    #[inline]
    #[must_use]
    pub fn expected_indices(height: u8, offset: u8) -> usize {
        usize::from(height.saturating_sub(offset)).min(MAX_COLUMN_BLOCKS)
    }

    /// Decodes one column at the cursor position.
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange` if the header or its indices are truncated.
    pub fn decode(cursor: &mut ByteCursor<'_>, header: &RecordSchema) -> BinaryResult<Self> {
        let record = cursor.decode_record(header)?;
        let height = record.uint("height")? as u8;
        let offset = record.uint("offset")? as u8;

        let count = Self::expected_indices(height, offset);
        let indices = cursor.read_array(IntWidth::W32, count, Endian::Little)?;
        Ok(Self::new(height, offset, &indices.to_u32_vec()))
    }

    /// Stored block indices, slot `offset` first.
    #[inline]
    #[must_use]
    pub fn indices(&self) -> &[u32] {
        &self.block_indices[..usize::from(self.stored)]
    }

    /// Block index for absolute slot `z`, if the column stores one.
    #[must_use]
    pub fn block_index(&self, z: usize) -> Option<u32> {
        let first = usize::from(self.offset);
        if z >= usize::from(self.height) || z < first {
            return None;
        }
        self.indices().get(z - first).copied()
    }

    /// Appends the encoding to `out`.
    ///
    /// Writes exactly [`ColumnEntry::expected_indices`] indices; missing
    /// ones are filled with [`NO_BLOCK`] and surplus ones are dropped.
    pub fn encode(&self, out: &mut Vec<u8>) {
        out.push(self.height);
        out.push(self.offset);
        out.extend_from_slice(&[0, 0]);
        let indices = self.indices();
        for slot in 0..Self::expected_indices(self.height, self.offset) {
            let index = indices.get(slot).copied().unwrap_or(NO_BLOCK);
            out.extend_from_slice(&index.to_le_bytes());
        }
    }

    /// Encoded size in bytes.
    #[inline]
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        COLUMN_HEADER_SIZE + 4 * Self::expected_indices(self.height, self.offset)
    }
}
