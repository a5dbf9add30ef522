//! # Column Decompression
//!
//! Expands the three-level indirection into a dense grid:
//!
//! ```text
//! base[y * 256 + x] * 4 ──► column table byte offset ──► ColumnEntry
//! ColumnEntry.block_index(z) ──► blocks[index] ──► stack slot z
//! ```
//!
//! Rows are independent. [`ColumnDecompressor`] yields them in increasing
//! `y`; [`ColumnDecoder`] decodes any single cell or row on demand.

use gbmp_binary::{ByteCursor, RecordSchema};

use crate::block::BlockEntry;
use crate::column::ColumnEntry;
use crate::error::{MapError, MapResult};
use crate::parser::{MapAttributes, MAP_SIZE};

/// Vertical stack of one cell. Slot `z` is `None` for a hole.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockStack {
    slots: Vec<Option<BlockEntry>>,
}

impl BlockStack {
    /// Stack from explicit slots.
    #[must_use]
    pub fn from_slots(slots: Vec<Option<BlockEntry>>) -> Self {
        Self { slots }
    }

    /// Number of slots (the column height).
    #[inline]
    #[must_use]
    pub fn height(&self) -> usize {
        self.slots.len()
    }

    /// True if the stack has no slots.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Block at slot `z`, if any.
    #[inline]
    #[must_use]
    pub fn get(&self, z: usize) -> Option<&BlockEntry> {
        self.slots.get(z).and_then(Option::as_ref)
    }

    /// All slots, bottom first.
    #[inline]
    #[must_use]
    pub fn slots(&self) -> &[Option<BlockEntry>] {
        &self.slots
    }

    /// Populated slots as `(z, block)`, bottom first.
    pub fn blocks(&self) -> impl Iterator<Item = (usize, &BlockEntry)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(z, slot)| slot.as_ref().map(|b| (z, b)))
    }

    /// Resolves `column` against the global block table.
    ///
    /// Slots below `offset` and slots whose index is missing or outside
    /// `blocks` stay empty.
    #[must_use]
    pub fn resolve(column: &ColumnEntry, blocks: &[BlockEntry]) -> Self {
        let slots = (0..usize::from(column.height))
            .map(|z| {
                column
                    .block_index(z)
                    .and_then(|index| blocks.get(index as usize))
                    .copied()
            })
            .collect();
        Self { slots }
    }
}

/// One decompressed row of the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedRow {
    /// Row index.
    pub y: usize,
    /// Stacks for `x` in `0..256`.
    pub stacks: Vec<BlockStack>,
}

/// Dense 256 x 256 grid of block stacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapGrid {
    cells: Vec<BlockStack>,
}

impl Default for MapGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl MapGrid {
    /// Grid with every stack empty.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cells: vec![BlockStack::default(); MAP_SIZE * MAP_SIZE],
        }
    }

    /// Stack at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if either coordinate is 256 or more.
    #[inline]
    #[must_use]
    pub fn stack(&self, x: usize, y: usize) -> &BlockStack {
        &self.cells[y * MAP_SIZE + x]
    }

    /// Replaces a stack.
    ///
    /// # Panics
    ///
    /// Panics if either coordinate is 256 or more.
    #[inline]
    pub fn set_stack(&mut self, x: usize, y: usize, stack: BlockStack) {
        self.cells[y * MAP_SIZE + x] = stack;
    }

    /// Stores a decoded row. Stacks past `x = 255` are ignored.
    ///
    /// # Panics
    ///
    /// Panics if `row.y` is 256 or more.
    pub fn set_row(&mut self, row: DecodedRow) {
        assert!(row.y < MAP_SIZE, "row {} outside a {MAP_SIZE}-row grid", row.y);
        let start = row.y * MAP_SIZE;
        for (cell, stack) in self.cells[start..start + MAP_SIZE].iter_mut().zip(row.stacks) {
            *cell = stack;
        }
    }

    /// Number of populated slots across the whole grid.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.cells.iter().map(|s| s.blocks().count()).sum()
    }
}

/// Stateless column decoding against any set of attributes.
///
/// Holds the column header layout so it is built once, not per cell.
#[derive(Debug, Clone)]
pub struct ColumnDecoder {
    header: RecordSchema,
}

impl ColumnDecoder {
    /// Builds the decoder.
    ///
    /// # Errors
    ///
    /// Only fails if the column schema cannot be built.
    pub fn new() -> MapResult<Self> {
        Ok(Self {
            header: ColumnEntry::header_schema()?,
        })
    }

    /// Decodes the column of cell `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::ColumnOffset`] if the column doesn't fit in the
    /// column table.
    pub fn column(&self, attributes: &MapAttributes, x: usize, y: usize) -> MapResult<ColumnEntry> {
        let columns = attributes.columns();
        let offset = attributes.column_offset(x, y);
        let out_of_table = || MapError::ColumnOffset {
            x,
            y,
            offset,
            len: columns.len(),
        };

        let mut cursor = ByteCursor::new(columns);
        cursor.set_position(offset).map_err(|_| out_of_table())?;
        ColumnEntry::decode(&mut cursor, &self.header).map_err(|_| out_of_table())
    }

    /// Decodes the stack of cell `(x, y)`.
    ///
    /// # Errors
    ///
    /// See [`ColumnDecoder::column`].
    pub fn stack(&self, attributes: &MapAttributes, x: usize, y: usize) -> MapResult<BlockStack> {
        let column = self.column(attributes, x, y)?;
        Ok(BlockStack::resolve(&column, attributes.blocks()))
    }

    /// Decodes row `y`.
    ///
    /// # Errors
    ///
    /// Fails on the first column that doesn't fit in the table.
    pub fn row(&self, attributes: &MapAttributes, y: usize) -> MapResult<DecodedRow> {
        let stacks = (0..MAP_SIZE)
            .map(|x| self.stack(attributes, x, y))
            .collect::<MapResult<Vec<_>>>()?;
        Ok(DecodedRow { y, stacks })
    }
}

/// Row-at-a-time decompressor over parsed attributes.
#[derive(Debug)]
pub struct ColumnDecompressor<'m> {
    attributes: &'m MapAttributes,
    decoder: ColumnDecoder,
    next_row: usize,
    failed: bool,
}

impl<'m> ColumnDecompressor<'m> {
    /// Starts at row 0.
    ///
    /// # Errors
    ///
    /// Only fails if the column schema cannot be built.
    pub fn new(attributes: &'m MapAttributes) -> MapResult<Self> {
        Ok(Self {
            attributes,
            decoder: ColumnDecoder::new()?,
            next_row: 0,
            failed: false,
        })
    }

    /// Rows produced so far.
    #[inline]
    #[must_use]
    pub const fn rows_done(&self) -> usize {
        self.next_row
    }

    /// Decodes any single row, independent of iteration state.
    ///
    /// # Errors
    ///
    /// See [`ColumnDecoder::row`].
    pub fn decompress_row(&self, y: usize) -> MapResult<DecodedRow> {
        self.decoder.row(self.attributes, y)
    }

    /// Decodes every remaining row into a grid.
    ///
    /// # Errors
    ///
    /// Fails on the first bad column.
    pub fn into_grid(self) -> MapResult<MapGrid> {
        let mut grid = MapGrid::new();
        for row in self {
            grid.set_row(row?);
        }
        Ok(grid)
    }
}

impl Iterator for ColumnDecompressor<'_> {
    type Item = MapResult<DecodedRow>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.next_row >= MAP_SIZE {
            return None;
        }
        let row = self.decompress_row(self.next_row);
        match row {
            Ok(_) => self.next_row += 1,
            Err(_) => self.failed = true,
        }
        Some(row)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = if self.failed { 0 } else { MAP_SIZE - self.next_row };
        (0, Some(left))
    }
}

/// Decompresses every row of `attributes` into a dense grid.
///
/// # Errors
///
/// See [`ColumnDecompressor::into_grid`].
pub fn decompress(attributes: &MapAttributes) -> MapResult<MapGrid> {
    ColumnDecompressor::new(attributes)?.into_grid()
}
