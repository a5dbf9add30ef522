//! # DMAP Parser
//!
//! Pulls chunks from a [`ChunkLoader`] and extracts the map attributes from
//! the `DMAP` chunk. Everything else is skipped by its declared size.
//!
//! ## DMAP payload
//!
//! ```text
//! base:         u32le * 256 * 256    column word offset per cell
//! column_words: u32le
//! columns:      u8 * column_words * 4
//! num_blocks:   u32le
//! blocks:       BlockEntry * num_blocks
//! ```

use std::iter::FusedIterator;

use gbmp_binary::{
    ArrayValue, ByteCursor, Chunk, ChunkLoader, ChunkTag, Endian, IntWidth, RecordSchema,
};

use crate::block::BlockEntry;
use crate::error::{MapError, MapResult};

/// Cells per map edge.
pub const MAP_SIZE: usize = 256;

/// Entries in the base grid.
pub const BASE_GRID_LEN: usize = MAP_SIZE * MAP_SIZE;

/// Tag of the map data chunk.
pub const DMAP_TAG: ChunkTag = ChunkTag::new(b"DMAP");

/// Decoded contents of a `DMAP` chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapAttributes {
    base: Vec<u32>,
    columns: Vec<u8>,
    blocks: Vec<BlockEntry>,
}

impl MapAttributes {
    /// Assembles attributes from their parts.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::BaseGridSize`] unless `base` has exactly
    /// [`BASE_GRID_LEN`] entries.
    pub fn new(base: Vec<u32>, columns: Vec<u8>, blocks: Vec<BlockEntry>) -> MapResult<Self> {
        if base.len() != BASE_GRID_LEN {
            return Err(MapError::BaseGridSize {
                expected: BASE_GRID_LEN,
                actual: base.len(),
            });
        }
        Ok(Self { base, columns, blocks })
    }

    /// Column word offset per cell, row-major (`y * 256 + x`).
    #[inline]
    #[must_use]
    pub fn base(&self) -> &[u32] {
        &self.base
    }

    /// Raw column table.
    #[inline]
    #[must_use]
    pub fn columns(&self) -> &[u8] {
        &self.columns
    }

    /// Global block table.
    #[inline]
    #[must_use]
    pub fn blocks(&self) -> &[BlockEntry] {
        &self.blocks
    }

    /// Byte offset of the column for cell `(x, y)`.
    #[inline]
    #[must_use]
    pub fn column_offset(&self, x: usize, y: usize) -> usize {
        self.base[y * MAP_SIZE + x] as usize * 4
    }

    fn decode(cursor: &mut ByteCursor<'_>, block_schema: &RecordSchema) -> MapResult<Self> {
        let base = match cursor.read_array(IntWidth::W32, BASE_GRID_LEN, Endian::Little)? {
            ArrayValue::U32(values) => values,
            other => other.to_u32_vec(),
        };

        let column_words = cursor.read_u32_le()? as usize;
        let columns = cursor.read_bytes(column_words.saturating_mul(4))?.to_vec();

        let num_blocks = cursor.read_u32_le()? as usize;
        let blocks = cursor
            .read_records(num_blocks, block_schema)?
            .iter()
            .map(BlockEntry::from_record)
            .collect::<Result<Vec<_>, _>>()?;

        if !cursor.is_at_end() {
            tracing::debug!(trailing = cursor.remaining(), "DMAP payload has trailing bytes");
        }

        Self::new(base, columns, blocks)
    }
}

/// What the parser did with one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedChunk {
    /// Chunk tag.
    pub tag: ChunkTag,
    /// Payload size in bytes.
    pub size: usize,
    /// True if the chunk was decoded, false if it was skipped.
    pub recognized: bool,
    /// Container bytes consumed so far.
    pub consumed: usize,
}

/// Chunk-at-a-time map parser.
///
/// Iterate it to drive parsing one chunk per step, then call
/// [`MapParser::finish`] for the attributes. After the first error the
/// iterator is exhausted.
#[derive(Debug)]
pub struct MapParser<'a> {
    loader: ChunkLoader<'a>,
    block_schema: RecordSchema,
    attributes: Option<MapAttributes>,
    failed: bool,
}

impl<'a> MapParser<'a> {
    /// Opens a container.
    ///
    /// # Errors
    ///
    /// Fails with `BadMagic` if the container magic doesn't match.
    pub fn new(data: &'a [u8], magic: [u8; 4], size_hint: usize) -> MapResult<Self> {
        Ok(Self {
            loader: ChunkLoader::new(data, magic, size_hint)?,
            block_schema: BlockEntry::schema()?,
            attributes: None,
            failed: false,
        })
    }

    /// Container bytes consumed so far.
    #[inline]
    #[must_use]
    pub const fn consumed(&self) -> usize {
        self.loader.position()
    }

    /// Container length.
    #[inline]
    #[must_use]
    pub const fn total_len(&self) -> usize {
        self.loader.total_len()
    }

    /// The underlying chunk loader, for its directory.
    #[inline]
    #[must_use]
    pub const fn loader(&self) -> &ChunkLoader<'a> {
        &self.loader
    }

    fn handle(&mut self, chunk: &Chunk<'a>) -> MapResult<bool> {
        if chunk.tag() != DMAP_TAG {
            tracing::warn!(tag = %chunk.tag(), size = chunk.size(), "skipping unknown chunk");
            return Ok(false);
        }

        let attributes = MapAttributes::decode(&mut chunk.cursor(), &self.block_schema)?;
        tracing::info!(
            columns = attributes.columns.len(),
            blocks = attributes.blocks.len(),
            "decoded DMAP"
        );
        if self.attributes.replace(attributes).is_some() {
            tracing::warn!("duplicate DMAP chunk, keeping the last one");
        }
        Ok(true)
    }

    /// Drains the remaining chunks and returns the map attributes.
    ///
    /// # Errors
    ///
    /// Propagates chunk errors and returns [`MapError::MissingChunk`] if no
    /// `DMAP` chunk was seen.
    pub fn finish(mut self) -> MapResult<MapAttributes> {
        while let Some(step) = self.next() {
            step?;
        }
        self.attributes.ok_or(MapError::MissingChunk("DMAP"))
    }
}

impl Iterator for MapParser<'_> {
    type Item = MapResult<ParsedChunk>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let step = self
            .loader
            .next()?
            .map_err(MapError::from)
            .and_then(|chunk| {
                let recognized = self.handle(&chunk)?;
                Ok(ParsedChunk {
                    tag: chunk.tag(),
                    size: chunk.size(),
                    recognized,
                    consumed: self.loader.position(),
                })
            });
        if step.is_err() {
            self.failed = true;
        }
        Some(step)
    }
}

impl FusedIterator for MapParser<'_> {}

/// Parses a whole container in one call.
///
/// # Errors
///
/// See [`MapParser::new`] and [`MapParser::finish`].
pub fn parse_map(data: &[u8], magic: [u8; 4], size_hint: usize) -> MapResult<MapAttributes> {
    MapParser::new(data, magic, size_hint)?.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::MapWriter;

    fn empty_attributes() -> MapAttributes {
        MapAttributes::new(vec![0; BASE_GRID_LEN], vec![0; 4], vec![BlockEntry::default()])
            .unwrap()
    }

    #[test]
    fn test_base_grid_size_checked() {
        assert_eq!(
            MapAttributes::new(vec![0; 10], Vec::new(), Vec::new()),
            Err(MapError::BaseGridSize { expected: BASE_GRID_LEN, actual: 10 })
        );
    }

    #[test]
    fn test_parse_reads_back_written_map() {
        let attributes = empty_attributes();
        let bytes = MapWriter::new().map(&attributes).finish();
        assert_eq!(parse_map(&bytes, *b"GBMP", 500).unwrap(), attributes);
    }

    #[test]
    fn test_missing_dmap() {
        let bytes = MapWriter::new().chunk(*b"ZONE", vec![1, 2]).finish();
        assert_eq!(
            parse_map(&bytes, *b"GBMP", 500),
            Err(MapError::MissingChunk("DMAP"))
        );
    }

    #[test]
    fn test_steps_report_recognition() {
        let bytes = MapWriter::new()
            .chunk(*b"ZONE", vec![0; 3])
            .map(&empty_attributes())
            .finish();
        let steps: Vec<ParsedChunk> = MapParser::new(&bytes, *b"GBMP", 500)
            .unwrap()
            .map(Result::unwrap)
            .collect();

        assert_eq!(steps.len(), 2);
        assert!(!steps[0].recognized);
        assert_eq!(steps[0].consumed, 4 + 8 + 3);
        assert!(steps[1].recognized);
        assert_eq!(steps[1].tag, DMAP_TAG);
        assert_eq!(steps[1].consumed, bytes.len());
    }

    #[test]
    fn test_truncated_dmap_is_fatal() {
        let mut bytes = b"GBMPDMAP".to_vec();
        bytes.extend_from_slice(&16u32.to_le_bytes());
        bytes.extend_from_slice(&[0; 16]);
        assert!(matches!(
            parse_map(&bytes, *b"GBMP", 500),
            Err(MapError::Binary(gbmp_binary::BinaryError::OutOfRange { .. }))
        ));
    }

    #[test]
    fn test_bad_dmap_stops_parsing() {
        let bytes = MapWriter::new()
            .chunk(*b"DMAP", vec![0; 16])
            .map(&empty_attributes())
            .finish();
        let mut parser = MapParser::new(&bytes, *b"GBMP", 500).unwrap();

        let steps: Vec<_> = parser.by_ref().collect();
        assert_eq!(steps.len(), 1);
        assert!(matches!(
            steps[0],
            Err(MapError::Binary(gbmp_binary::BinaryError::OutOfRange { .. }))
        ));
        assert!(parser.next().is_none());
        assert_eq!(parser.finish(), Err(MapError::MissingChunk("DMAP")));
    }

    #[test]
    fn test_duplicate_dmap_last_wins() {
        let first = empty_attributes();
        let second = MapAttributes::new(vec![0; BASE_GRID_LEN], vec![0; 4], Vec::new()).unwrap();
        let bytes = MapWriter::new().map(&first).map(&second).finish();
        assert_eq!(parse_map(&bytes, *b"GBMP", 500).unwrap(), second);
    }
}
