//! # Chunked Container
//!
//! Walks a tagged-chunk container:
//!
//! ```text
//! magic[4] | { tag[4] size:u32le payload[size] }*
//! ```
//!
//! Chunks are yielded in file order with their payload borrowed from the
//! input. Unknown tags are the caller's business; the loader never looks
//! inside a payload.

use std::fmt;
use std::iter::FusedIterator;

use crate::cursor::ByteCursor;
use crate::error::{BinaryError, BinaryResult};

/// Size of a chunk header (tag + size).
pub const CHUNK_HEADER_SIZE: usize = 8;

/// Upper bound on the directory pre-allocation, whatever the hint says.
const MAX_DIRECTORY_PREALLOC: usize = 4096;

/// Four-byte chunk identifier, e.g. `DMAP`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkTag(pub [u8; 4]);

impl ChunkTag {
    /// Builds a tag from a 4-byte literal.
    #[inline]
    #[must_use]
    pub const fn new(bytes: &[u8; 4]) -> Self {
        Self(*bytes)
    }

    /// Raw tag bytes.
    #[inline]
    #[must_use]
    pub const fn bytes(&self) -> [u8; 4] {
        self.0
    }
}

impl fmt::Display for ChunkTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            write!(f, "{}", char::from(b))?;
        }
        Ok(())
    }
}

impl fmt::Debug for ChunkTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChunkTag({self})")
    }
}

/// Directory entry for one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkInfo {
    /// Chunk identifier.
    pub tag: ChunkTag,
    /// Offset of the payload's first byte in the container.
    pub offset: usize,
    /// Payload length in bytes.
    pub size: usize,
}

/// A chunk with its payload borrowed from the container buffer.
#[derive(Debug, Clone, Copy)]
pub struct Chunk<'a> {
    info: ChunkInfo,
    payload: &'a [u8],
}

impl<'a> Chunk<'a> {
    /// Chunk identifier.
    #[inline]
    #[must_use]
    pub const fn tag(&self) -> ChunkTag {
        self.info.tag
    }

    /// Payload length in bytes.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> usize {
        self.info.size
    }

    /// Location of the chunk in the container.
    #[inline]
    #[must_use]
    pub const fn info(&self) -> ChunkInfo {
        self.info
    }

    /// Raw payload bytes.
    #[inline]
    #[must_use]
    pub const fn payload(&self) -> &'a [u8] {
        self.payload
    }

    /// Fresh cursor over the payload, positioned at 0.
    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> ByteCursor<'a> {
        ByteCursor::new(self.payload)
    }
}

/// Iterator over the chunks of a container.
///
/// The magic is checked up front by [`ChunkLoader::new`]. After the first
/// error the iterator is exhausted.
#[derive(Debug)]
pub struct ChunkLoader<'a> {
    cursor: ByteCursor<'a>,
    directory: Vec<ChunkInfo>,
    failed: bool,
}

impl<'a> ChunkLoader<'a> {
    /// Validates the magic and positions the loader on the first chunk.
    ///
    /// `size_hint` is the expected payload size in bytes. It only presizes
    /// the directory, one entry per [`CHUNK_HEADER_SIZE`] bytes hinted, and
    /// never bounds how much is parsed.
    ///
    /// # Errors
    ///
    /// Returns [`BinaryError::BadMagic`] if the first four bytes differ
    /// from `magic` (or the buffer is shorter than four bytes).
    pub fn new(data: &'a [u8], magic: [u8; 4], size_hint: usize) -> BinaryResult<Self> {
        let mut cursor = ByteCursor::new(data);
        let found = cursor.peek_bytes(magic.len());
        if found != magic {
            return Err(BinaryError::BadMagic {
                expected: String::from_utf8_lossy(&magic).into_owned(),
                found: found.iter().map(|&b| char::from(b)).collect(),
            });
        }
        cursor.skip(magic.len())?;

        Ok(Self {
            cursor,
            directory: Vec::with_capacity(
                (size_hint / CHUNK_HEADER_SIZE).min(MAX_DIRECTORY_PREALLOC),
            ),
            failed: false,
        })
    }

    /// Chunks read so far, in file order.
    #[inline]
    #[must_use]
    pub fn directory(&self) -> &[ChunkInfo] {
        &self.directory
    }

    /// Bytes consumed so far, magic included.
    #[inline]
    #[must_use]
    pub const fn position(&self) -> usize {
        self.cursor.position()
    }

    /// Total container length.
    #[inline]
    #[must_use]
    pub const fn total_len(&self) -> usize {
        self.cursor.len()
    }

    fn read_chunk(&mut self) -> BinaryResult<Chunk<'a>> {
        let header_offset = self.cursor.position();
        if self.cursor.remaining() < CHUNK_HEADER_SIZE {
            return Err(BinaryError::TruncatedChunkHeader {
                offset: header_offset,
                available: self.cursor.remaining(),
            });
        }

        let tag_bytes = self.cursor.read_bytes(4)?;
        let tag = ChunkTag([tag_bytes[0], tag_bytes[1], tag_bytes[2], tag_bytes[3]]);
        let size = self.cursor.read_u32_le()? as usize;
        let offset = self.cursor.position();
        let payload = self.cursor.read_bytes(size)?;

        let info = ChunkInfo { tag, offset, size };
        self.directory.push(info);
        tracing::debug!(%tag, offset, size, "chunk");

        Ok(Chunk { info, payload })
    }
}

impl<'a> Iterator for ChunkLoader<'a> {
    type Item = BinaryResult<Chunk<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.cursor.is_at_end() {
            return None;
        }
        let chunk = self.read_chunk();
        if chunk.is_err() {
            self.failed = true;
        }
        Some(chunk)
    }
}

impl FusedIterator for ChunkLoader<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn container(chunks: &[(&[u8; 4], &[u8])]) -> Vec<u8> {
        let mut out = b"GBMP".to_vec();
        for (tag, payload) in chunks {
            out.extend_from_slice(*tag);
            out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
            out.extend_from_slice(payload);
        }
        out
    }

    #[test]
    fn test_chunks_in_file_order() {
        let data = container(&[(b"ZONE", &[1, 2, 3]), (b"DMAP", &[]), (b"PSXM", &[9])]);
        let mut loader = ChunkLoader::new(&data, *b"GBMP", 500).unwrap();

        let tags: Vec<String> = loader
            .by_ref()
            .map(|c| c.unwrap().tag().to_string())
            .collect();
        assert_eq!(tags, ["ZONE", "DMAP", "PSXM"]);
        assert_eq!(loader.position(), data.len());

        let dir = loader.directory();
        assert_eq!(dir.len(), 3);
        assert_eq!(dir[0].offset, 12);
        assert_eq!(dir[0].size, 3);
        assert_eq!(dir[1].offset, 23);
        assert_eq!(dir[1].size, 0);
    }

    #[test]
    fn test_payload_is_borrowed() {
        let data = container(&[(b"DMAP", &[7, 8])]);
        let chunk = ChunkLoader::new(&data, *b"GBMP", 1)
            .unwrap()
            .next()
            .unwrap()
            .unwrap();
        assert_eq!(chunk.payload(), &[7, 8]);
        assert_eq!(chunk.cursor().read_u16_le().unwrap(), 0x0807);
    }

    #[test]
    fn test_bad_magic() {
        let err = ChunkLoader::new(b"GBMX\0\0\0\0", *b"GBMP", 1).unwrap_err();
        assert!(matches!(err, BinaryError::BadMagic { ref found, .. } if found == "GBMX"));
        assert!(matches!(
            ChunkLoader::new(b"GB", *b"GBMP", 1),
            Err(BinaryError::BadMagic { .. })
        ));
    }

    #[test]
    fn test_size_hint_does_not_bound_parsing() {
        let payload = [0u8; 40];
        let chunks: Vec<(&[u8; 4], &[u8])> = (0..20).map(|_| (b"ZONE", &payload[..])).collect();
        let data = container(&chunks);

        for hint in [0, 8, 500, usize::MAX] {
            let mut loader = ChunkLoader::new(&data, *b"GBMP", hint).unwrap();
            assert_eq!(loader.by_ref().filter(Result::is_ok).count(), 20, "hint {hint}");
            assert_eq!(loader.position(), data.len());
        }
    }

    #[test]
    fn test_magic_only_yields_nothing() {
        let mut loader = ChunkLoader::new(b"GBMP", *b"GBMP", 0).unwrap();
        assert!(loader.next().is_none());
    }

    #[test]
    fn test_truncated_header_then_fused() {
        let mut data = container(&[(b"DMAP", &[1])]);
        data.extend_from_slice(b"UMAP");
        let mut loader = ChunkLoader::new(&data, *b"GBMP", 2).unwrap();

        assert!(loader.next().unwrap().is_ok());
        assert!(matches!(
            loader.next(),
            Some(Err(BinaryError::TruncatedChunkHeader { available: 4, .. }))
        ));
        assert!(loader.next().is_none());
    }

    #[test]
    fn test_payload_overrun() {
        let mut data = b"GBMPDMAP".to_vec();
        data.extend_from_slice(&100u32.to_le_bytes());
        data.extend_from_slice(&[0; 10]);
        let mut loader = ChunkLoader::new(&data, *b"GBMP", 1).unwrap();
        assert!(matches!(
            loader.next(),
            Some(Err(BinaryError::OutOfRange { requested: 100, available: 10, .. }))
        ));
        assert!(loader.next().is_none());
    }
}
