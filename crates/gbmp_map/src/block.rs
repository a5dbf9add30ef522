//! # Block Records
//!
//! Fixed 12-byte block layout, little-endian:
//!
//! | field      | type |
//! |------------|------|
//! | left       | u16  |
//! | right      | u16  |
//! | top        | u16  |
//! | bottom     | u16  |
//! | lid        | u16  |
//! | arrows     | u8   |
//! | slope_type | u8   |

use gbmp_binary::{BinaryResult, Record, RecordSchema};

use crate::face::FaceCode;

/// Encoded size of one block record.
pub const BLOCK_RECORD_SIZE: usize = 12;

/// One block from the global block table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockEntry {
    /// Left (-x) side.
    pub left: FaceCode,
    /// Right (+x) side.
    pub right: FaceCode,
    /// Top (+y) side.
    pub top: FaceCode,
    /// Bottom (-y) side.
    pub bottom: FaceCode,
    /// Lid (upper surface).
    pub lid: FaceCode,
    /// Road arrow flags, carried through untouched.
    pub arrows: u8,
    /// Slope code in the upper 6 bits, ground-type flags in the lower 2.
    pub slope_type: u8,
}

impl BlockEntry {
    /// Record layout of a block.
    ///
    /// # Errors
    ///
    /// Never fails for this fixed layout; the `Result` comes from schema
    /// construction.
    pub fn schema() -> BinaryResult<RecordSchema> {
        RecordSchema::from_notation(&[
            ("left", "16LE", None),
            ("right", "16LE", None),
            ("top", "16LE", None),
            ("bottom", "16LE", None),
            ("lid", "16LE", None),
            ("arrows", "8LE", None),
            ("slope_type", "8LE", None),
        ])
    }

    /// Builds a block from a record decoded with [`BlockEntry::schema`].
    ///
    /// # Errors
    ///
    /// Fails if the record lacks one of the block fields.
    pub fn from_record(record: &Record<'_, '_>) -> BinaryResult<Self> {
        let face = |name: &str| record.uint(name).map(|v| FaceCode::new(v as u16));
        Ok(Self {
            left: face("left")?,
            right: face("right")?,
            top: face("top")?,
            bottom: face("bottom")?,
            lid: face("lid")?,
            arrows: record.uint("arrows")? as u8,
            slope_type: record.uint("slope_type")? as u8,
        })
    }

    /// Slope code: `slope_type >> 2`.
    #[inline]
    #[must_use]
    pub const fn slope_code(&self) -> u8 {
        self.slope_type >> 2
    }

    /// Faces in geometry order: top, right, bottom, left, lid.
    #[inline]
    #[must_use]
    pub const fn faces(&self) -> [FaceCode; 5] {
        [self.top, self.right, self.bottom, self.left, self.lid]
    }

    /// Appends the 12-byte encoding to `out`.
    pub fn encode(&self, out: &mut Vec<u8>) {
        for face in [self.left, self.right, self.top, self.bottom, self.lid] {
            out.extend_from_slice(&face.raw().to_le_bytes());
        }
        out.push(self.arrows);
        out.push(self.slope_type);
    }
}
