//! # Face Codes
//!
//! Each block side is a packed 16-bit code:
//!
//! ```text
//! bit  15   14   13   12..10   9..0
//!      flat rot  flip  unused  texture id
//!      rot  rot
//! ```
//!
//! Rotation is the top two bits (quadrants of 90 degrees), so it shares
//! bit 15 with the flat flag.

/// Mask of the texture id bits.
pub const TEXTURE_MASK: u16 = 0x03ff;
/// Flip bit.
pub const FLIP_BIT: u16 = 0x2000;
/// Flat bit.
pub const FLAT_BIT: u16 = 0x8000;

/// One packed face code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FaceCode(pub u16);

impl FaceCode {
    /// Wraps a raw code.
    #[inline]
    #[must_use]
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    /// Raw 16-bit value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Texture tile index in the atlas. 0 means "no texture".
    #[inline]
    #[must_use]
    pub const fn texture_id(self) -> u16 {
        self.0 & TEXTURE_MASK
    }

    /// Flip flag.
    #[inline]
    #[must_use]
    pub const fn is_flipped(self) -> bool {
        self.0 & FLIP_BIT != 0
    }

    /// Flat flag.
    #[inline]
    #[must_use]
    pub const fn is_flat(self) -> bool {
        self.0 & FLAT_BIT != 0
    }

    /// Rotation in quarter turns, 0..=3.
    #[inline]
    #[must_use]
    pub const fn rotation_quadrant(self) -> u8 {
        (self.0 >> 14) as u8
    }

    /// Rotation in degrees: 0, 90, 180 or 270.
    #[inline]
    #[must_use]
    pub const fn rotation_degrees(self) -> u16 {
        self.rotation_quadrant() as u16 * 90
    }
}
