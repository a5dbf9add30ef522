//! # Slope Lids
//!
//! A block's lid is four corner points of the unit cell. Flat blocks have
//! all four at `z = 1`; sloped blocks start every corner at a low level and
//! raise one edge by a single step.
//!
//! ## Slope codes
//!
//! | code      | slope index | levels | meaning              |
//! |-----------|-------------|--------|----------------------|
//! | 2..=8     | code - 1    | 2      | half-height ramps    |
//! | 10..=40   | code - 9    | 8      | eighth-height ramps  |
//! | 42..=44   | code - 41   | 1      | full-height ramps    |
//! | otherwise | -           | 0      | flat                 |
//!
//! `slope_index / levels` picks the raised edge, `slope_index % levels`
//! picks the step.

/// Corner order of a lid, viewed from above.
///
/// ```text
///  3 (0,1) ---- 2 (1,1)
///    |            |
///  0 (0,0) ---- 1 (1,0)
/// ```
pub type Lid = [[f32; 3]; 4];

/// The flat lid at height 1.
pub const FLAT_LID: Lid = [
    [0.0, 0.0, 1.0],
    [1.0, 0.0, 1.0],
    [1.0, 1.0, 1.0],
    [0.0, 1.0, 1.0],
];

/// Which edge of a sloped lid is raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Corners 2 and 3.
    Up,
    /// Corners 0 and 1.
    Down,
    /// Corners 0 and 3.
    Right,
    /// Corners 1 and 2.
    Left,
}

impl Orientation {
    /// Orientation bucket `0..=3`; anything else has no raised edge.
    #[inline]
    #[must_use]
    pub const fn from_bucket(bucket: u8) -> Option<Self> {
        match bucket {
            0 => Some(Self::Up),
            1 => Some(Self::Down),
            2 => Some(Self::Right),
            3 => Some(Self::Left),
            _ => None,
        }
    }

    /// Lid corners raised by one step.
    #[inline]
    #[must_use]
    pub const fn raised_corners(self) -> [usize; 2] {
        match self {
            Self::Up => [2, 3],
            Self::Down => [0, 1],
            Self::Right => [0, 3],
            Self::Left => [1, 2],
        }
    }
}

/// Decoded slope code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlopeShape {
    /// No slope.
    Flat,
    /// A ramp.
    Ramp {
        /// Index within the code range (never 0).
        slope: u8,
        /// Steps per full height: 1, 2 or 8.
        levels: u8,
    },
}

impl SlopeShape {
    /// Decodes a slope code (`slope_type >> 2`).
    ///
    /// Codes outside every range decode as flat.
    #[must_use]
    pub const fn from_code(code: u8) -> Self {
        match code {
            2..=8 => Self::Ramp { slope: code - 1, levels: 2 },
            10..=40 => Self::Ramp { slope: code - 9, levels: 8 },
            42..=44 => Self::Ramp { slope: code - 41, levels: 1 },
            _ => Self::Flat,
        }
    }

    /// Raised edge, if any. A ramp with zero levels has none.
    #[must_use]
    pub const fn orientation(self) -> Option<Orientation> {
        match self {
            Self::Flat | Self::Ramp { levels: 0, .. } => None,
            Self::Ramp { slope, levels } => Orientation::from_bucket(slope / levels),
        }
    }

    /// Builds the four lid corners. Flat and zero-level shapes give
    /// [`FLAT_LID`].
    #[must_use]
    pub fn lid(self) -> Lid {
        let Self::Ramp { slope, levels } = self else {
            return FLAT_LID;
        };
        if levels == 0 {
            return FLAT_LID;
        }

        let step = 1.0 / f32::from(levels);
        let level = f32::from(slope % levels);
        let low = step * level - step * f32::from(levels);

        let mut lid = [
            [0.0, 0.0, low],
            [1.0, 0.0, low],
            [1.0, 1.0, low],
            [0.0, 1.0, low],
        ];
        if let Some(orientation) = self.orientation() {
            for corner in orientation.raised_corners() {
                lid[corner][2] += step;
            }
        }
        lid
    }
}

/// Lid corners for a slope code.
#[inline]
#[must_use]
pub fn build_lid(code: u8) -> Lid {
    SlopeShape::from_code(code).lid()
}
