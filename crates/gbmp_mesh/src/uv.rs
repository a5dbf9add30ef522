//! # Atlas UVs
//!
//! Textures live in a square atlas of square tiles. A face's texture id
//! selects a tile in row-major order; the tile's four UV corners are then
//! rotated about the tile centre by the face's rotation.
//!
//! A tile spans `tile_px / atlas_px` of atlas space, `1/32` for the stock
//! 64 px / 2048 px atlas.

use gbmp_map::FaceCode;
use serde::{Deserialize, Serialize};

/// UV extent of one tile in the default atlas.
pub const TILE_UV: f32 = 1.0 / 32.0;

/// `(cos, sin)` of each quarter turn.
const QUADRANT_COS_SIN: [(f32, f32); 4] = [(1.0, 0.0), (0.0, 1.0), (-1.0, 0.0), (0.0, -1.0)];

/// Texture atlas dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtlasLayout {
    /// Edge length of one tile.
    pub tile_px: u32,
    /// Edge length of the atlas.
    pub atlas_px: u32,
}

impl Default for AtlasLayout {
    fn default() -> Self {
        Self {
            tile_px: 64,
            atlas_px: 2048,
        }
    }
}

impl AtlasLayout {
    /// Tiles per atlas row. Never 0.
    #[inline]
    #[must_use]
    pub fn tiles_per_row(&self) -> u32 {
        (self.atlas_px / self.tile_px.max(1)).max(1)
    }

    /// UV extent of one tile: `tile_px / atlas_px`.
    #[inline]
    #[must_use]
    pub fn tile_extent(&self) -> f32 {
        self.tile_px as f32 / self.atlas_px.max(1) as f32
    }

    /// Tile corners relative to the tile origin, in quad vertex order.
    #[must_use]
    pub fn tile_corners(&self) -> [[f32; 2]; 4] {
        let t = self.tile_extent();
        [[0.0, 0.0], [t, 0.0], [t, t], [0.0, t]]
    }

    /// UV of the top-left corner of tile `texture_id`.
    #[must_use]
    pub fn tile_origin(&self, texture_id: u16) -> [f32; 2] {
        let per_row = self.tiles_per_row();
        let id = u32::from(texture_id);
        let scale = self.tile_extent();
        [(id % per_row) as f32 * scale, (id / per_row) as f32 * scale]
    }

    /// Final UVs of a face, in quad vertex order.
    ///
    /// Corners are rotated by `-rotation` about the tile centre, mirrored
    /// vertically if `mirror` is set, then moved to the tile's origin.
    #[must_use]
    pub fn face_uvs(&self, face: FaceCode, mirror: bool) -> [[f32; 2]; 4] {
        let (cos, sin) = QUADRANT_COS_SIN[usize::from(face.rotation_quadrant() & 3)];
        let [ou, ov] = self.tile_origin(face.texture_id());
        let extent = self.tile_extent();
        let half = extent / 2.0;

        self.tile_corners().map(|[u, v]| {
            let (du, dv) = (u - half, v - half);
            let ru = cos * du + sin * dv + half;
            let mut rv = -sin * du + cos * dv + half;
            if mirror {
                rv = extent - rv;
            }
            [ru + ou, rv + ov]
        })
    }
}
