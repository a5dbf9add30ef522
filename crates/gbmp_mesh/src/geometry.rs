//! # Block Geometry
//!
//! Every populated stack slot becomes up to five textured quads: the four
//! sides and the lid. Each quad is split into two triangles with vertex
//! order `0, 1, 2, 0, 2, 3`.
//!
//! ## Culling
//!
//! A face is skipped when its texture id is 0. Faces with the flip bit are
//! skipped too unless [`GeometryConfig::render_flipped_faces`] is set, in
//! which case their texture is mirrored vertically.
//!
//! ## Batching
//!
//! The grid is cut into square tiles of `batch_size` cells. Batches come out
//! in raster order (tile row by tile row); inside a batch cells go row by
//! row and each stack bottom to top.

use bytemuck::{Pod, Zeroable};
use gbmp_map::{BlockEntry, FaceCode, MapGrid, MAP_SIZE};
use serde::{Deserialize, Serialize};

use crate::slope::{build_lid, Lid};
use crate::uv::AtlasLayout;

/// Vertices per emitted quad.
pub const VERTICES_PER_QUAD: usize = 6;

/// Triangle vertex order over a quad's corners.
pub const QUAD_TRIANGLES: [usize; VERTICES_PER_QUAD] = [0, 1, 2, 0, 2, 3];

// =============================================================================
// FACES
// =============================================================================

/// The five renderable sides of a block, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaceSide {
    /// +y side.
    Top,
    /// +x side.
    Right,
    /// -y side.
    Bottom,
    /// -x side.
    Left,
    /// Upper surface.
    Lid,
}

impl FaceSide {
    /// All sides in emission order.
    pub const ALL: [Self; 5] = [Self::Top, Self::Right, Self::Bottom, Self::Left, Self::Lid];

    /// The block's face code for this side.
    #[inline]
    #[must_use]
    pub const fn code(self, block: &BlockEntry) -> FaceCode {
        match self {
            Self::Top => block.top,
            Self::Right => block.right,
            Self::Bottom => block.bottom,
            Self::Left => block.left,
            Self::Lid => block.lid,
        }
    }

    /// Quad corners in the unit cell: two floor corners plus two lid
    /// corners for the sides, the lid itself for [`FaceSide::Lid`].
    #[must_use]
    pub const fn corners(self, lid: &Lid) -> [[f32; 3]; 4] {
        match self {
            Self::Top => [[0.0, 1.0, 0.0], [1.0, 1.0, 0.0], lid[2], lid[3]],
            Self::Right => [[1.0, 1.0, 0.0], [1.0, 0.0, 0.0], lid[1], lid[2]],
            Self::Bottom => [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], lid[1], lid[0]],
            Self::Left => [[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], lid[3], lid[0]],
            Self::Lid => *lid,
        }
    }
}

/// Interleaved vertex, ready for `bytemuck::cast_slice`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// World position.
    pub position: [f32; 3],
    /// Atlas UV.
    pub texcoord: [f32; 2],
}

/// One textured quad in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad {
    /// Corner positions.
    pub positions: [[f32; 3]; 4],
    /// Corner UVs.
    pub texcoords: [[f32; 2]; 4],
}

impl Quad {
    /// The two triangles as six vertices.
    #[must_use]
    pub fn triangle_vertices(&self) -> [Vertex; VERTICES_PER_QUAD] {
        QUAD_TRIANGLES.map(|i| Vertex {
            position: self.positions[i],
            texcoord: self.texcoords[i],
        })
    }
}

/// Builds the quad for one face, or `None` if the face is culled.
#[must_use]
pub fn face_quad(
    side: FaceSide,
    face: FaceCode,
    lid: &Lid,
    offset: [f32; 3],
    atlas: &AtlasLayout,
    render_flipped: bool,
) -> Option<Quad> {
    if face.texture_id() == 0 || (face.is_flipped() && !render_flipped) {
        return None;
    }

    let positions = side
        .corners(lid)
        .map(|[x, y, z]| [x + offset[0], y + offset[1], z + offset[2]]);
    let texcoords = atlas.face_uvs(face, face.is_flipped());
    Some(Quad { positions, texcoords })
}

/// All surviving quads of a block placed at `offset`, in face order.
pub fn block_quads<'a>(
    block: &'a BlockEntry,
    offset: [f32; 3],
    atlas: &'a AtlasLayout,
    render_flipped: bool,
) -> impl Iterator<Item = Quad> + 'a {
    let lid = build_lid(block.slope_code());
    FaceSide::ALL.into_iter().filter_map(move |side| {
        face_quad(side, side.code(block), &lid, offset, atlas, render_flipped)
    })
}

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Geometry builder settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    /// Batch edge in cells. Should divide 256.
    pub batch_size: usize,
    /// Emit flipped faces mirrored instead of culling them.
    pub render_flipped_faces: bool,
    /// Initial scratch capacity, in vertices.
    pub scratch_vertices: usize,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            batch_size: 32,
            render_flipped_faces: false,
            scratch_vertices: 64 * 1024,
        }
    }
}

// =============================================================================
// BATCHES
// =============================================================================

/// Geometry of one tile of the grid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryBatch {
    /// Tile column.
    pub tile_x: usize,
    /// Tile row.
    pub tile_y: usize,
    /// Three floats per vertex.
    pub positions: Vec<f32>,
    /// Two floats per vertex.
    pub texcoords: Vec<f32>,
}

impl GeometryBatch {
    /// Number of vertices.
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// True if every face in the tile was culled.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Positions and UVs zipped into vertices.
    #[must_use]
    pub fn interleaved(&self) -> Vec<Vertex> {
        self.positions
            .chunks_exact(3)
            .zip(self.texcoords.chunks_exact(2))
            .map(|(p, t)| Vertex {
                position: [p[0], p[1], p[2]],
                texcoord: [t[0], t[1]],
            })
            .collect()
    }
}

/// Owns the scratch buffers and builds batches for any grid.
///
/// Both buffers are cleared at the start of every batch and copied out when
/// the batch is done, so their capacity is reused.
#[derive(Debug, Clone)]
pub struct BatchWriter {
    atlas: AtlasLayout,
    batch_size: usize,
    tiles_per_edge: usize,
    render_flipped: bool,
    positions: Vec<f32>,
    texcoords: Vec<f32>,
}

impl BatchWriter {
    /// Creates a writer.
    ///
    /// A zero batch size is treated as 1; sizes above 256 as 256.
    #[must_use]
    pub fn new(atlas: AtlasLayout, config: &GeometryConfig) -> Self {
        let batch_size = config.batch_size.clamp(1, MAP_SIZE);
        Self {
            atlas,
            batch_size,
            tiles_per_edge: MAP_SIZE.div_ceil(batch_size),
            render_flipped: config.render_flipped_faces,
            positions: Vec::with_capacity(config.scratch_vertices * 3),
            texcoords: Vec::with_capacity(config.scratch_vertices * 2),
        }
    }

    /// Total number of batches per grid.
    #[inline]
    #[must_use]
    pub const fn batch_count(&self) -> usize {
        self.tiles_per_edge * self.tiles_per_edge
    }

    /// Tile of the `index`-th batch in raster order.
    #[inline]
    #[must_use]
    pub const fn tile_of(&self, index: usize) -> (usize, usize) {
        (index % self.tiles_per_edge, index / self.tiles_per_edge)
    }

    /// Builds the batch for tile `(tile_x, tile_y)` of `grid`.
    pub fn build(&mut self, grid: &MapGrid, tile_x: usize, tile_y: usize) -> GeometryBatch {
        self.positions.clear();
        self.texcoords.clear();

        let x0 = tile_x * self.batch_size;
        let y0 = tile_y * self.batch_size;
        for y in y0..(y0 + self.batch_size).min(MAP_SIZE) {
            for x in x0..(x0 + self.batch_size).min(MAP_SIZE) {
                for (z, block) in grid.stack(x, y).blocks() {
                    let offset = [x as f32, y as f32, z as f32];
                    for quad in block_quads(block, offset, &self.atlas, self.render_flipped) {
                        for vertex in quad.triangle_vertices() {
                            self.positions.extend_from_slice(&vertex.position);
                            self.texcoords.extend_from_slice(&vertex.texcoord);
                        }
                    }
                }
            }
        }

        let batch = GeometryBatch {
            tile_x,
            tile_y,
            positions: self.positions.clone(),
            texcoords: self.texcoords.clone(),
        };
        tracing::debug!(tile_x, tile_y, vertices = batch.vertex_count(), "geometry batch");
        batch
    }
}

/// Batch-at-a-time mesh builder over a decoded grid.
#[derive(Debug)]
pub struct GeometryBuilder<'g> {
    grid: &'g MapGrid,
    writer: BatchWriter,
    next_batch: usize,
}

impl<'g> GeometryBuilder<'g> {
    /// Creates a builder positioned at the first batch.
    #[must_use]
    pub fn new(grid: &'g MapGrid, atlas: AtlasLayout, config: &GeometryConfig) -> Self {
        Self {
            grid,
            writer: BatchWriter::new(atlas, config),
            next_batch: 0,
        }
    }

    /// Total number of batches.
    #[inline]
    #[must_use]
    pub const fn batch_count(&self) -> usize {
        self.writer.batch_count()
    }

    /// Batches emitted so far.
    #[inline]
    #[must_use]
    pub const fn batches_done(&self) -> usize {
        self.next_batch
    }

    /// Builds the batch for tile `(tile_x, tile_y)` out of order.
    pub fn build_batch(&mut self, tile_x: usize, tile_y: usize) -> GeometryBatch {
        self.writer.build(self.grid, tile_x, tile_y)
    }
}

impl Iterator for GeometryBuilder<'_> {
    type Item = GeometryBatch;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_batch >= self.batch_count() {
            return None;
        }
        let (tile_x, tile_y) = self.writer.tile_of(self.next_batch);
        self.next_batch += 1;
        Some(self.build_batch(tile_x, tile_y))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.batch_count() - self.next_batch;
        (left, Some(left))
    }
}

impl ExactSizeIterator for GeometryBuilder<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use gbmp_map::BlockStack;

    fn textured(texture: u16) -> BlockEntry {
        BlockEntry {
            left: FaceCode::new(texture),
            right: FaceCode::new(texture),
            top: FaceCode::new(texture),
            bottom: FaceCode::new(texture),
            lid: FaceCode::new(texture),
            arrows: 0,
            slope_type: 0,
        }
    }

    #[test]
    fn test_corner_templates() {
        let lid = build_lid(0);
        assert_eq!(
            FaceSide::Top.corners(&lid),
            [[0.0, 1.0, 0.0], [1.0, 1.0, 0.0], [1.0, 1.0, 1.0], [0.0, 1.0, 1.0]]
        );
        assert_eq!(
            FaceSide::Left.corners(&lid),
            [[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 1.0, 1.0], [0.0, 0.0, 1.0]]
        );
        assert_eq!(FaceSide::Lid.corners(&lid), lid);
    }

    #[test]
    fn test_culling() {
        let lid = build_lid(0);
        let atlas = AtlasLayout::default();
        let origin = [0.0; 3];

        assert!(face_quad(FaceSide::Lid, FaceCode::new(0), &lid, origin, &atlas, false).is_none());
        assert!(face_quad(FaceSide::Lid, FaceCode::new(0x2000), &lid, origin, &atlas, true).is_none());

        let flipped = FaceCode::new(0x2000 | 3);
        assert!(face_quad(FaceSide::Lid, flipped, &lid, origin, &atlas, false).is_none());
        assert!(face_quad(FaceSide::Lid, flipped, &lid, origin, &atlas, true).is_some());
    }

    #[test]
    fn test_quad_offset_and_triangles() {
        let lid = build_lid(0);
        let quad = face_quad(
            FaceSide::Lid,
            FaceCode::new(1),
            &lid,
            [10.0, 20.0, 3.0],
            &AtlasLayout::default(),
            false,
        )
        .unwrap();
        assert_eq!(quad.positions[0], [10.0, 20.0, 4.0]);
        assert_eq!(quad.positions[2], [11.0, 21.0, 4.0]);

        let vertices = quad.triangle_vertices();
        assert_eq!(vertices[3], vertices[0]);
        assert_eq!(vertices[4], vertices[2]);
        assert_eq!(vertices[5].position, quad.positions[3]);
    }

    #[test]
    fn test_block_face_order() {
        let block = BlockEntry {
            top: FaceCode::new(1),
            lid: FaceCode::new(2),
            ..BlockEntry::default()
        };
        let atlas = AtlasLayout::default();
        let quads: Vec<Quad> = block_quads(&block, [0.0; 3], &atlas, false).collect();
        assert_eq!(quads.len(), 2);
        assert_eq!(quads[0].positions[0], [0.0, 1.0, 0.0]);
        assert_eq!(quads[1].positions, build_lid(0));
    }

    #[test]
    fn test_batches_cover_grid_in_raster_order() {
        let grid = MapGrid::new();
        let builder = GeometryBuilder::new(&grid, AtlasLayout::default(), &GeometryConfig::default());
        assert_eq!(builder.len(), 64);

        let tiles: Vec<(usize, usize)> = builder.map(|b| (b.tile_x, b.tile_y)).collect();
        assert_eq!(tiles[0], (0, 0));
        assert_eq!(tiles[1], (1, 0));
        assert_eq!(tiles[8], (0, 1));
        assert_eq!(tiles[63], (7, 7));
    }

    #[test]
    fn test_scratch_reset_between_batches() {
        let mut grid = MapGrid::new();
        grid.set_stack(0, 0, BlockStack::from_slots(vec![Some(textured(1))]));
        grid.set_stack(40, 0, BlockStack::from_slots(vec![None, Some(textured(2))]));

        let mut builder =
            GeometryBuilder::new(&grid, AtlasLayout::default(), &GeometryConfig::default());
        let first = builder.next().unwrap();
        let second = builder.next().unwrap();
        let third = builder.next().unwrap();

        assert_eq!(first.vertex_count(), 5 * VERTICES_PER_QUAD);
        assert_eq!(second.vertex_count(), 5 * VERTICES_PER_QUAD);
        assert_eq!(second.positions[2], 1.0);
        assert!(third.is_empty());
        assert_eq!(first.texcoords.len(), first.vertex_count() * 2);
    }

    #[test]
    fn test_interleaved_is_pod() {
        let mut grid = MapGrid::new();
        grid.set_stack(3, 4, BlockStack::from_slots(vec![Some(textured(9))]));
        let mut builder =
            GeometryBuilder::new(&grid, AtlasLayout::default(), &GeometryConfig::default());

        let batch = builder.build_batch(0, 0);
        let vertices = batch.interleaved();
        assert_eq!(vertices.len(), batch.vertex_count());
        assert_eq!(vertices[0].position, [3.0, 5.0, 0.0]);

        let bytes: &[u8] = bytemuck::cast_slice(&vertices);
        assert_eq!(bytes.len(), vertices.len() * 20);
    }
}
