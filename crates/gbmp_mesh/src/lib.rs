//! # GBMP Mesh
//!
//! Geometry generation for decoded maps.
//!
//! ## Design Principles
//!
//! 1. **Pure functions of the block** - Lid shape depends only on the slope
//!    code, UVs only on the face code
//! 2. **Bounded output** - One [`GeometryBatch`] per tile, built in reused
//!    scratch buffers
//! 3. **Plain data out** - Flat `f32` buffers or [`Vertex`] slices that
//!    cast straight to bytes
//!
//! ## Example
//!
//! ```rust,ignore
//! use gbmp_mesh::{AtlasLayout, GeometryBuilder, GeometryConfig};
//!
//! let builder = GeometryBuilder::new(&grid, AtlasLayout::default(), &GeometryConfig::default());
//! for batch in builder {
//!     upload(batch.tile_x, batch.tile_y, bytemuck::cast_slice(&batch.interleaved()));
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod geometry;
pub mod slope;
pub mod uv;

pub use geometry::{
    block_quads, face_quad, BatchWriter, FaceSide, GeometryBatch, GeometryBuilder,
    GeometryConfig, Quad, Vertex, QUAD_TRIANGLES, VERTICES_PER_QUAD,
};
pub use slope::{build_lid, Lid, Orientation, SlopeShape, FLAT_LID};
pub use uv::{AtlasLayout, TILE_UV};
