//! # GBMP
//!
//! Loads a tile-based city map into renderable triangle batches.
//!
//! ## Design Principles
//!
//! 1. **No I/O in the core** - Bytes in, `f32` buffers and events out
//! 2. **Cooperative stages** - One chunk, row or batch per step
//! 3. **Fatal means fatal** - Any decoding error ends the load; unknown
//!    chunks and odd slope codes do not
//!
//! ## Stages
//!
//! | stage         | unit   | total            |
//! |---------------|--------|------------------|
//! | Parsing       | bytes  | container length |
//! | Decompressing | rows   | 256              |
//! | Building      | batches| 64 by default    |
//!
//! ## Example
//!
//! ```rust,ignore
//! use gbmp::{LoadEvent, LoaderConfig, StagedPipeline};
//!
//! let bytes = std::fs::read("wil.gmp")?;
//! for event in StagedPipeline::new(&bytes, &LoaderConfig::default())? {
//!     if let LoadEvent::Batch { batch, progress } = event? {
//!         println!("{}: {} vertices", progress.text, batch.vertex_count());
//!     }
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod pipeline;
pub mod progress;

pub use config::{ContainerConfig, LoaderConfig};
pub use error::{LoadError, LoadResult};
pub use pipeline::{load_map, StagedPipeline};
pub use progress::{LoadEvent, LoadSummary, Progress, Stage};

pub use gbmp_map::{MapAttributes, MapGrid, MapWriter};
pub use gbmp_mesh::{AtlasLayout, GeometryBatch, GeometryConfig, Vertex};
