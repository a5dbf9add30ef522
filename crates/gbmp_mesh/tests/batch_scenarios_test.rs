//! # Batch Scenario Tests
//!
//! End-to-end geometry checks on small synthetic maps: container bytes in,
//! batches out.

use gbmp_map::{
    decompress, parse_map, BlockEntry, ColumnEntry, ColumnTableWriter, FaceCode, MapAttributes,
    MapGrid, MapWriter, BASE_GRID_LEN, MAP_SIZE,
};
use gbmp_mesh::{AtlasLayout, GeometryBatch, GeometryBuilder, GeometryConfig, VERTICES_PER_QUAD};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// One column at (0, 0), empty everywhere else.
fn single_column_map(column: &ColumnEntry, blocks: Vec<BlockEntry>) -> MapGrid {
    let mut table = ColumnTableWriter::new();
    let empty = table.push(&ColumnEntry::new(0, 0, &[]));
    let used = table.push(column);
    let mut base = vec![empty; BASE_GRID_LEN];
    base[0] = used;

    let attributes = MapAttributes::new(base, table.into_bytes(), blocks).unwrap();
    let bytes = MapWriter::new()
        .chunk(*b"XTRA", vec![0; 10])
        .map(&attributes)
        .finish();
    decompress(&parse_map(&bytes, *b"GBMP", 500).unwrap()).unwrap()
}

fn batches(grid: &MapGrid) -> Vec<GeometryBatch> {
    GeometryBuilder::new(grid, AtlasLayout::default(), &GeometryConfig::default()).collect()
}

/// Test: a block with every texture id 0 produces nothing.
#[test]
fn test_untextured_block_is_culled() {
    let grid = single_column_map(&ColumnEntry::new(1, 0, &[0]), vec![BlockEntry::default()]);
    let all = batches(&grid);

    assert_eq!(all.len(), 64);
    assert!(all.iter().all(GeometryBatch::is_empty));
}

/// Test: only the textured top face of the block at z = 1 is emitted.
#[test]
fn test_single_top_face() {
    let mut blocks = vec![BlockEntry::default(); 6];
    blocks[5].top = FaceCode::new(7);
    let grid = single_column_map(&ColumnEntry::new(3, 1, &[5]), blocks);

    let all = batches(&grid);
    let first = &all[0];
    assert_eq!((first.tile_x, first.tile_y), (0, 0));
    assert_eq!(first.vertex_count(), VERTICES_PER_QUAD);
    assert!(all[1..].iter().all(GeometryBatch::is_empty));

    // Top face corners: (0,1,0) (1,1,0) lid2 lid3, shifted to z = 1.
    let vertices = first.interleaved();
    let corners: Vec<[f32; 3]> = [0, 1, 2, 5].iter().map(|&i| vertices[i].position).collect();
    assert_eq!(
        corners,
        [[0.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, 2.0], [0.0, 1.0, 2.0]]
    );

    // Texture 7 sits in the first atlas row.
    let u0 = 7.0 / 32.0;
    assert!((vertices[0].texcoord[0] - u0).abs() < 1e-6);
    assert!(vertices[0].texcoord[1].abs() < 1e-6);
}

/// Test: random grids always yield whole quads with matching buffers.
#[test]
fn test_random_grid_vertex_counts() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x5eed);
    let mut grid = MapGrid::new();

    for _ in 0..2_000 {
        let x = rng.gen_range(0..MAP_SIZE);
        let y = rng.gen_range(0..MAP_SIZE);
        let height = rng.gen_range(0..=8);
        let slots = (0..height)
            .map(|_| {
                rng.gen_bool(0.7).then(|| BlockEntry {
                    left: FaceCode::new(rng.gen()),
                    right: FaceCode::new(rng.gen()),
                    top: FaceCode::new(rng.gen()),
                    bottom: FaceCode::new(rng.gen()),
                    lid: FaceCode::new(rng.gen()),
                    arrows: 0,
                    slope_type: rng.gen(),
                })
            })
            .collect();
        grid.set_stack(x, y, gbmp_map::BlockStack::from_slots(slots));
    }

    let config = GeometryConfig {
        render_flipped_faces: true,
        ..GeometryConfig::default()
    };
    let mut total = 0;
    for batch in GeometryBuilder::new(&grid, AtlasLayout::default(), &config) {
        assert_eq!(batch.vertex_count() % VERTICES_PER_QUAD, 0);
        assert_eq!(batch.positions.len() / 3, batch.texcoords.len() / 2);
        assert_eq!(batch.positions.len() % 3, 0);
        total += batch.vertex_count();
    }
    assert!(total > 0);
}

/// Test: smaller batch edges partition the same geometry.
#[test]
fn test_batch_size_does_not_change_geometry() {
    let mut blocks = vec![BlockEntry::default(); 2];
    blocks[1] = BlockEntry {
        left: FaceCode::new(3),
        right: FaceCode::new(4),
        top: FaceCode::new(0x2000 | 5),
        bottom: FaceCode::new(6),
        lid: FaceCode::new(0x4000 | 7),
        arrows: 0,
        slope_type: 20 << 2,
    };
    let grid = single_column_map(&ColumnEntry::new(2, 0, &[1, 1]), blocks);

    let count = |batch_size: usize| -> usize {
        let config = GeometryConfig {
            batch_size,
            ..GeometryConfig::default()
        };
        GeometryBuilder::new(&grid, AtlasLayout::default(), &config)
            .map(|b| b.vertex_count())
            .sum()
    };

    // Four visible faces per block (top is flipped), two blocks.
    assert_eq!(count(32), 2 * 4 * VERTICES_PER_QUAD);
    assert_eq!(count(8), count(32));
    assert_eq!(count(256), count(32));
}
