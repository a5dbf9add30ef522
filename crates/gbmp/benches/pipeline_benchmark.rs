//! Benchmark for the map loading pipeline.
//!
//! Uses a dense synthetic map: every cell holds a column of up to 6 blocks
//! with random faces and slopes.
//!
//! Run with: cargo bench --package gbmp --bench pipeline_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use gbmp::{load_map, LoaderConfig};
use gbmp_map::{
    decompress, parse_map, BlockEntry, ColumnEntry, ColumnTableWriter, FaceCode, MapAttributes,
    MapWriter, BASE_GRID_LEN,
};
use gbmp_mesh::{AtlasLayout, GeometryBuilder, GeometryConfig};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn dense_map() -> Vec<u8> {
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    let blocks: Vec<BlockEntry> = (0..1024)
        .map(|_| BlockEntry {
            left: FaceCode::new(rng.gen_range(0..1024)),
            right: FaceCode::new(rng.gen_range(0..1024)),
            top: FaceCode::new(rng.gen_range(0..1024)),
            bottom: FaceCode::new(rng.gen_range(0..1024)),
            lid: FaceCode::new(rng.gen_range(0..1024) | (rng.gen_range(0..4) << 14)),
            arrows: 0,
            slope_type: rng.gen_range(0..64) << 2,
        })
        .collect();

    // A pool of distinct columns, shared between cells like real maps do.
    let mut table = ColumnTableWriter::new();
    let offsets: Vec<u32> = (0..4096)
        .map(|_| {
            let height: u8 = rng.gen_range(1..=6);
            let offset: u8 = rng.gen_range(0..height);
            let indices: Vec<u32> = (0..ColumnEntry::expected_indices(height, offset))
                .map(|_| rng.gen_range(0..1024))
                .collect();
            table.push(&ColumnEntry::new(height, offset, &indices))
        })
        .collect();

    let base = (0..BASE_GRID_LEN)
        .map(|_| offsets[rng.gen_range(0..offsets.len())])
        .collect();

    let attributes = MapAttributes::new(base, table.into_bytes(), blocks)
        .unwrap_or_else(|e| panic!("synthetic map is valid: {e}"));
    MapWriter::new().map(&attributes).finish()
}

fn benchmark_parse(c: &mut Criterion) {
    let bytes = dense_map();

    let mut group = c.benchmark_group("parse");
    group.throughput(Throughput::Bytes(bytes.len() as u64));
    group.bench_function("dense_map", |b| {
        b.iter(|| black_box(parse_map(black_box(&bytes), *b"GBMP", 500)));
    });
    group.finish();
}

fn benchmark_decompress(c: &mut Criterion) {
    let bytes = dense_map();
    let Ok(attributes) = parse_map(&bytes, *b"GBMP", 500) else {
        return;
    };

    let mut group = c.benchmark_group("decompress");
    group.throughput(Throughput::Elements(BASE_GRID_LEN as u64));
    group.bench_function("dense_map", |b| {
        b.iter(|| black_box(decompress(black_box(&attributes))));
    });
    group.finish();
}

fn benchmark_geometry(c: &mut Criterion) {
    let bytes = dense_map();
    let Ok(grid) = parse_map(&bytes, *b"GBMP", 500).and_then(|a| decompress(&a)) else {
        return;
    };

    let mut group = c.benchmark_group("geometry");
    group.sample_size(20);
    group.bench_function("all_batches", |b| {
        b.iter(|| {
            let builder =
                GeometryBuilder::new(&grid, AtlasLayout::default(), &GeometryConfig::default());
            black_box(builder.map(|batch| batch.vertex_count()).sum::<usize>())
        });
    });
    group.finish();
}

fn benchmark_full_load(c: &mut Criterion) {
    let bytes = dense_map();
    let config = LoaderConfig::default();

    let mut group = c.benchmark_group("full_load");
    group.sample_size(10);
    group.bench_function("dense_map", |b| {
        b.iter(|| black_box(load_map(black_box(&bytes), &config)));
    });
    group.finish();
}

criterion_group!(
    benches,
    benchmark_parse,
    benchmark_decompress,
    benchmark_geometry,
    benchmark_full_load
);
criterion_main!(benches);
