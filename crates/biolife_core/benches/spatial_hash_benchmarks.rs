use biolife_core::spatial_hash::{EntityId, NeighborBuffer, SpatialHashGrid};
use biolife_data::{Bounds, Vec2};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::UVec2;

fn lattice(n: usize) -> Vec<Vec2> {
    (0..n)
        .map(|i| Vec2::new((i % 100) as f32 * 10.0 + 5.0, (i / 100) as f32 * 10.0 + 5.0))
        .collect()
}

fn grid() -> SpatialHashGrid {
    SpatialHashGrid::new(Bounds::new(0.0, 0.0, 1000.0, 1000.0), UVec2::new(14, 14))
        .expect("valid grid")
}

fn bench_grid_rebuild(c: &mut Criterion) {
    let positions = lattice(10_000);
    let mut grid = grid();

    c.bench_function("grid_rebuild_10000", |b| {
        b.iter(|| {
            grid.clear();
            for (i, p) in positions.iter().enumerate() {
                let _ = grid.insert(*p, EntityId::Cell(i));
            }
            black_box(grid.dropped_since_clear())
        })
    });
}

fn bench_grid_query(c: &mut Criterion) {
    let positions = lattice(5_000);
    let mut grid = grid();
    for (i, p) in positions.iter().enumerate() {
        let _ = grid.insert(*p, EntityId::Plant(i));
    }

    c.bench_function("grid_query_3x3", |b| {
        let mut out = NeighborBuffer::new();
        b.iter(|| {
            let _ = grid.query(black_box(Vec2::new(500.0, 250.0)), &mut out);
            black_box(out.len())
        })
    });
}

criterion_group!(benches, bench_grid_rebuild, bench_grid_query);
criterion_main!(benches);
