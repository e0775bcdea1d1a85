//! Benchmarks for spatial indexes, triangulation and regridding.
//!
//! Run with: cargo bench --package regrid --bench regrid_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use regrid::index::{BucketIndex, KdTree, SpatialIndex};
use regrid::{
    Field, GridSpecification, IndexKind, InterpolationMethod, PointSet, RegridConfig, Regridder,
    Triangulation,
};

/// Random `[lat, lon]` points over the EXPATS box.
fn random_points(n: usize) -> Vec<[f64; 2]> {
    let mut rng = rand::thread_rng();
    (0..n)
        .map(|_| [rng.gen_range(42.0..51.5), rng.gen_range(5.0..16.0)])
        .collect()
}

/// Sheared satellite-like mesh with brightness temperatures and NaN gaps.
fn satellite_scene(rows: usize, cols: usize) -> (Field<f32>, Vec<f64>, Vec<f64>) {
    let mut rng = rand::thread_rng();
    let mut lat = Vec::with_capacity(rows * cols);
    let mut lon = Vec::with_capacity(rows * cols);
    let mut data = Vec::with_capacity(rows * cols);
    let (dlat, dlon) = (10.5 / rows as f64, 12.0 / cols as f64);

    for r in 0..rows {
        for c in 0..cols {
            let la = 41.5 + r as f64 * dlat + c as f64 * dlon * 0.05;
            let lo = 4.5 + c as f64 * dlon - r as f64 * dlat * 0.05;
            lat.push(la);
            lon.push(lo);
            let bt = 255.0 + 45.0 * (la * 0.9).sin() * (lo * 0.7).cos();
            data.push(if rng.gen_bool(0.1) { f32::NAN } else { bt as f32 });
        }
    }

    (Field::continuous(data, rows, cols).unwrap(), lat, lon)
}

fn expats() -> GridSpecification {
    GridSpecification::new(42.0, 51.5, 5.0, 16.0, 0.04).unwrap()
}

// =============================================================================
// INDEX BENCHMARKS
// =============================================================================

fn bench_index_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_build");

    for n in [10_000, 100_000] {
        let points = random_points(n);
        group.throughput(Throughput::Elements(n as u64));

        group.bench_with_input(BenchmarkId::new("kdtree", n), &points, |b, pts| {
            b.iter(|| black_box(KdTree::build(pts.clone())));
        });
        group.bench_with_input(BenchmarkId::new("bucket", n), &points, |b, pts| {
            b.iter(|| black_box(BucketIndex::build(pts.clone(), 4)));
        });
    }

    group.finish();
}

fn bench_index_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_query");
    let points = random_points(100_000);
    let queries = random_points(10_000);
    group.throughput(Throughput::Elements(queries.len() as u64));

    let kdtree = KdTree::build(points.clone());
    let bucket = BucketIndex::build(points, 4);

    group.bench_function("kdtree_nearest_10k", |b| {
        b.iter(|| black_box(kdtree.nearest_batch(&queries)));
    });
    group.bench_function("bucket_nearest_10k", |b| {
        b.iter(|| black_box(bucket.nearest_batch(&queries)));
    });

    group.finish();
}

// =============================================================================
// TRIANGULATION BENCHMARKS
// =============================================================================

fn bench_triangulation(c: &mut Criterion) {
    let mut group = c.benchmark_group("triangulation");
    group.sample_size(10);

    for n in [1_000, 20_000] {
        let points = random_points(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("build", n), &points, |b, pts| {
            b.iter(|| black_box(Triangulation::build(pts)));
        });
    }

    group.finish();
}

// =============================================================================
// REGRID BENCHMARKS
// =============================================================================

fn bench_regrid(c: &mut Criterion) {
    let mut group = c.benchmark_group("regrid_expats");
    group.sample_size(10);

    let (field, lat, lon) = satellite_scene(250, 300);
    let points = PointSet::from_field(&field, &lat, &lon).unwrap();
    let grid = expats();
    group.throughput(Throughput::Elements(grid.len() as u64));

    for kind in [IndexKind::KdTree, IndexKind::Bucket] {
        let regridder = Regridder::new(RegridConfig::default().with_index(kind)).unwrap();
        let source = regridder.prepare(&points).unwrap();

        group.bench_function(BenchmarkId::new("nearest", kind.to_string()), |b| {
            b.iter(|| {
                black_box(
                    regridder
                        .regrid_prepared(&source, &grid, InterpolationMethod::Nearest)
                        .unwrap(),
                )
            });
        });
    }

    let regridder = Regridder::default();
    let source = regridder.prepare(&points).unwrap();
    // Triangulate outside the timed loop.
    black_box(source.triangulation());
    group.bench_function("linear", |b| {
        b.iter(|| {
            black_box(
                regridder
                    .regrid_prepared(&source, &grid, InterpolationMethod::Linear)
                    .unwrap(),
            )
        });
    });

    group.bench_function("fill_gaps_nearest", |b| {
        b.iter(|| {
            black_box(
                regridder
                    .fill_gaps(&field, &lat, &lon, InterpolationMethod::Nearest)
                    .unwrap(),
            )
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_index_build,
    bench_index_query,
    bench_triangulation,
    bench_regrid,
);
criterion_main!(benches);
