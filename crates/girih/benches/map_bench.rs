//! Criterion benchmarks for map merging and cleansing.
//! Focus sizes: n segments in {50, 200, 800}; fill radius in {1, 2, 4}.
//! Results: by default under target/criterion.

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use girih::api::{cleanse, CleanseFlags, FillRegion, FillSpec, Map, Motif, Tile};
use girih::GeomCfg;
use nalgebra::Vector2;
use rand::{rngs::StdRng, Rng, SeedableRng};

fn segment_soup(n: usize, seed: u64) -> Map {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut m = Map::new();
    for _ in 0..n {
        // quarter-grid endpoints so crossings and overlaps are common
        let mut pt = || {
            Vector2::new(
                rng.gen_range(-40i32..=40) as f64 * 0.25,
                rng.gen_range(-40i32..=40) as f64 * 0.25,
            )
        };
        let (p, q) = (pt(), pt());
        m.insert_edge_pts(p, q);
    }
    m
}

fn bench_cleanse(c: &mut Criterion) {
    let mut group = c.benchmark_group("cleanse");
    for &n in &[50usize, 200, 800] {
        group.bench_with_input(BenchmarkId::new("all_passes", n), &n, |b, &n| {
            b.iter_batched(
                || segment_soup(n, 41),
                |mut m| {
                    let _changed = cleanse(&mut m, CleanseFlags::ALL, 1e-12);
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge");
    let star = Motif::star(3.0, 2.0).build(&Tile::regular(8), GeomCfg::default());
    let t1 = Vector2::new(1.0 + std::f64::consts::SQRT_2, 0.0);
    let t2 = Vector2::new(0.0, t1.x);
    for &r in &[1i32, 2, 4] {
        let fill = FillRegion::new(t1, t2, FillSpec::square(r)).placements();
        group.bench_with_input(BenchmarkId::new("merge_verify_fix", r), &fill, |b, fill| {
            b.iter_batched(
                Map::new,
                |mut m| {
                    m.merge_many(&star, fill);
                    let _ok = m.verify(true);
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_cleanse, bench_merge);
criterion_main!(benches);
