// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_quadtree::{Aabb2D, QuadTreeConfig, SpatialIndex};

const WORLD_W: f64 = 4000.0;
const WORLD_H: f64 = 3000.0;

fn world() -> Aabb2D<f64> {
    Aabb2D::from_xywh(0.0, 0.0, WORLD_W, WORLD_H)
}

fn gen_grid_rects(n: usize, cell: f64) -> Vec<Aabb2D<f64>> {
    let mut out = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            let x0 = x as f64 * cell;
            let y0 = y as f64 * cell;
            out.push(Aabb2D::from_xywh(x0, y0, cell * 0.8, cell * 0.8));
        }
    }
    out
}

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

fn gen_random_rects(count: usize, seed: u64, rect_w: f64, rect_h: f64) -> Vec<Aabb2D<f64>> {
    let mut out = Vec::with_capacity(count);
    let mut rng = Rng::new(seed);
    for _ in 0..count {
        let x0 = rng.next_f64() * (WORLD_W - rect_w);
        let y0 = rng.next_f64() * (WORLD_H - rect_h);
        out.push(Aabb2D::from_xywh(x0, y0, rect_w, rect_h));
    }
    out
}

fn gen_clustered_rects(n_clusters: usize, per_cluster: usize, spread: f64) -> Vec<Aabb2D<f64>> {
    let mut out = Vec::with_capacity(n_clusters * per_cluster);
    let mut rng = Rng::new(0xC1A5_7E55_9999_ABCD);
    let mut centers = Vec::with_capacity(n_clusters);
    for _ in 0..n_clusters {
        centers.push((rng.next_f64() * WORLD_W, rng.next_f64() * WORLD_H));
    }
    for (cx, cy) in centers {
        for _ in 0..per_cluster {
            let dx = (rng.next_f64() - 0.5) * spread;
            let dy = (rng.next_f64() - 0.5) * spread;
            out.push(Aabb2D::from_xywh(cx + dx, cy + dy, 12.0, 12.0));
        }
    }
    out
}

fn build(rects: &[Aabb2D<f64>]) -> SpatialIndex<u32> {
    let mut idx = SpatialIndex::new(world());
    idx.rebuild(rects.iter().copied().enumerate().map(|(i, r)| (i as u32, r)));
    idx
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    for &n in &[32usize, 64] {
        let rects = gen_grid_rects(n, 40.0);
        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_function(format!("grid_n{}", n), |b| {
            b.iter_batched(
                || SpatialIndex::<u32>::new(world()),
                |mut idx| {
                    for (i, r) in rects.iter().copied().enumerate() {
                        idx.insert(i as u32, r);
                    }
                    black_box(idx.len());
                },
                BatchSize::SmallInput,
            )
        });
    }
    let rects = gen_clustered_rects(16, 256, 150.0);
    group.throughput(Throughput::Elements(rects.len() as u64));
    group.bench_function("clustered", |b| {
        b.iter_batched(
            || SpatialIndex::<u32>::new(world()),
            |mut idx| {
                for (i, r) in rects.iter().copied().enumerate() {
                    idx.insert(i as u32, r);
                }
                black_box(idx.len());
            },
            BatchSize::SmallInput,
        )
    });
    let config = QuadTreeConfig::new().with_max_items(16).with_max_depth(10);
    group.bench_function("clustered_max16", |b| {
        b.iter_batched(
            || SpatialIndex::<u32>::with_config(world(), config),
            |mut idx| {
                for (i, r) in rects.iter().copied().enumerate() {
                    idx.insert(i as u32, r);
                }
                black_box(idx.len());
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("update");
    let rects = gen_random_rects(4096, 0xCAFE_F00D_DEAD_BEEF, 24.0, 24.0);
    let moved = gen_random_rects(256, 0xFACE_FEED_CAFE_BABE, 24.0, 24.0);
    group.throughput(Throughput::Elements(moved.len() as u64));
    group.bench_function("drag_256_of_4096", |b| {
        b.iter_batched(
            || build(&rects),
            |mut idx| {
                for (i, r) in moved.iter().copied().enumerate() {
                    idx.insert(i as u32, r);
                }
                black_box(idx.len());
            },
            BatchSize::SmallInput,
        )
    });
    group.bench_function("remove_256_of_4096", |b| {
        b.iter_batched(
            || build(&rects),
            |mut idx| {
                for i in 0..256_u32 {
                    black_box(idx.remove(&i));
                }
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("rebuild");
    for &count in &[1024usize, 8192] {
        let rects = gen_random_rects(count, 0xBADC_F00D_1234_5678, 16.0, 16.0);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_function(format!("random_{}", count), |b| {
            b.iter_batched(
                || SpatialIndex::<u32>::new(world()),
                |mut idx| {
                    idx.rebuild(rects.iter().copied().enumerate().map(|(i, r)| (i as u32, r)));
                    black_box(idx.len());
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("query");
    let idx = build(&gen_random_rects(8192, 0xCAFE_F00D_DEAD_BEEF, 16.0, 16.0));
    let marquee = Aabb2D::from_xywh(800.0, 800.0, 400.0, 300.0);
    group.bench_function("rect_marquee", |b| {
        b.iter(|| black_box(idx.query_rect(black_box(marquee)).len()))
    });
    group.bench_function("visit_rect_marquee", |b| {
        b.iter(|| {
            let mut hits = 0_usize;
            idx.visit_rect(black_box(marquee), |_| hits += 1);
            black_box(hits)
        })
    });
    group.bench_function("rect_viewport", |b| {
        b.iter(|| black_box(idx.query_rect(black_box(world())).len()))
    });

    let mut rng = Rng::new(0x1234_5678_9ABC_DEF0);
    let points: Vec<(f64, f64)> = (0..256)
        .map(|_| (rng.next_f64() * WORLD_W, rng.next_f64() * WORLD_H))
        .collect();
    group.throughput(Throughput::Elements(points.len() as u64));
    group.bench_function("point_hit_test", |b| {
        b.iter(|| {
            let mut hits = 0_usize;
            for &(x, y) in &points {
                hits += idx.query_point(x, y).len();
            }
            black_box(hits)
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_insert,
    bench_update,
    bench_rebuild,
    bench_queries
);
criterion_main!(benches);
