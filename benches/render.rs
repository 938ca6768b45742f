//! Benchmarks for building and rendering an atlas.
//!
//! Run with: `cargo bench --bench render`
//!
//! | Operation | Input |
//! |-----------|-------|
//! | Build | Built-in dataset (65 maps, 76 edges) |
//! | Build | Synthetic ring lattice, scaled |
//! | Render | Built-in dataset, plain and colored |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use atlas_tracker::{
    builtin_documents, render_lines, AdjacencySpec, GraphBuilder, MapSpec, Palette, RenderOptions,
    Tier,
};

/// Ring lattice: map i borders i+1 and i+2.
fn ring(n: usize) -> (Vec<MapSpec>, AdjacencySpec) {
    let maps = (0..n)
        .map(|i| {
            let tier = Tier::new((i % 16) as u32 + 1).unwrap();
            MapSpec::new(format!("map_{i}"), tier, i % 3 == 0)
        })
        .collect();
    let pairs = (0..n).flat_map(|i| {
        [
            (format!("map_{i}"), format!("map_{}", (i + 1) % n)),
            (format!("map_{i}"), format!("map_{}", (i + 2) % n)),
        ]
    });
    (maps, AdjacencySpec::from_pairs(pairs))
}

fn bench_build_builtin(c: &mut Criterion) {
    let docs = builtin_documents().unwrap();
    c.bench_function("build_builtin", |b| {
        b.iter(|| black_box(docs.build().unwrap()))
    });
}

fn bench_build_scaled(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_ring");
    for n in [50usize, 500, 5_000] {
        let (maps, adjacency) = ring(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| {
                black_box(
                    GraphBuilder::new()
                        .maps(maps.clone())
                        .adjacency(adjacency.clone())
                        .build(),
                )
            })
        });
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let model = builtin_documents().unwrap().build().unwrap();
    let colored = RenderOptions { palette: Palette::default(), ..RenderOptions::default() };
    let plain = RenderOptions { plain: true, ..RenderOptions::default() };

    c.bench_function("render_colored", |b| {
        b.iter(|| black_box(render_lines(&model, &colored).unwrap()))
    });
    c.bench_function("render_plain", |b| {
        b.iter(|| black_box(render_lines(&model, &plain).unwrap()))
    });
}

criterion_group!(benches, bench_build_builtin, bench_build_scaled, bench_render);
criterion_main!(benches);
