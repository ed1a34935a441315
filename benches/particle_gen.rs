//! Benchmarks for particle placement and the per-frame scene update.
//!
//! Run with: cargo bench --bench particle_gen

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use snowfield::{generate_positions, Scene, SnowfieldConfig, TextureRegistry, Viewport};

fn bench_generate_positions(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_positions");
    for count in [1_000usize, 10_000, 100_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let mut rng = StdRng::seed_from_u64(0);
            b.iter(|| generate_positions(&mut rng, black_box(count), 1000.0));
        });
    }
    group.finish();
}

fn bench_scene_update(c: &mut Criterion) {
    let config = SnowfieldConfig::default();
    let mut textures = TextureRegistry::new();
    let mut rng = StdRng::seed_from_u64(0);
    let mut scene =
        Scene::new(&config, Viewport::new(1280, 720, 1.0, 2.0), &mut textures, &mut rng).unwrap();

    let mut t = 0.0f32;
    c.bench_function("scene_update", |b| {
        b.iter(|| {
            t += 1.0 / 60.0;
            scene.update(black_box(t));
        })
    });
}

criterion_group!(benches, bench_generate_positions, bench_scene_update);
criterion_main!(benches);
