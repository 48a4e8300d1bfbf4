//! Benchmarks for the per-frame particle path.
//!
//! Run with: cargo bench -p aura-motion --bench particle_step_bench
//!
//! Frame budget: one full update + draw must stay well under 4ms.

use core::time::Duration;
use std::hint::black_box;

use aura_motion::blob::BlobConfig;
use aura_motion::config::MotionConfig;
use aura_motion::geometry::{SurfaceSize, Viewport};
use aura_motion::headless::HeadlessHost;
use aura_motion::particle::ParticleBatch;
use aura_motion::AmbientMotionLayer;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::SmallRng;

// =============================================================================
// Batch stepping
// =============================================================================

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("particle/step");
    let size = SurfaceSize::new(1920, 1080);
    for count in [40usize, 400, 4_000] {
        let config = MotionConfig::default().with_particle_count(count);
        let mut batch = ParticleBatch::generate(&config, size, &mut SmallRng::seed_from_u64(1));
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| {
                batch.step();
                black_box(batch.particles().first().map(|p| p.position))
            })
        });
    }
    group.finish();
}

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("particle/generate");
    let size = SurfaceSize::new(1920, 1080);
    for count in [40usize, 4_000] {
        let config = MotionConfig::default().with_particle_count(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &config, |b, config| {
            let mut rng = SmallRng::seed_from_u64(2);
            b.iter(|| black_box(ParticleBatch::generate(config, size, &mut rng)))
        });
    }
    group.finish();
}

// =============================================================================
// Full frame through the layer
// =============================================================================

fn bench_layer_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("layer/frame");
    let cases = [
        ("particles", MotionConfig::default()),
        ("particles_blobs", MotionConfig::default().with_blobs(BlobConfig::default())),
    ];
    for (name, config) in cases {
        let mut layer = AmbientMotionLayer::new(HeadlessHost::new(Viewport::new(1920.0, 1080.0)));
        if layer.initialize(config).is_err() {
            continue;
        }
        layer.start();
        let mut now = Duration::ZERO;
        group.bench_function(name, |b| {
            b.iter(|| {
                now += Duration::from_millis(16);
                let Some(handle) = layer.pending_frame() else {
                    return;
                };
                layer.host_mut().fire(handle);
                black_box(layer.on_frame(handle, now));
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_step, bench_generate, bench_layer_frame);
criterion_main!(benches);
