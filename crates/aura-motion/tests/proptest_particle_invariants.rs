//! Property-based invariant tests for the particle field and resize debouncer.
//!
//! 1. Generated positions lie inside the surface.
//! 2. Positions stay inside the surface after any number of steps.
//! 3. Speed is preserved by reflection.
//! 4. Batch size equals `particle_count` across resizes.
//! 5. Determinism: same seed + viewport + timestamps → same field.
//! 6. A burst of resizes applies at most once, with the latest size.
//! 7. Normalized configs never panic on generation.

use core::time::Duration;

use aura_motion::config::MotionConfig;
use aura_motion::debounce::{DebounceAction, ResizeDebouncer};
use aura_motion::geometry::{SurfaceSize, Viewport};
use aura_motion::headless::HeadlessHost;
use aura_motion::particle::ParticleBatch;
use aura_motion::AmbientMotionLayer;
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;

// ── Strategies ────────────────────────────────────────────────────────────

fn surface_strategy() -> impl Strategy<Value = SurfaceSize> {
    (0u32..=2_000, 0u32..=2_000).prop_map(|(w, h)| SurfaceSize::new(w, h))
}

fn config_strategy() -> impl Strategy<Value = MotionConfig> {
    (
        1usize..=200,      // particle_count
        0.0f64..=50.0,     // speed a
        0.0f64..=50.0,     // speed b
        -5.0f64..=10.0,    // radius a
        -5.0f64..=10.0,    // radius b
        -1.0f64..=2.0,     // opacity a
        -1.0f64..=2.0,     // opacity b
        any::<u64>(),      // seed
    )
        .prop_map(|(count, sa, sb, ra, rb, oa, ob, seed)| {
            MotionConfig::default()
                .with_particle_count(count)
                .with_speed_range(sa, sb)
                .with_radius_range(ra, rb)
                .with_opacity_range(oa, ob)
                .with_seed(seed)
                .normalized()
        })
}

// ─── 1–3. Field geometry ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn generated_positions_inside_surface(
        config in config_strategy(),
        size in surface_strategy(),
    ) {
        let mut rng = SmallRng::seed_from_u64(config.seed.unwrap_or_default());
        let batch = ParticleBatch::generate(&config, size, &mut rng);
        prop_assert_eq!(batch.len(), config.particle_count);
        for p in batch.iter() {
            prop_assert!(size.contains(p.position), "{:?} outside {:?}", p.position, size);
            prop_assert!(p.radius > 0.0);
            prop_assert!((0.0..=1.0).contains(&p.opacity));
        }
    }

    #[test]
    fn positions_stay_inside_after_steps(
        config in config_strategy(),
        size in surface_strategy(),
        steps in 0usize..400,
    ) {
        let mut rng = SmallRng::seed_from_u64(config.seed.unwrap_or_default());
        let mut batch = ParticleBatch::generate(&config, size, &mut rng);
        for _ in 0..steps {
            batch.step();
        }
        for p in batch.iter() {
            prop_assert!(size.contains(p.position), "{:?} outside {:?}", p.position, size);
        }
    }

    #[test]
    fn reflection_preserves_speed(
        config in config_strategy(),
        size in surface_strategy(),
        steps in 1usize..200,
    ) {
        let mut rng = SmallRng::seed_from_u64(config.seed.unwrap_or_default());
        let mut batch = ParticleBatch::generate(&config, size, &mut rng);
        let before: Vec<f64> = batch.iter().map(|p| p.velocity.length()).collect();
        for _ in 0..steps {
            batch.step();
        }
        for (p, speed) in batch.iter().zip(before) {
            prop_assert!((p.velocity.length() - speed).abs() < 1e-9);
        }
    }
}

// ─── 4–5. Layer ───────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn batch_size_constant_across_resizes(
        count in 1usize..=120,
        sizes in proptest::collection::vec((0.0f64..=3_000.0, 0.0f64..=3_000.0), 1..8),
    ) {
        let mut layer = AmbientMotionLayer::new(HeadlessHost::new(Viewport::new(800.0, 600.0)));
        layer.initialize(MotionConfig::default().with_particle_count(count)).unwrap();
        for (w, h) in sizes {
            layer.host_mut().set_viewport(Some(Viewport::new(w, h)));
            layer.on_resize();
            let bounds = layer.surface_size();
            prop_assert_eq!(layer.particles().len(), count);
            prop_assert!(layer.particles().iter().all(|p| bounds.contains(p.position)));
        }
    }

    #[test]
    fn same_inputs_same_field(
        seed in any::<u64>(),
        frames in proptest::collection::vec(1u64..=40, 1..60),
    ) {
        let run = || {
            let mut layer = AmbientMotionLayer::new(HeadlessHost::new(Viewport::new(640.0, 480.0)));
            layer.initialize(MotionConfig::default().with_seed(seed)).unwrap();
            layer.start();
            let mut now = Duration::ZERO;
            for dt in &frames {
                now += Duration::from_millis(*dt);
                let Some(handle) = layer.pending_frame() else { break };
                layer.host_mut().fire(handle);
                layer.on_frame(handle, now);
            }
            layer.particles().particles().to_vec()
        };
        prop_assert_eq!(run(), run());
    }
}

// ─── 6. Debounce ──────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn burst_applies_once_with_latest_size(
        gaps in proptest::collection::vec(0u64..150, 1..30),
        widths in proptest::collection::vec(1u32..4_000, 30),
    ) {
        let mut debouncer = ResizeDebouncer::default();
        let mut now = Duration::ZERO;
        let mut last = None;
        for (gap, width) in gaps.iter().zip(&widths) {
            now += Duration::from_millis(*gap);
            let v = Viewport::new(f64::from(*width), 100.0);
            debouncer.handle_resize_at(v, now);
            last = Some(v);
            // Events closer than the delay never apply early.
            prop_assert_eq!(debouncer.tick_at(now), DebounceAction::None);
        }
        let settle = now + Duration::from_millis(150);
        match debouncer.tick_at(settle) {
            DebounceAction::Apply { viewport, coalesced, .. } => {
                prop_assert_eq!(Some(viewport), last);
                prop_assert_eq!(coalesced as usize, gaps.len());
            }
            other => prop_assert!(false, "expected apply, got {:?}", other),
        }
        prop_assert_eq!(debouncer.tick_at(settle + Duration::from_secs(1)), DebounceAction::None);
    }
}
