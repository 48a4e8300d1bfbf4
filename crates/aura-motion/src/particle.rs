#![forbid(unsafe_code)]

//! Particle batch: generation, integration with boundary reflection, drawing.

use core::f64::consts::TAU;

use rand::Rng;

use crate::color::{Rgb, Rgba};
use crate::config::MotionConfig;
use crate::geometry::{SurfaceSize, Vec2};
use crate::host::{Circle, DrawSurface};

/// One drifting particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionParticle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f64,
    pub opacity: f64,
    pub color: Rgb,
}

impl MotionParticle {
    /// Advance one update and reflect off the `[0, w] × [0, h]` box.
    #[inline]
    pub fn step(&mut self, bounds: SurfaceSize) {
        self.position += self.velocity;
        reflect_axis(&mut self.position.x, &mut self.velocity.x, bounds.width_f64());
        reflect_axis(&mut self.position.y, &mut self.velocity.y, bounds.height_f64());
    }

    #[inline]
    pub fn circle(&self) -> Circle {
        Circle {
            center: self.position,
            radius: self.radius,
            color: Rgba::new(self.color, self.opacity),
            blur: 0.0,
        }
    }
}

/// Mirror `pos` back inside `[0, max]`, flipping `vel` when it crossed an edge.
#[inline]
fn reflect_axis(pos: &mut f64, vel: &mut f64, max: f64) {
    if max <= 0.0 {
        *pos = 0.0;
        return;
    }
    if *pos < 0.0 {
        *pos = -*pos;
        *vel = -*vel;
    } else if *pos > max {
        *pos = 2.0 * max - *pos;
        *vel = -*vel;
    }
    // A single mirror cannot bring back a step longer than the box.
    *pos = pos.clamp(0.0, max);
}

/// The full particle set for one surface size.
///
/// A batch is only ever replaced wholesale: [`ParticleBatch::generate`] on
/// initialization and on every applied resize.
#[derive(Debug, Clone, Default)]
pub struct ParticleBatch {
    particles: Vec<MotionParticle>,
    bounds: SurfaceSize,
}

impl ParticleBatch {
    /// Generate `config.particle_count` particles spread uniformly over `bounds`.
    ///
    /// `config` is expected to be normalized.
    pub fn generate<R: Rng>(config: &MotionConfig, bounds: SurfaceSize, rng: &mut R) -> Self {
        let palette = &config.color_palette;
        let particles = (0..config.particle_count)
            .map(|i| {
                let position = Vec2::new(
                    sample(rng, [0.0, bounds.width_f64()]),
                    sample(rng, [0.0, bounds.height_f64()]),
                );
                let angle = rng.random_range(0.0..TAU);
                let speed = sample(rng, config.speed_range);
                MotionParticle {
                    position,
                    velocity: Vec2::from_polar(angle, speed),
                    radius: sample(rng, config.radius_range),
                    opacity: sample(rng, config.opacity_range),
                    color: palette
                        .get(i % palette.len().max(1))
                        .copied()
                        .unwrap_or(crate::config::AURA_GOLD),
                }
            })
            .collect();
        Self { particles, bounds }
    }

    /// Integrate every particle once.
    pub fn step(&mut self) {
        let bounds = self.bounds;
        for particle in &mut self.particles {
            particle.step(bounds);
        }
    }

    /// Fill one circle per particle.
    pub fn draw<S: DrawSurface + ?Sized>(&self, surface: &mut S) {
        for particle in &self.particles {
            surface.fill_circle(&particle.circle());
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    #[inline]
    pub fn bounds(&self) -> SurfaceSize {
        self.bounds
    }

    #[inline]
    pub fn particles(&self) -> &[MotionParticle] {
        &self.particles
    }

    pub fn iter(&self) -> impl Iterator<Item = &MotionParticle> + '_ {
        self.particles.iter()
    }
}

/// Uniform sample from an ordered `[min, max]` pair; degenerate ranges return `min`.
#[inline]
pub(crate) fn sample<R: Rng>(rng: &mut R, [min, max]: [f64; 2]) -> f64 {
    if max > min {
        rng.random_range(min..=max)
    } else {
        min
    }
}
