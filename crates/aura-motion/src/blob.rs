#![forbid(unsafe_code)]

//! Blurred blob field drawn beneath the particles.
//!
//! Blobs sit on a ring around the surface center. The normalized pointer
//! rotates the ring (independently per axis), which gives the parallax
//! drift. Scales are sampled once per generation so the field does not
//! flicker between frames.

use core::f64::consts::{PI, TAU};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::color::{Rgb, Rgba, clamp_unit};
use crate::config::ordered_range;
use crate::geometry::{SurfaceSize, Vec2};
use crate::host::{Circle, DrawSurface};
use crate::particle::sample;

/// Brand palette for the blob field: cream, gold, rich black, warm taupe,
/// sand, off-white.
pub const AURA_BLOB_PALETTE: [Rgb; 6] = [
    Rgb::new(0xFE, 0xF9, 0xF6),
    Rgb::new(0xD7, 0xBF, 0xA5),
    Rgb::new(0x23, 0x1F, 0x20),
    Rgb::new(0xBF, 0xA8, 0x80),
    Rgb::new(0xE2, 0xC9, 0xA0),
    Rgb::new(0xF7, 0xF3, 0xEF),
];

const MAX_BLOBS: usize = 64;

/// Blob field parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BlobConfig {
    pub count: usize,
    /// `[min, max]` radius as a fraction of `(width + height) / 2`.
    pub scale_range: [f64; 2],
    /// Opacities cycled by blob index.
    pub opacities: Vec<f64>,
    pub palette: Vec<Rgb>,
    /// Blur radius in surface pixels.
    pub blur: f64,
    /// Ring radius as a fraction of each surface dimension.
    pub orbit: f64,
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            count: 6,
            scale_range: [0.25, 0.75],
            opacities: vec![0.22, 0.33, 0.11, 0.18, 0.2],
            palette: AURA_BLOB_PALETTE.to_vec(),
            blur: 42.0,
            orbit: 0.3,
        }
    }
}

impl BlobConfig {
    #[must_use]
    pub fn normalized(mut self) -> Self {
        let defaults = Self::default();
        self.count = self.count.min(MAX_BLOBS);
        let [min, max] = ordered_range(self.scale_range, defaults.scale_range);
        self.scale_range = [min.max(0.0), max.max(0.0)];
        self.opacities.retain(|o| o.is_finite());
        for o in &mut self.opacities {
            *o = clamp_unit(*o);
        }
        if self.opacities.is_empty() {
            self.opacities = defaults.opacities;
        }
        if self.palette.is_empty() {
            self.palette = defaults.palette;
        }
        if !(self.blur.is_finite() && self.blur >= 0.0) {
            self.blur = defaults.blur;
        }
        if !self.orbit.is_finite() {
            self.orbit = defaults.orbit;
        }
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blob {
    pub angle: f64,
    pub scale: f64,
    pub color: Rgb,
    pub opacity: f64,
}

impl Blob {
    /// Circle for this blob on a surface of `size` with pointer at `pointer`.
    pub fn circle(&self, size: SurfaceSize, pointer: Vec2, orbit: f64, blur: f64) -> Circle {
        let (w, h) = (size.width_f64(), size.height_f64());
        Circle {
            center: Vec2::new(
                w * (0.5 + (self.angle + pointer.x * PI).cos() * orbit),
                h * (0.5 + (self.angle + pointer.y * PI).sin() * orbit),
            ),
            radius: (w + h) * self.scale / 2.0,
            color: Rgba::new(self.color, self.opacity),
            blur,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BlobField {
    blobs: Vec<Blob>,
    orbit: f64,
    blur: f64,
}

impl BlobField {
    /// Place `config.count` blobs evenly around the ring. `config` is
    /// expected to be normalized.
    pub fn generate<R: Rng>(config: &BlobConfig, rng: &mut R) -> Self {
        let count = config.count;
        let blobs = (0..count)
            .map(|i| Blob {
                angle: i as f64 / count as f64 * TAU,
                scale: sample(rng, config.scale_range),
                color: cycle(&config.palette, i).unwrap_or(AURA_BLOB_PALETTE[0]),
                opacity: cycle(&config.opacities, i).unwrap_or(0.0),
            })
            .collect();
        Self {
            blobs,
            orbit: config.orbit,
            blur: config.blur,
        }
    }

    pub fn draw<S: DrawSurface + ?Sized>(&self, surface: &mut S, size: SurfaceSize, pointer: Vec2) {
        for blob in &self.blobs {
            surface.fill_circle(&blob.circle(size, pointer, self.orbit, self.blur));
        }
    }

    #[inline]
    pub fn blobs(&self) -> &[Blob] {
        &self.blobs
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

#[inline]
fn cycle<T: Copy>(items: &[T], i: usize) -> Option<T> {
    if items.is_empty() {
        None
    } else {
        items.get(i % items.len()).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    const NEUTRAL: Vec2 = Vec2::new(0.5, 0.5);

    #[test]
    fn default_field_has_six_blobs_on_ring() {
        let field = BlobField::generate(&BlobConfig::default(), &mut SmallRng::seed_from_u64(1));
        assert_eq!(field.len(), 6);
        let angles: Vec<f64> = field.blobs().iter().map(|b| b.angle).collect();
        assert_eq!(angles[0], 0.0);
        assert!((angles[3] - PI).abs() < 1e-12);
        for blob in field.blobs() {
            assert!((0.25..=0.75).contains(&blob.scale));
        }
        assert_eq!(field.blobs()[5].opacity, 0.22);
        assert_eq!(field.blobs()[2].color, Rgb::new(0x23, 0x1F, 0x20));
    }

    #[test]
    fn blob_geometry_follows_pointer() {
        let blob = Blob {
            angle: 0.0,
            scale: 0.5,
            color: AURA_BLOB_PALETTE[0],
            opacity: 0.2,
        };
        let size = SurfaceSize::new(1000, 500);
        let c = blob.circle(size, Vec2::ZERO, 0.3, 42.0);
        assert!((c.center.x - 800.0).abs() < 1e-9);
        assert!((c.center.y - 250.0).abs() < 1e-9);
        assert_eq!(c.radius, 375.0);
        assert_eq!(c.blur, 42.0);

        let moved = blob.circle(size, NEUTRAL, 0.3, 42.0);
        assert!((moved.center.x - 500.0).abs() < 1e-9);
        assert!((moved.center.y - 400.0).abs() < 1e-9);
        assert_eq!(moved.radius, c.radius);
    }

    #[test]
    fn radii_are_stable_between_draws() {
        struct Radii(Vec<f64>);
        impl DrawSurface for Radii {
            fn set_size(&mut self, _: SurfaceSize) {}
            fn clear(&mut self) {}
            fn fill_gradient(&mut self, _: &crate::host::LinearGradient) {}
            fn fill_circle(&mut self, c: &Circle) {
                self.0.push(c.radius);
            }
        }
        let field = BlobField::generate(&BlobConfig::default(), &mut SmallRng::seed_from_u64(3));
        let size = SurfaceSize::new(640, 480);
        let mut a = Radii(Vec::new());
        let mut b = Radii(Vec::new());
        field.draw(&mut a, size, NEUTRAL);
        field.draw(&mut b, size, Vec2::new(0.9, 0.1));
        assert_eq!(a.0, b.0);
    }

    #[test]
    fn normalized_repairs_config() {
        let c = BlobConfig {
            count: 1000,
            scale_range: [0.9, -0.1],
            opacities: vec![f64::NAN, 2.0],
            palette: Vec::new(),
            blur: -1.0,
            orbit: f64::INFINITY,
        }
        .normalized();
        assert_eq!(c.count, MAX_BLOBS);
        assert_eq!(c.scale_range, [0.0, 0.9]);
        assert_eq!(c.opacities, vec![1.0]);
        assert_eq!(c.palette, AURA_BLOB_PALETTE.to_vec());
        assert_eq!(c.blur, 42.0);
        assert_eq!(c.orbit, 0.3);
    }

    #[test]
    fn zero_count_is_empty_field() {
        let config = BlobConfig {
            count: 0,
            ..BlobConfig::default()
        };
        assert!(BlobField::generate(&config, &mut SmallRng::seed_from_u64(0)).is_empty());
    }
}
