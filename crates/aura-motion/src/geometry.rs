#![forbid(unsafe_code)]

//! Small geometry primitives shared by the layer and its hosts.

use serde::{Deserialize, Serialize};

/// 2D vector in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unit vector at `angle` radians scaled to `magnitude`.
    #[inline]
    pub fn from_polar(angle: f64, magnitude: f64) -> Self {
        Self {
            x: angle.cos() * magnitude,
            y: angle.sin() * magnitude,
        }
    }

    #[inline]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }
}

impl core::ops::Add for Vec2 {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl core::ops::AddAssign for Vec2 {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

/// Viewport size in CSS pixels, as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Surface size for this viewport at the given resolution factor.
    ///
    /// Non-finite or negative dimensions collapse to zero.
    #[must_use]
    pub fn surface_size(self, resolution_factor: f64) -> SurfaceSize {
        SurfaceSize::new(
            scaled_dimension(self.width, resolution_factor),
            scaled_dimension(self.height, resolution_factor),
        )
    }

    /// Normalize a client-space point to `[0, 1]²` over this viewport.
    ///
    /// A degenerate viewport maps every point to the center.
    #[must_use]
    pub fn normalize(self, client_x: f64, client_y: f64) -> (f64, f64) {
        (
            normalize_axis(client_x, self.width),
            normalize_axis(client_y, self.height),
        )
    }
}

/// Drawing surface size in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    pub fn width_f64(self) -> f64 {
        f64::from(self.width)
    }

    #[inline]
    pub fn height_f64(self) -> f64 {
        f64::from(self.height)
    }

    /// Whether `point` lies inside `[0, width] × [0, height]`.
    #[inline]
    pub fn contains(self, point: Vec2) -> bool {
        (0.0..=self.width_f64()).contains(&point.x) && (0.0..=self.height_f64()).contains(&point.y)
    }
}

#[inline]
fn scaled_dimension(value: f64, factor: f64) -> u32 {
    let scaled = (value * factor).round();
    if scaled.is_finite() && scaled > 0.0 {
        scaled.min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}

#[inline]
fn normalize_axis(value: f64, extent: f64) -> f64 {
    if !(extent.is_finite() && extent > 0.0) || !value.is_finite() {
        return 0.5;
    }
    (value / extent).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn surface_size_scales_and_rounds() {
        let vp = Viewport::new(800.4, 600.6);
        assert_eq!(vp.surface_size(1.0), SurfaceSize::new(800, 601));
        assert_eq!(vp.surface_size(2.0), SurfaceSize::new(1601, 1201));
    }

    #[test]
    fn surface_size_rejects_garbage() {
        assert_eq!(
            Viewport::new(-5.0, f64::NAN).surface_size(1.0),
            SurfaceSize::new(0, 0)
        );
        assert!(SurfaceSize::new(0, 10).is_empty());
    }

    #[test]
    fn normalize_clamps_into_unit_square() {
        let vp = Viewport::new(200.0, 100.0);
        assert_eq!(vp.normalize(50.0, 25.0), (0.25, 0.25));
        assert_eq!(vp.normalize(-10.0, 500.0), (0.0, 1.0));
        assert_eq!(Viewport::new(0.0, 0.0).normalize(3.0, 3.0), (0.5, 0.5));
    }

    #[test]
    fn contains_includes_edges() {
        let size = SurfaceSize::new(10, 5);
        assert!(size.contains(Vec2::new(0.0, 0.0)));
        assert!(size.contains(Vec2::new(10.0, 5.0)));
        assert!(!size.contains(Vec2::new(10.01, 5.0)));
        assert!(!size.contains(Vec2::new(-0.01, 1.0)));
    }

    #[test]
    fn polar_vector_has_requested_magnitude() {
        let v = Vec2::from_polar(1.3, 0.25);
        assert!((v.length() - 0.25).abs() < 1e-12);
    }
}
