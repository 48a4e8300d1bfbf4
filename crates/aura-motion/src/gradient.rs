#![forbid(unsafe_code)]

//! Soft base gradient painted under the blobs and particles.
//!
//! Angles follow CSS `linear-gradient`: `0` points up, `90` points right,
//! and the gradient line is long enough that the first and last stops land
//! exactly on opposite corners of the surface.

use serde::{Deserialize, Serialize};

use crate::blob::AURA_BLOB_PALETTE;
use crate::color::{Rgb, Rgba};
use crate::geometry::{SurfaceSize, Vec2};
use crate::host::{GradientStop, LinearGradient};

pub const DEFAULT_GRADIENT_ANGLE: f64 = 135.0;

/// Gradient parameters. Stops are spaced evenly over the palette.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GradientConfig {
    /// Direction in degrees.
    pub angle: f64,
    pub palette: Vec<Rgb>,
    /// Blur radius in surface pixels.
    pub blur: f64,
}

impl Default for GradientConfig {
    fn default() -> Self {
        Self {
            angle: DEFAULT_GRADIENT_ANGLE,
            palette: AURA_BLOB_PALETTE.to_vec(),
            // Half the blob blur.
            blur: 21.0,
        }
    }
}

impl GradientConfig {
    #[must_use]
    pub fn with_angle(mut self, degrees: f64) -> Self {
        self.angle = degrees;
        self
    }

    #[must_use]
    pub fn with_palette(mut self, palette: Vec<Rgb>) -> Self {
        self.palette = palette;
        self
    }

    #[must_use]
    pub fn normalized(mut self) -> Self {
        let defaults = Self::default();
        if self.angle.is_finite() {
            self.angle = self.angle.rem_euclid(360.0);
        } else {
            self.angle = defaults.angle;
        }
        if self.palette.is_empty() {
            self.palette = defaults.palette;
        }
        if !(self.blur.is_finite() && self.blur >= 0.0) {
            self.blur = defaults.blur;
        }
        self
    }

    /// Gradient geometry for a surface of `size`.
    pub fn layout(&self, size: SurfaceSize) -> LinearGradient {
        let (w, h) = (size.width_f64(), size.height_f64());
        let (sin, cos) = self.angle.to_radians().sin_cos();
        let (dx, dy) = (sin, -cos);
        let half = ((w * sin).abs() + (h * cos).abs()) / 2.0;
        let (cx, cy) = (w / 2.0, h / 2.0);

        let last = self.palette.len().saturating_sub(1).max(1) as f64;
        let stops = self
            .palette
            .iter()
            .enumerate()
            .map(|(i, &color)| GradientStop {
                offset: i as f64 / last,
                color: Rgba::new(color, 1.0),
            })
            .collect();

        LinearGradient {
            start: Vec2::new(cx - dx * half, cy - dy * half),
            end: Vec2::new(cx + dx * half, cy + dy * half),
            stops,
            blur: self.blur,
        }
    }
}
