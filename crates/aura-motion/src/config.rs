#![forbid(unsafe_code)]

//! Layer configuration.
//!
//! [`MotionConfig`] is a plain data struct: build it with `Default` and the
//! `with_*` builders, or load it from the JSON options object a page passes
//! in (camelCase keys, every key optional). [`MotionConfig::normalized`]
//! turns any deserialized value into one the layer can run without
//! panicking: ranges are ordered, opacities clamped, empty palettes
//! replaced.

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::blob::BlobConfig;
use crate::color::{Rgb, clamp_unit};
use crate::error::ConfigError;
use crate::gradient::GradientConfig;

/// Smallest radius a particle may be drawn with, in surface pixels.
pub const MIN_PARTICLE_RADIUS: f64 = 0.1;

/// Default `target_element_selector`; created surfaces carry this attribute.
pub const DEFAULT_SURFACE_SELECTOR: &str = "[data-aura-surface]";

/// Soft gold used by the site's particle field.
pub const AURA_GOLD: Rgb = Rgb::new(0xFF, 0xD7, 0x00);

/// Off-white page background shown when the layer cannot render.
pub const AURA_FALLBACK: Rgb = Rgb::new(0xF7, 0xF3, 0xEF);

/// Configuration for [`AmbientMotionLayer`](crate::layer::AmbientMotionLayer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MotionConfig {
    /// Number of particles per batch. Must be positive.
    pub particle_count: usize,
    /// `[min, max]` particle radius in surface pixels.
    pub radius_range: [f64; 2],
    /// `[min, max]` particle speed in surface pixels per update.
    pub speed_range: [f64; 2],
    /// Opaque colors assigned to particles by index.
    pub color_palette: Vec<Rgb>,
    /// `[min, max]` particle opacity.
    pub opacity_range: [f64; 2],
    /// Where the host should find (or create) the drawing surface.
    pub target_element_selector: String,
    /// Surface pixels per viewport pixel.
    pub resolution_factor: f64,
    /// Updates closer together than this are skipped (frame pacing).
    pub min_frame_interval_ms: u64,
    /// Quiet period before a burst of resize events is applied.
    pub resize_debounce_ms: u64,
    /// Static background applied when initialization fails.
    pub fallback_color: Rgb,
    /// Let pointer/touch position shift the blob field.
    pub pointer_parallax: bool,
    /// Optional base gradient painted first, under blobs and particles.
    pub gradient: Option<GradientConfig>,
    /// Optional blurred blob field drawn beneath the particles.
    pub blobs: Option<BlobConfig>,
    /// Fixed RNG seed; hosts pick one when absent.
    pub seed: Option<u64>,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            particle_count: 40,
            radius_range: [0.5, 2.0],
            speed_range: [0.05, 0.25],
            color_palette: vec![AURA_GOLD],
            opacity_range: [0.05, 0.12],
            target_element_selector: DEFAULT_SURFACE_SELECTOR.to_owned(),
            resolution_factor: 1.0,
            min_frame_interval_ms: 16,
            resize_debounce_ms: 150,
            fallback_color: AURA_FALLBACK,
            pointer_parallax: false,
            gradient: None,
            blobs: None,
            seed: None,
        }
    }
}

impl MotionConfig {
    /// Parse a JSON options object and normalize it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.normalized())
    }

    /// Serialize to the same camelCase JSON shape `from_json` accepts.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }

    #[must_use]
    pub fn with_particle_count(mut self, count: usize) -> Self {
        self.particle_count = count;
        self
    }

    #[must_use]
    pub fn with_radius_range(mut self, min: f64, max: f64) -> Self {
        self.radius_range = [min, max];
        self
    }

    #[must_use]
    pub fn with_speed_range(mut self, min: f64, max: f64) -> Self {
        self.speed_range = [min, max];
        self
    }

    #[must_use]
    pub fn with_opacity_range(mut self, min: f64, max: f64) -> Self {
        self.opacity_range = [min, max];
        self
    }

    #[must_use]
    pub fn with_palette(mut self, palette: Vec<Rgb>) -> Self {
        self.color_palette = palette;
        self
    }

    /// Replace the palette from hex strings.
    pub fn with_palette_hex(mut self, palette: &[&str]) -> Result<Self, ConfigError> {
        self.color_palette = palette
            .iter()
            .map(|hex| hex.parse::<Rgb>())
            .collect::<Result<_, _>>()?;
        Ok(self)
    }

    #[must_use]
    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.target_element_selector = selector.into();
        self
    }

    #[must_use]
    pub fn with_resolution_factor(mut self, factor: f64) -> Self {
        self.resolution_factor = factor;
        self
    }

    #[must_use]
    pub fn with_pointer_parallax(mut self, enabled: bool) -> Self {
        self.pointer_parallax = enabled;
        self
    }

    #[must_use]
    pub fn with_gradient(mut self, gradient: GradientConfig) -> Self {
        self.gradient = Some(gradient);
        self
    }

    #[must_use]
    pub fn with_blobs(mut self, blobs: BlobConfig) -> Self {
        self.blobs = Some(blobs);
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Minimum interval between particle updates.
    #[inline]
    pub fn min_frame_interval(&self) -> Duration {
        Duration::from_millis(self.min_frame_interval_ms)
    }

    /// Resize debounce quiet period.
    #[inline]
    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }

    /// Return a copy that is safe to run.
    ///
    /// `particle_count` is never changed: a batch always holds exactly the
    /// configured number of particles, and zero is reported by the layer as
    /// [`LayerError::InvalidConfig`](crate::error::LayerError::InvalidConfig).
    #[must_use]
    pub fn normalized(mut self) -> Self {
        let defaults = Self::default();

        let [rmin, rmax] = ordered_range(self.radius_range, defaults.radius_range);
        self.radius_range = [rmin.max(MIN_PARTICLE_RADIUS), rmax.max(MIN_PARTICLE_RADIUS)];

        let [smin, smax] = ordered_range(self.speed_range, defaults.speed_range);
        self.speed_range = [smin.max(0.0), smax.max(0.0)];

        let [omin, omax] = ordered_range(self.opacity_range, defaults.opacity_range);
        self.opacity_range = [clamp_unit(omin), clamp_unit(omax)];

        if self.color_palette.is_empty() {
            self.color_palette = defaults.color_palette;
        }
        if self.target_element_selector.trim().is_empty() {
            self.target_element_selector = defaults.target_element_selector;
        }
        if !(self.resolution_factor.is_finite() && self.resolution_factor > 0.0) {
            self.resolution_factor = defaults.resolution_factor;
        }
        self.gradient = self.gradient.map(GradientConfig::normalized);
        self.blobs = self.blobs.map(BlobConfig::normalized);
        self
    }
}

/// Order a `[min, max]` pair, substituting `fallback` when either end is not finite.
#[inline]
pub(crate) fn ordered_range(range: [f64; 2], fallback: [f64; 2]) -> [f64; 2] {
    let [a, b] = range;
    if !(a.is_finite() && b.is_finite()) {
        return fallback;
    }
    if a <= b { [a, b] } else { [b, a] }
}
