#![forbid(unsafe_code)]

//! The ambient motion layer: a two-state (Stopped / Running) machine that
//! owns the drawing surface and the particle batch.
//!
//! # Lifecycle
//!
//! 1. [`AmbientMotionLayer::new`] samples the reduced-motion preference once.
//! 2. [`AmbientMotionLayer::initialize`] acquires and sizes the surface,
//!    generates the batch and reports `Ready` (or falls back and reports
//!    `Error`).
//! 3. [`AmbientMotionLayer::start`] schedules the first frame callback, or
//!    draws a single static frame under reduced motion.
//! 4. The host calls [`AmbientMotionLayer::on_frame`] with the handle it
//!    issued; each call schedules the next one.
//! 5. [`AmbientMotionLayer::stop`] cancels the pending callback.
//!
//! Applied resizes go through [`AmbientMotionLayer::on_resize`], which
//! regenerates the batch for the new bounds before anything else can draw.

use core::time::Duration;

use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::blob::BlobField;
use crate::color::clamp_unit;
use crate::config::MotionConfig;
use crate::error::LayerError;
use crate::geometry::{SurfaceSize, Vec2};
use crate::host::{DrawSurface, FrameHandle, LayerEvent, LinearGradient, MotionHost};
use crate::pacing::{FramePacer, PaceDecision};
use crate::particle::ParticleBatch;

/// Seed used when the config does not carry one.
pub const DEFAULT_SEED: u64 = 0x00A0_7A5E_ED00;

/// Neutral pointer position (viewport center).
pub const NEUTRAL_POINTER: Vec2 = Vec2::new(0.5, 0.5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayerState {
    #[default]
    Stopped,
    Running,
}

/// Motion preference, fixed for the lifetime of the layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionPreference {
    Full,
    Reduced,
}

/// Result of one frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The handle was not the pending one; nothing happened.
    Stale,
    /// Too soon after the last update; rescheduled without drawing.
    Skipped,
    /// Particles advanced and the surface was redrawn.
    Rendered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayerStats {
    pub frames_rendered: u64,
    pub frames_skipped: u64,
    pub stale_frames: u64,
    pub static_draws: u64,
    pub regenerations: u64,
}

pub struct AmbientMotionLayer<H: MotionHost> {
    host: H,
    config: MotionConfig,
    preference: MotionPreference,
    surface: Option<H::Surface>,
    size: SurfaceSize,
    batch: ParticleBatch,
    gradient: Option<LinearGradient>,
    blobs: Option<BlobField>,
    pointer: Vec2,
    state: LayerState,
    pending: Option<FrameHandle>,
    pacer: FramePacer,
    rng: SmallRng,
    listening: bool,
    stats: LayerStats,
}

impl<H: MotionHost> AmbientMotionLayer<H> {
    /// Wrap `host`. The reduced-motion preference is read here and never again.
    pub fn new(host: H) -> Self {
        let preference = if host.prefers_reduced_motion() {
            MotionPreference::Reduced
        } else {
            MotionPreference::Full
        };
        let config = MotionConfig::default();
        Self {
            host,
            pacer: FramePacer::new(config.min_frame_interval()),
            config,
            preference,
            surface: None,
            size: SurfaceSize::default(),
            batch: ParticleBatch::default(),
            gradient: None,
            blobs: None,
            pointer: NEUTRAL_POINTER,
            state: LayerState::Stopped,
            pending: None,
            rng: SmallRng::seed_from_u64(DEFAULT_SEED),
            listening: false,
            stats: LayerStats::default(),
        }
    }

    /// Acquire the surface and generate the particle field.
    ///
    /// On failure the fallback background is applied, an `Error` event is
    /// emitted and any running frame chain is stopped. The error is returned
    /// for inspection; nothing panics and nothing is retried.
    ///
    /// Calling this again re-initializes in place. A running layer keeps
    /// running on the new field.
    pub fn initialize(&mut self, config: MotionConfig) -> Result<(), LayerError> {
        let config = config.normalized();
        match self.acquire(&config) {
            Ok(()) => {
                crate::info!(
                    particles = self.batch.len(),
                    width = self.size.width,
                    height = self.size.height,
                    reduced_motion = self.motion_reduced(),
                    "aura motion layer initialized"
                );
                self.set_listening(true);
                self.host.clear_fallback();
                self.host.notify(LayerEvent::Ready { success: true });
                if self.state == LayerState::Running {
                    self.resume();
                }
                Ok(())
            }
            Err(reason) => {
                self.fail(&config, reason);
                Err(reason)
            }
        }
    }

    fn acquire(&mut self, config: &MotionConfig) -> Result<(), LayerError> {
        if config.particle_count == 0 {
            return Err(LayerError::InvalidConfig("particle count must be positive"));
        }
        let viewport = self
            .host
            .viewport()
            .ok_or(LayerError::EnvironmentUnavailable("no viewport"))?;
        let mut surface = self.host.acquire_surface(&config.target_element_selector)?;
        let size = viewport.surface_size(config.resolution_factor);
        surface.set_size(size);

        self.rng = SmallRng::seed_from_u64(config.seed.unwrap_or(DEFAULT_SEED));
        self.pacer = FramePacer::new(config.min_frame_interval());
        self.config = config.clone();
        self.surface = Some(surface);
        self.size = size;
        self.pointer = NEUTRAL_POINTER;
        self.regenerate();
        Ok(())
    }

    fn fail(&mut self, config: &MotionConfig, reason: LayerError) {
        crate::error!(kind = reason.kind(), %reason, "aura motion layer failed to initialize");
        self.stop();
        self.surface = None;
        self.batch = ParticleBatch::default();
        self.gradient = None;
        self.blobs = None;
        self.size = SurfaceSize::default();
        self.host.apply_fallback(config.fallback_color);
        self.host.notify(LayerEvent::Error { reason });
    }

    /// Begin animating.
    ///
    /// Idempotent while running. Under reduced motion this draws one static
    /// frame and schedules nothing. Starting before a successful
    /// `initialize` does nothing.
    pub fn start(&mut self) {
        if self.surface.is_none() {
            crate::debug!("start ignored: layer not initialized");
            return;
        }
        if self.state == LayerState::Running {
            return;
        }
        self.state = LayerState::Running;
        self.set_listening(true);
        self.pacer.reset();
        self.resume();
    }

    /// Redraw statically or make sure exactly one frame is pending.
    fn resume(&mut self) {
        if self.motion_reduced() {
            self.draw();
            self.stats.static_draws += 1;
        } else if self.pending.is_none() {
            self.schedule();
        }
    }

    /// Cancel the pending frame and detach the resize listener. Safe to call
    /// in any state.
    pub fn stop(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.host.cancel_frame(handle);
            crate::trace!(%handle, "frame cancelled");
        }
        self.set_listening(false);
        self.state = LayerState::Stopped;
    }

    /// Stop and release the surface. The layer must be initialized again
    /// before it can start.
    pub fn teardown(&mut self) {
        self.stop();
        self.surface = None;
        self.batch = ParticleBatch::default();
        self.gradient = None;
        self.blobs = None;
        self.size = SurfaceSize::default();
    }

    /// Apply the current viewport: resize the surface, regenerate the whole
    /// batch for the new bounds and redraw once.
    ///
    /// Works in both states. When the viewport is gone the previous field is
    /// kept.
    pub fn on_resize(&mut self) {
        if self.surface.is_none() {
            return;
        }
        let Some(viewport) = self.host.viewport() else {
            crate::warn!("resize ignored: viewport unavailable");
            return;
        };
        let size = viewport.surface_size(self.config.resolution_factor);
        if let Some(surface) = self.surface.as_mut() {
            surface.set_size(size);
        }
        self.size = size;
        self.regenerate();
        self.draw();
        crate::debug!(width = size.width, height = size.height, "particle field regenerated");
    }

    /// Host frame callback.
    pub fn on_frame(&mut self, handle: FrameHandle, now: Duration) -> FrameOutcome {
        if self.pending != Some(handle) {
            self.stats.stale_frames += 1;
            crate::trace!(%handle, "stale frame ignored");
            return FrameOutcome::Stale;
        }
        self.pending = None;
        if self.state != LayerState::Running || self.motion_reduced() {
            return FrameOutcome::Stale;
        }

        let outcome = match self.pacer.admit(now) {
            PaceDecision::Skip => {
                self.stats.frames_skipped += 1;
                FrameOutcome::Skipped
            }
            PaceDecision::Update => {
                self.batch.step();
                self.draw();
                self.stats.frames_rendered += 1;
                FrameOutcome::Rendered
            }
        };
        self.schedule();
        outcome
    }

    /// Set the normalized pointer position used by the blob parallax.
    ///
    /// Ignored unless `pointer_parallax` is enabled and motion is permitted.
    /// Returns whether the pointer was updated.
    pub fn set_pointer(&mut self, x: f64, y: f64) -> bool {
        if !self.config.pointer_parallax || self.motion_reduced() {
            return false;
        }
        self.pointer = Vec2::new(clamp_unit(x), clamp_unit(y));
        true
    }

    /// [`set_pointer`](Self::set_pointer) from client (CSS pixel) coordinates.
    pub fn pointer_moved(&mut self, client_x: f64, client_y: f64) -> bool {
        let Some(viewport) = self.host.viewport() else {
            return false;
        };
        let (x, y) = viewport.normalize(client_x, client_y);
        self.set_pointer(x, y)
    }

    fn regenerate(&mut self) {
        self.batch = ParticleBatch::generate(&self.config, self.size, &mut self.rng);
        self.gradient = self.config.gradient.as_ref().map(|g| g.layout(self.size));
        self.blobs = self
            .config
            .blobs
            .as_ref()
            .map(|blobs| BlobField::generate(blobs, &mut self.rng));
        self.stats.regenerations += 1;
    }

    fn draw(&mut self) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        surface.clear();
        if let Some(gradient) = &self.gradient {
            surface.fill_gradient(gradient);
        }
        if let Some(blobs) = &self.blobs {
            blobs.draw(surface, self.size, self.pointer);
        }
        self.batch.draw(surface);
    }

    fn schedule(&mut self) {
        match self.host.request_frame() {
            Some(handle) => self.pending = Some(handle),
            None => {
                crate::warn!("host refused to schedule a frame");
            }
        }
    }

    fn set_listening(&mut self, attached: bool) {
        if self.listening != attached {
            self.host.set_resize_listener(attached);
            self.listening = attached;
        }
    }

    #[inline]
    fn motion_reduced(&self) -> bool {
        self.preference == MotionPreference::Reduced
    }

    #[inline]
    pub fn state(&self) -> LayerState {
        self.state
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.state == LayerState::Running
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.surface.is_some()
    }

    #[inline]
    pub fn motion_preference(&self) -> MotionPreference {
        self.preference
    }

    #[inline]
    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    #[inline]
    pub fn particles(&self) -> &ParticleBatch {
        &self.batch
    }

    /// Gradient geometry for the current surface size.
    #[inline]
    pub fn gradient(&self) -> Option<&LinearGradient> {
        self.gradient.as_ref()
    }

    #[inline]
    pub fn blob_field(&self) -> Option<&BlobField> {
        self.blobs.as_ref()
    }

    #[inline]
    pub fn surface_size(&self) -> SurfaceSize {
        self.size
    }

    #[inline]
    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    /// Handle of the one scheduled frame callback, if any.
    #[inline]
    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending
    }

    #[inline]
    pub fn is_listening(&self) -> bool {
        self.listening
    }

    #[inline]
    pub fn surface(&self) -> Option<&H::Surface> {
        self.surface.as_ref()
    }

    #[inline]
    pub fn host(&self) -> &H {
        &self.host
    }

    #[inline]
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    #[inline]
    pub fn stats(&self) -> LayerStats {
        self.stats
    }
}

impl<H: MotionHost + core::fmt::Debug> core::fmt::Debug for AmbientMotionLayer<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AmbientMotionLayer")
            .field("host", &self.host)
            .field("state", &self.state)
            .field("preference", &self.preference)
            .field("size", &self.size)
            .field("particles", &self.batch.len())
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}
