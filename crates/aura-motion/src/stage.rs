#![forbid(unsafe_code)]

//! Host-driven runner tying the layer to a resize debouncer.
//!
//! [`MotionStage`] is what an embedding event loop talks to. The host:
//!
//! 1. Forwards raw viewport changes via [`MotionStage::push_resize`] and
//!    arms a timer for the returned delay.
//! 2. Calls [`MotionStage::tick`] when that timer fires.
//! 3. Calls [`MotionStage::dispatch_frame`] from its display-refresh
//!    callback with the handle that callback was scheduled under.
//!
//! No threads, no blocking, no wall clock: every timestamp comes from the
//! host.

use core::time::Duration;

use crate::config::MotionConfig;
use crate::debounce::{DebounceAction, DebounceConfig, ResizeDebouncer};
use crate::error::LayerError;
use crate::geometry::Viewport;
use crate::host::{FrameHandle, MotionHost};
use crate::layer::{AmbientMotionLayer, FrameOutcome};

pub struct MotionStage<H: MotionHost> {
    layer: AmbientMotionLayer<H>,
    debouncer: ResizeDebouncer,
}

impl<H: MotionHost> MotionStage<H> {
    pub fn new(host: H) -> Self {
        let delay = MotionConfig::default().resize_debounce();
        Self {
            layer: AmbientMotionLayer::new(host),
            debouncer: ResizeDebouncer::new(DebounceConfig::default().with_delay(delay)),
        }
    }

    /// Initialize the layer and reset the debouncer to the config's quiet
    /// period. A pending resize is dropped: initialization already reads the
    /// current viewport.
    pub fn initialize(&mut self, config: MotionConfig) -> Result<(), LayerError> {
        let debounce = DebounceConfig {
            delay: config.resize_debounce(),
            max_wait: self.debouncer.config().max_wait,
        };
        let mut debouncer = ResizeDebouncer::new(debounce);
        if let Some(viewport) = self.layer.host().viewport() {
            debouncer = debouncer.with_last_applied(viewport);
        }
        self.debouncer = debouncer;
        self.layer.initialize(config)
    }

    /// Force an apply after `max_wait` of continuous resizing.
    #[must_use]
    pub fn with_max_resize_wait(mut self, max_wait: Duration) -> Self {
        let config = self.debouncer.config().with_max_wait(max_wait);
        self.debouncer = ResizeDebouncer::new(config);
        self
    }

    #[inline]
    pub fn start(&mut self) {
        self.layer.start();
    }

    #[inline]
    pub fn stop(&mut self) {
        self.layer.stop();
    }

    /// Record a viewport change. Returns how long the host should wait
    /// before calling [`tick`](Self::tick), or `None` when nothing is pending.
    pub fn push_resize(&mut self, viewport: Viewport, now: Duration) -> Option<Duration> {
        if let DebounceAction::Apply { .. } = self.debouncer.handle_resize_at(viewport, now) {
            self.layer.on_resize();
        }
        self.debouncer.time_until_apply(now)
    }

    /// Apply a settled resize. Returns whether one was applied.
    pub fn tick(&mut self, now: Duration) -> bool {
        match self.debouncer.tick_at(now) {
            DebounceAction::Apply { .. } => {
                crate::debug!(applies = self.debouncer.stats().applies, "resize applied");
                self.layer.on_resize();
                true
            }
            DebounceAction::None | DebounceAction::Pending => false,
        }
    }

    /// Apply any pending resize right away.
    pub fn flush_resize(&mut self) -> bool {
        if !self.debouncer.has_pending() {
            return false;
        }
        self.debouncer.cancel();
        if let Some(viewport) = self.layer.host().viewport() {
            self.debouncer.record_external_apply(viewport);
        }
        self.layer.on_resize();
        true
    }

    /// Deliver the callback scheduled under `handle`. Handles that are no
    /// longer pending are ignored as stale.
    #[inline]
    pub fn dispatch_frame(&mut self, handle: FrameHandle, now: Duration) -> FrameOutcome {
        self.layer.on_frame(handle, now)
    }

    /// Run whatever frame is pending at `now`, for hosts that cannot tell
    /// which of their callbacks fired. Skips the stale-handle check.
    pub fn frame(&mut self, now: Duration) -> FrameOutcome {
        match self.layer.pending_frame() {
            Some(handle) => self.layer.on_frame(handle, now),
            None => FrameOutcome::Stale,
        }
    }

    #[inline]
    pub fn set_pointer(&mut self, x: f64, y: f64) -> bool {
        self.layer.set_pointer(x, y)
    }

    #[inline]
    pub fn pointer_moved(&mut self, client_x: f64, client_y: f64) -> bool {
        self.layer.pointer_moved(client_x, client_y)
    }

    /// Stop, drop any pending resize and release the surface.
    pub fn teardown(&mut self) {
        self.debouncer.cancel();
        self.layer.teardown();
    }

    #[inline]
    pub fn layer(&self) -> &AmbientMotionLayer<H> {
        &self.layer
    }

    #[inline]
    pub fn layer_mut(&mut self) -> &mut AmbientMotionLayer<H> {
        &mut self.layer
    }

    #[inline]
    pub fn debouncer(&self) -> &ResizeDebouncer {
        &self.debouncer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::SurfaceSize;
    use crate::headless::{DeterministicClock, HeadlessHost};

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn stage() -> MotionStage<HeadlessHost> {
        let mut stage = MotionStage::new(HeadlessHost::new(Viewport::new(800.0, 600.0)));
        stage.initialize(MotionConfig::default().with_seed(1)).unwrap();
        stage
    }

    #[test]
    fn push_resize_reports_wakeup_delay() {
        let mut stage = stage();
        stage.layer_mut().host_mut().set_viewport(Some(Viewport::new(400.0, 300.0)));
        assert_eq!(stage.push_resize(Viewport::new(400.0, 300.0), ms(10)), Some(ms(150)));
        assert!(!stage.tick(ms(100)));
        assert!(stage.tick(ms(160)));
        assert_eq!(stage.layer().surface_size(), SurfaceSize::new(400, 300));
    }

    #[test]
    fn identical_viewport_is_ignored() {
        let mut stage = stage();
        assert_eq!(stage.push_resize(Viewport::new(800.0, 600.0), ms(0)), None);
        assert!(!stage.tick(ms(1_000)));
        assert_eq!(stage.layer().stats().regenerations, 1);
    }

    #[test]
    fn frame_drives_pending_handle() {
        let mut stage = stage();
        let mut clock = DeterministicClock::new();
        assert_eq!(stage.frame(clock.now()), FrameOutcome::Stale);
        stage.start();
        for _ in 0..5 {
            let now = clock.advance(ms(16));
            assert_eq!(stage.frame(now), FrameOutcome::Rendered);
        }
        assert_eq!(stage.layer().stats().frames_rendered, 5);
    }

    #[test]
    fn dispatch_frame_rejects_superseded_handle() {
        let mut stage = stage();
        stage.start();
        let old = stage.layer().pending_frame().unwrap();
        stage.stop();
        stage.start();
        let current = stage.layer().pending_frame().unwrap();

        let mutations = stage.layer().surface().unwrap().mutations();
        assert_eq!(stage.dispatch_frame(old, ms(16)), FrameOutcome::Stale);
        assert_eq!(stage.layer().surface().unwrap().mutations(), mutations);
        assert_eq!(stage.layer().pending_frame(), Some(current));
        assert_eq!(stage.dispatch_frame(current, ms(16)), FrameOutcome::Rendered);
    }

    #[test]
    fn flush_applies_immediately() {
        let mut stage = stage();
        stage.layer_mut().host_mut().set_viewport(Some(Viewport::new(300.0, 200.0)));
        stage.push_resize(Viewport::new(300.0, 200.0), ms(0));
        assert!(stage.flush_resize());
        assert_eq!(stage.layer().surface_size(), SurfaceSize::new(300, 200));
        assert!(!stage.tick(ms(500)));
        assert!(!stage.flush_resize());
    }

    #[test]
    fn max_wait_applies_during_drag() {
        let mut stage = MotionStage::new(HeadlessHost::new(Viewport::new(800.0, 600.0)))
            .with_max_resize_wait(ms(100));
        stage.initialize(MotionConfig::default()).unwrap();
        let mut applied_at = None;
        for i in 0..20u64 {
            let v = Viewport::new(799.0 - i as f64, 600.0);
            stage.layer_mut().host_mut().set_viewport(Some(v));
            stage.push_resize(v, ms(i * 10));
            if stage.layer().stats().regenerations > 1 {
                applied_at = Some(i);
                break;
            }
        }
        assert_eq!(applied_at, Some(10));
    }
}
