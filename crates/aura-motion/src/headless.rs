#![forbid(unsafe_code)]

//! Deterministic in-memory host.
//!
//! [`HeadlessHost`] stands in for a browser window: the test sets the
//! viewport and motion preference, issues frame handles from a counter and
//! records everything the layer asks of it. [`RecordingSurface`] keeps the
//! gradients and circles of the current frame and counts every mutation, and
//! [`DeterministicClock`] supplies timestamps.

use core::time::Duration;

use crate::color::Rgb;
use crate::error::LayerError;
use crate::geometry::{SurfaceSize, Viewport};
use crate::host::{Circle, DrawSurface, FrameHandle, LayerEvent, LinearGradient, MotionHost};

/// Monotonic clock advanced explicitly by the test.
#[derive(Debug, Default, Clone)]
pub struct DeterministicClock {
    now: Duration,
}

impl DeterministicClock {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
        }
    }

    #[inline]
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn set(&mut self, now: Duration) {
        self.now = now;
    }

    /// Advance by `dt` and return the new time.
    pub fn advance(&mut self, dt: Duration) -> Duration {
        self.now = self.now.saturating_add(dt);
        self.now
    }
}

/// Surface that records draw calls.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    selector: String,
    size: SurfaceSize,
    gradients: Vec<LinearGradient>,
    circles: Vec<Circle>,
    clears: u64,
    resizes: u64,
    mutations: u64,
}

impl RecordingSurface {
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            ..Self::default()
        }
    }

    #[inline]
    pub fn selector(&self) -> &str {
        &self.selector
    }

    #[inline]
    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    /// Gradients filled since the last clear.
    #[inline]
    pub fn gradients(&self) -> &[LinearGradient] {
        &self.gradients
    }

    /// Circles drawn since the last clear.
    #[inline]
    pub fn circles(&self) -> &[Circle] {
        &self.circles
    }

    #[inline]
    pub fn clears(&self) -> u64 {
        self.clears
    }

    #[inline]
    pub fn resizes(&self) -> u64 {
        self.resizes
    }

    /// Every call that changed pixels: resizes, clears and fills.
    #[inline]
    pub fn mutations(&self) -> u64 {
        self.mutations
    }
}

impl DrawSurface for RecordingSurface {
    fn set_size(&mut self, size: SurfaceSize) {
        self.size = size;
        self.gradients.clear();
        self.circles.clear();
        self.resizes += 1;
        self.mutations += 1;
    }

    fn clear(&mut self) {
        self.gradients.clear();
        self.circles.clear();
        self.clears += 1;
        self.mutations += 1;
    }

    fn fill_gradient(&mut self, gradient: &LinearGradient) {
        self.gradients.push(gradient.clone());
        self.mutations += 1;
    }

    fn fill_circle(&mut self, circle: &Circle) {
        self.circles.push(*circle);
        self.mutations += 1;
    }
}

/// In-memory [`MotionHost`].
#[derive(Debug, Clone)]
pub struct HeadlessHost {
    viewport: Option<Viewport>,
    reduced_motion: bool,
    surface_failure: Option<LayerError>,
    frame_scheduling: bool,
    next_handle: u64,
    pending: Vec<FrameHandle>,
    requested: u64,
    cancelled: Vec<FrameHandle>,
    listener_attached: bool,
    listener_changes: u64,
    fallback: Option<Rgb>,
    selectors: Vec<String>,
    events: Vec<LayerEvent>,
}

impl HeadlessHost {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport: Some(viewport),
            reduced_motion: false,
            surface_failure: None,
            frame_scheduling: true,
            next_handle: 1,
            pending: Vec::new(),
            requested: 0,
            cancelled: Vec::new(),
            listener_attached: false,
            listener_changes: 0,
            fallback: None,
            selectors: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Host with no window at all.
    #[must_use]
    pub fn detached() -> Self {
        Self {
            viewport: None,
            ..Self::new(Viewport::default())
        }
    }

    #[must_use]
    pub fn with_reduced_motion(mut self, reduced: bool) -> Self {
        self.reduced_motion = reduced;
        self
    }

    /// Make `acquire_surface` fail with `error`.
    #[must_use]
    pub fn with_surface_failure(mut self, error: LayerError) -> Self {
        self.surface_failure = Some(error);
        self
    }

    /// Make `request_frame` return `None`.
    #[must_use]
    pub fn without_frame_scheduling(mut self) -> Self {
        self.frame_scheduling = false;
        self
    }

    pub fn set_viewport(&mut self, viewport: Option<Viewport>) {
        self.viewport = viewport;
    }

    pub fn set_surface_failure(&mut self, error: Option<LayerError>) {
        self.surface_failure = error;
    }

    /// Handles scheduled and not yet cancelled or fired.
    #[inline]
    pub fn pending_frames(&self) -> &[FrameHandle] {
        &self.pending
    }

    /// Total `request_frame` calls that produced a handle.
    #[inline]
    pub fn requested_frames(&self) -> u64 {
        self.requested
    }

    #[inline]
    pub fn cancelled(&self) -> &[FrameHandle] {
        &self.cancelled
    }

    #[inline]
    pub fn resize_listener_attached(&self) -> bool {
        self.listener_attached
    }

    #[inline]
    pub fn listener_changes(&self) -> u64 {
        self.listener_changes
    }

    /// Fallback background currently applied, if any.
    #[inline]
    pub fn fallback(&self) -> Option<Rgb> {
        self.fallback
    }

    /// Selectors passed to `acquire_surface`, in order.
    #[inline]
    pub fn selectors(&self) -> &[String] {
        &self.selectors
    }

    #[inline]
    pub fn events(&self) -> &[LayerEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<LayerEvent> {
        std::mem::take(&mut self.events)
    }

    /// Mark `handle` as fired, as a browser does right before invoking the
    /// callback. Returns whether it was still pending.
    pub fn fire(&mut self, handle: FrameHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|h| *h != handle);
        self.pending.len() != before
    }
}

impl MotionHost for HeadlessHost {
    type Surface = RecordingSurface;

    fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    fn acquire_surface(&mut self, selector: &str) -> Result<Self::Surface, LayerError> {
        self.selectors.push(selector.to_owned());
        if self.viewport.is_none() {
            return Err(LayerError::EnvironmentUnavailable("no document"));
        }
        match self.surface_failure {
            Some(error) => Err(error),
            None => Ok(RecordingSurface::new(selector)),
        }
    }

    fn request_frame(&mut self) -> Option<FrameHandle> {
        if !self.frame_scheduling {
            return None;
        }
        let handle = FrameHandle(self.next_handle);
        self.next_handle += 1;
        self.requested += 1;
        self.pending.push(handle);
        Some(handle)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.pending.retain(|h| *h != handle);
        self.cancelled.push(handle);
    }

    fn set_resize_listener(&mut self, attached: bool) {
        self.listener_attached = attached;
        self.listener_changes += 1;
    }

    fn apply_fallback(&mut self, color: Rgb) {
        self.fallback = Some(color);
    }

    fn clear_fallback(&mut self) {
        self.fallback = None;
    }

    fn notify(&mut self, event: LayerEvent) {
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;
    use crate::geometry::Vec2;
    use pretty_assertions::assert_eq;

    #[test]
    fn clock_advances() {
        let mut clock = DeterministicClock::new();
        assert_eq!(clock.advance(Duration::from_millis(16)), Duration::from_millis(16));
        clock.set(Duration::from_secs(1));
        assert_eq!(clock.now(), Duration::from_secs(1));
    }

    #[test]
    fn handles_are_unique_and_tracked() {
        let mut host = HeadlessHost::new(Viewport::new(1.0, 1.0));
        let a = host.request_frame().unwrap();
        let b = host.request_frame().unwrap();
        assert_ne!(a, b);
        host.cancel_frame(a);
        assert_eq!(host.pending_frames(), &[b]);
        assert!(host.fire(b));
        assert!(!host.fire(b));
    }

    #[test]
    fn surface_failure_is_reported() {
        let mut host = HeadlessHost::new(Viewport::new(1.0, 1.0))
            .with_surface_failure(LayerError::ContextAcquisitionFailure("2d"));
        assert_eq!(
            host.acquire_surface("#x").unwrap_err(),
            LayerError::ContextAcquisitionFailure("2d")
        );
        assert_eq!(host.selectors(), &["#x".to_owned()]);
    }

    #[test]
    fn fallback_can_be_cleared() {
        let mut host = HeadlessHost::new(Viewport::new(1.0, 1.0));
        host.apply_fallback(Rgb::new(1, 2, 3));
        assert_eq!(host.fallback(), Some(Rgb::new(1, 2, 3)));
        host.clear_fallback();
        assert_eq!(host.fallback(), None);
    }

    #[test]
    fn detached_host_has_no_document() {
        let mut host = HeadlessHost::detached();
        assert!(host.viewport().is_none());
        assert!(matches!(
            host.acquire_surface("canvas"),
            Err(LayerError::EnvironmentUnavailable(_))
        ));
    }

    #[test]
    fn recording_surface_counts_mutations() {
        let mut s = RecordingSurface::new("canvas");
        s.set_size(SurfaceSize::new(4, 4));
        s.fill_circle(&Circle {
            center: Vec2::ZERO,
            radius: 1.0,
            color: Rgba::new(Rgb::new(0, 0, 0), 0.5),
            blur: 0.0,
        });
        s.fill_gradient(&LinearGradient {
            start: Vec2::ZERO,
            end: Vec2::new(4.0, 4.0),
            stops: Vec::new(),
            blur: 0.0,
        });
        assert_eq!(s.circles().len(), 1);
        assert_eq!(s.gradients().len(), 1);
        s.clear();
        assert!(s.circles().is_empty());
        assert!(s.gradients().is_empty());
        assert_eq!(s.mutations(), 4);
        assert_eq!(s.resizes(), 1);
    }
}
