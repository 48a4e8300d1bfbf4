#![forbid(unsafe_code)]

//! Host abstraction.
//!
//! The layer never touches a document, a timer or a clock directly. The
//! embedding environment implements [`MotionHost`] (locating the surface,
//! scheduling display-refresh callbacks, reporting the viewport) and
//! [`DrawSurface`] (the 2D drawing context), then calls back into the layer
//! with frame handles and timestamps it controls.

use core::fmt;

use crate::color::{Rgb, Rgba};
use crate::error::LayerError;
use crate::geometry::{SurfaceSize, Vec2, Viewport};

/// Opaque identifier of one scheduled frame callback.
///
/// Handles are issued by the host and compared by the layer to discard
/// callbacks that were cancelled but still fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

impl FrameHandle {
    #[inline]
    pub const fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for FrameHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame#{}", self.0)
    }
}

/// Notification emitted by the layer toward the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerEvent {
    /// Initialization finished.
    Ready { success: bool },
    /// Initialization failed; the fallback background was applied.
    Error { reason: LayerError },
}

impl LayerEvent {
    /// DOM event name the web frontend dispatches this as.
    #[must_use]
    pub const fn dom_name(&self) -> &'static str {
        match self {
            Self::Ready { .. } => "auraBackgroundReady",
            Self::Error { .. } => "auraBackgroundError",
        }
    }
}

/// One filled circle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f64,
    pub color: Rgba,
    /// Gaussian blur radius in pixels; `0.0` draws a hard edge.
    pub blur: f64,
}

/// One color stop of a [`LinearGradient`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    /// Position along the gradient line, `0.0..=1.0`.
    pub offset: f64,
    pub color: Rgba,
}

/// Linear gradient covering the whole surface.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradient {
    /// Gradient line endpoints in surface pixels.
    pub start: Vec2,
    pub end: Vec2,
    pub stops: Vec<GradientStop>,
    pub blur: f64,
}

/// 2D drawing context owned by the layer.
pub trait DrawSurface {
    /// Resize the backing store. Resizing clears its contents.
    fn set_size(&mut self, size: SurfaceSize);

    /// Clear the whole surface to transparent.
    fn clear(&mut self);

    /// Fill the whole surface with a linear gradient.
    fn fill_gradient(&mut self, gradient: &LinearGradient);

    /// Fill one circle.
    fn fill_circle(&mut self, circle: &Circle);
}

/// Environment the layer runs in.
pub trait MotionHost {
    type Surface: DrawSurface;

    /// Current viewport in CSS pixels, or `None` when there is no window.
    fn viewport(&self) -> Option<Viewport>;

    /// Whether the user asked for reduced motion.
    fn prefers_reduced_motion(&self) -> bool;

    /// Create or locate the surface named by `selector` and acquire its
    /// drawing context.
    fn acquire_surface(&mut self, selector: &str) -> Result<Self::Surface, LayerError>;

    /// Schedule one display-refresh callback. `None` when the host cannot
    /// schedule frames.
    fn request_frame(&mut self) -> Option<FrameHandle>;

    /// Cancel a previously scheduled callback.
    fn cancel_frame(&mut self, handle: FrameHandle);

    /// Attach or detach the viewport resize listener.
    fn set_resize_listener(&mut self, attached: bool);

    /// Paint a static page background in place of the animation.
    fn apply_fallback(&mut self, color: Rgb);

    /// Remove a background set by [`apply_fallback`](Self::apply_fallback).
    /// Called after every successful initialization.
    fn clear_fallback(&mut self);

    /// Deliver a notification to the page.
    fn notify(&mut self, event: LayerEvent);
}
