#![forbid(unsafe_code)]

//! Browser implementation of [`MotionHost`]: canvas lookup, animation frames,
//! window listeners and the page fallback.

use core::f64::consts::TAU;
use core::time::Duration;
use std::cell::{Cell, OnceCell, RefCell};
use std::rc::Rc;

use aura_motion::color::Rgb;
use aura_motion::error::LayerError;
use aura_motion::geometry::{SurfaceSize, Viewport};
use aura_motion::host::{Circle, DrawSurface, FrameHandle, LayerEvent, LinearGradient, MotionHost};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{
    AddEventListenerOptions, CanvasRenderingContext2d, Document, HtmlCanvasElement, MouseEvent,
    TouchEvent, Window,
};

use crate::frames::FrameQueue;
use crate::options;

/// Attribute carried by canvases this crate creates.
pub(crate) const SURFACE_ATTRIBUTE: &str = "data-aura-surface";

const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

const SURFACE_STYLE: [(&str, &str); 6] = [
    ("position", "fixed"),
    ("inset", "0"),
    ("width", "100%"),
    ("height", "100%"),
    ("z-index", "-1"),
    ("pointer-events", "none"),
];

/// JS closures and pending notifications shared by the host and the exported
/// handle. Closures hold weak references back to the stage.
#[derive(Default)]
pub(crate) struct WebCallbacks {
    pub(crate) frame: OnceCell<Closure<dyn FnMut(f64)>>,
    pub(crate) resize: OnceCell<Closure<dyn FnMut()>>,
    pub(crate) debounce: OnceCell<Closure<dyn FnMut()>>,
    pub(crate) mouse: OnceCell<Closure<dyn FnMut(MouseEvent)>>,
    pub(crate) touch: OnceCell<Closure<dyn FnMut(TouchEvent)>>,
    timer: Cell<Option<i32>>,
    frames: RefCell<FrameQueue>,
    outbox: RefCell<Vec<LayerEvent>>,
}

impl WebCallbacks {
    /// (Re)arm the resize debounce timer.
    pub(crate) fn arm_timer(&self, delay: Duration) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(callback) = self.debounce.get() else {
            return;
        };
        self.clear_timer();
        let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        match window.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            millis,
        ) {
            Ok(id) => self.timer.set(Some(id)),
            Err(_) => tracing::warn!("could not arm resize timer"),
        }
    }

    pub(crate) fn clear_timer(&self) {
        if let Some(id) = self.timer.take()
            && let Some(window) = web_sys::window()
        {
            window.clear_timeout_with_handle(id);
        }
    }

    /// Forget the fired timer without clearing it.
    pub(crate) fn timer_fired(&self) {
        self.timer.set(None);
    }

    /// Handle of the animation frame callback that is running.
    pub(crate) fn fired_frame(&self) -> Option<FrameHandle> {
        self.frames.borrow_mut().fired()
    }

    pub(crate) fn take_events(&self) -> Vec<LayerEvent> {
        self.outbox.take()
    }
}

/// [`MotionHost`] backed by `window` and `document`.
pub(crate) struct WebHost {
    window: Option<Window>,
    callbacks: Rc<WebCallbacks>,
    created: Option<HtmlCanvasElement>,
    listening: bool,
    fallback_applied: bool,
}

impl WebHost {
    pub(crate) fn new(callbacks: Rc<WebCallbacks>) -> Self {
        Self {
            window: web_sys::window(),
            callbacks,
            created: None,
            listening: false,
            fallback_applied: false,
        }
    }

    fn document(&self) -> Option<Document> {
        self.window.as_ref()?.document()
    }

    /// `performance.now()` as a duration.
    pub(crate) fn now(&self) -> Duration {
        self.window
            .as_ref()
            .and_then(Window::performance)
            .map(|performance| options::timestamp(performance.now()))
            .unwrap_or_default()
    }

    /// Remove the canvas this host inserted, if any.
    pub(crate) fn remove_created_surface(&mut self) {
        if let Some(canvas) = self.created.take() {
            canvas.remove();
        }
    }

    fn create_canvas(&mut self, document: &Document) -> Result<HtmlCanvasElement, LayerError> {
        let canvas = document
            .create_element("canvas")
            .ok()
            .and_then(|element| element.dyn_into::<HtmlCanvasElement>().ok())
            .ok_or(LayerError::EnvironmentUnavailable("cannot create canvas"))?;
        let _ = canvas.set_attribute(SURFACE_ATTRIBUTE, "");
        self.created = Some(canvas.clone());
        Ok(canvas)
    }

    /// Reuse a matching canvas, give a matching container a canvas child, or
    /// prepend a fresh canvas to `<body>`.
    fn locate_canvas(&mut self, document: &Document, selector: &str) -> Result<HtmlCanvasElement, LayerError> {
        match document.query_selector(selector) {
            Ok(Some(element)) => match element.dyn_into::<HtmlCanvasElement>() {
                Ok(canvas) => Ok(canvas),
                Err(container) => {
                    let canvas = self.create_canvas(document)?;
                    container
                        .append_child(&canvas)
                        .map_err(|_| LayerError::EnvironmentUnavailable("surface container rejected canvas"))?;
                    Ok(canvas)
                }
            },
            Ok(None) | Err(_) => {
                let body = document
                    .body()
                    .ok_or(LayerError::EnvironmentUnavailable("no body"))?;
                let canvas = self.create_canvas(document)?;
                body.prepend_with_node_1(&canvas)
                    .map_err(|_| LayerError::EnvironmentUnavailable("body rejected canvas"))?;
                Ok(canvas)
            }
        }
    }

    fn listen(&self, window: &Window, attach: bool) {
        let target: &web_sys::EventTarget = window.as_ref();
        let callbacks = &self.callbacks;
        let plain: [(&str, Option<&js_sys::Function>); 2] = [
            ("resize", callbacks.resize.get().map(|c| c.as_ref().unchecked_ref())),
            ("mousemove", callbacks.mouse.get().map(|c| c.as_ref().unchecked_ref())),
        ];
        for (kind, callback) in plain {
            let Some(callback) = callback else { continue };
            let _ = if attach {
                target.add_event_listener_with_callback(kind, callback)
            } else {
                target.remove_event_listener_with_callback(kind, callback)
            };
        }
        if let Some(touch) = callbacks.touch.get() {
            let callback: &js_sys::Function = touch.as_ref().unchecked_ref();
            let _ = if attach {
                let passive = AddEventListenerOptions::new();
                passive.set_passive(true);
                target.add_event_listener_with_callback_and_add_event_listener_options(
                    "touchmove",
                    callback,
                    &passive,
                )
            } else {
                target.remove_event_listener_with_callback("touchmove", callback)
            };
        }
    }
}

impl Drop for WebHost {
    fn drop(&mut self) {
        if self.listening
            && let Some(window) = self.window.clone()
        {
            self.listen(&window, false);
        }
    }
}

impl MotionHost for WebHost {
    type Surface = CanvasSurface;

    fn viewport(&self) -> Option<Viewport> {
        let window = self.window.as_ref()?;
        let width = window.inner_width().ok()?.as_f64()?;
        let height = window.inner_height().ok()?.as_f64()?;
        Some(Viewport::new(width, height))
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.window
            .as_ref()
            .and_then(|window| window.match_media(REDUCED_MOTION_QUERY).ok().flatten())
            .is_some_and(|query| query.matches())
    }

    fn acquire_surface(&mut self, selector: &str) -> Result<CanvasSurface, LayerError> {
        let document = self
            .document()
            .ok_or(LayerError::EnvironmentUnavailable("no document"))?;
        self.remove_created_surface();
        let canvas = self.locate_canvas(&document, selector)?;

        let style = canvas.style();
        for (property, value) in SURFACE_STYLE {
            let _ = style.set_property(property, value);
        }
        let _ = canvas.set_attribute("aria-hidden", "true");

        let context = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|context| context.dyn_into::<CanvasRenderingContext2d>().ok());
        match context {
            Some(context) => Ok(CanvasSurface {
                canvas,
                context,
                size: SurfaceSize::default(),
            }),
            None => {
                self.remove_created_surface();
                Err(LayerError::ContextAcquisitionFailure("2d context unavailable"))
            }
        }
    }

    fn request_frame(&mut self) -> Option<FrameHandle> {
        let window = self.window.as_ref()?;
        let callback = self.callbacks.frame.get()?;
        let id = window
            .request_animation_frame(callback.as_ref().unchecked_ref())
            .ok()?;
        let handle = u64::try_from(id).ok().map(FrameHandle)?;
        self.callbacks.frames.borrow_mut().scheduled(handle);
        Some(handle)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.callbacks.frames.borrow_mut().cancelled(handle);
        if let (Some(window), Ok(id)) = (self.window.as_ref(), i32::try_from(handle.id())) {
            let _ = window.cancel_animation_frame(id);
        }
    }

    fn set_resize_listener(&mut self, attached: bool) {
        if self.listening == attached {
            return;
        }
        if let Some(window) = self.window.clone() {
            self.listen(&window, attached);
        }
        self.listening = attached;
        if !attached {
            self.callbacks.clear_timer();
        }
    }

    fn apply_fallback(&mut self, color: Rgb) {
        if let Some(body) = self.document().and_then(|document| document.body()) {
            let _ = body.style().set_property("background", &color.to_hex());
            self.fallback_applied = true;
        }
    }

    fn clear_fallback(&mut self) {
        if !self.fallback_applied {
            return;
        }
        if let Some(body) = self.document().and_then(|document| document.body()) {
            let _ = body.style().remove_property("background");
        }
        self.fallback_applied = false;
    }

    fn notify(&mut self, event: LayerEvent) {
        self.callbacks.outbox.borrow_mut().push(event);
    }
}

/// `<canvas>` with its 2D context.
pub(crate) struct CanvasSurface {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    size: SurfaceSize,
}

impl DrawSurface for CanvasSurface {
    fn set_size(&mut self, size: SurfaceSize) {
        self.canvas.set_width(size.width);
        self.canvas.set_height(size.height);
        self.size = size;
    }

    fn clear(&mut self) {
        self.context
            .clear_rect(0.0, 0.0, self.size.width_f64(), self.size.height_f64());
    }

    fn fill_gradient(&mut self, gradient: &LinearGradient) {
        let fill = self.context.create_linear_gradient(
            gradient.start.x,
            gradient.start.y,
            gradient.end.x,
            gradient.end.y,
        );
        for stop in &gradient.stops {
            if fill.add_color_stop(stop.offset as f32, &stop.color.to_css()).is_err() {
                tracing::warn!(offset = stop.offset, "gradient stop rejected");
            }
        }
        self.context.save();
        if gradient.blur > 0.0 {
            self.context.set_filter(&format!("blur({}px)", gradient.blur));
        }
        self.context.set_fill_style_canvas_gradient(&fill);
        self.context
            .fill_rect(0.0, 0.0, self.size.width_f64(), self.size.height_f64());
        self.context.restore();
    }

    fn fill_circle(&mut self, circle: &Circle) {
        let blurred = circle.blur > 0.0;
        if blurred {
            self.context.save();
            self.context.set_filter(&format!("blur({}px)", circle.blur));
        }
        self.context.begin_path();
        if self
            .context
            .arc(circle.center.x, circle.center.y, circle.radius, 0.0, TAU)
            .is_ok()
        {
            self.context.set_fill_style_str(&circle.color.to_css());
            self.context.fill();
        }
        if blurred {
            self.context.restore();
        }
    }
}
