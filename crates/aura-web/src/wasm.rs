#![forbid(unsafe_code)]

use std::cell::RefCell;
use std::rc::Rc;

use aura_motion::host::LayerEvent;
use aura_motion::{MotionConfig, MotionStage};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{CustomEvent, CustomEventInit, MouseEvent, TouchEvent};

use crate::host::{WebCallbacks, WebHost};
use crate::{logging, options};

type SharedStage = Rc<RefCell<MotionStage<WebHost>>>;

/// Ambient particle background drawn behind page content.
///
/// Construction initializes the layer and starts it. Initialization
/// failures do not throw: the page gets the fallback background and an
/// `auraBackgroundError` event. Only malformed options throw.
#[wasm_bindgen]
pub struct AuraBackground {
    stage: SharedStage,
    callbacks: Rc<WebCallbacks>,
}

#[wasm_bindgen]
impl AuraBackground {
    #[wasm_bindgen(constructor)]
    pub fn new(options: Option<JsValue>) -> Result<AuraBackground, JsValue> {
        logging::init();
        let config = read_options(options)?;
        let callbacks = Rc::new(WebCallbacks::default());
        let stage = Rc::new(RefCell::new(MotionStage::new(WebHost::new(Rc::clone(
            &callbacks,
        )))));
        install_callbacks(&stage, &callbacks);

        let this = Self { stage, callbacks };
        this.launch(config);
        Ok(this)
    }

    /// Begin animating (or draw the static frame under reduced motion).
    pub fn start(&self) {
        drive(&self.stage, &self.callbacks, MotionStage::start);
    }

    pub fn stop(&self) {
        drive(&self.stage, &self.callbacks, MotionStage::stop);
    }

    /// Apply the current viewport immediately, bypassing the debounce.
    pub fn resize(&self) {
        self.callbacks.clear_timer();
        drive(&self.stage, &self.callbacks, |stage| {
            if !stage.flush_resize() {
                stage.layer_mut().on_resize();
            }
        });
    }

    /// Re-run initialization with new options, then start.
    pub fn reinitialize(&self, options: Option<JsValue>) -> Result<(), JsValue> {
        let config = read_options(options)?;
        self.launch(config);
        Ok(())
    }

    /// Stop, detach every listener and remove the canvas this instance created.
    pub fn destroy(&self) {
        self.callbacks.clear_timer();
        drive(&self.stage, &self.callbacks, |stage| {
            stage.teardown();
            stage.layer_mut().host_mut().remove_created_surface();
        });
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.stage
            .try_borrow()
            .is_ok_and(|stage| stage.layer().is_running())
    }

    #[wasm_bindgen(js_name = particleCount)]
    pub fn particle_count(&self) -> usize {
        self.stage
            .try_borrow()
            .map(|stage| stage.layer().particles().len())
            .unwrap_or(0)
    }
}

impl Drop for AuraBackground {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl AuraBackground {
    fn launch(&self, config: MotionConfig) {
        drive(&self.stage, &self.callbacks, |stage| {
            if stage.initialize(config).is_ok() {
                stage.start();
            }
        });
    }
}

fn read_options(options: Option<JsValue>) -> Result<MotionConfig, JsValue> {
    let json = match options {
        Some(value) if !value.is_undefined() && !value.is_null() => Some(
            js_sys::JSON::stringify(&value)?
                .as_string()
                .unwrap_or_default(),
        ),
        _ => None,
    };
    options::parse_options(json.as_deref(), || options::seed_from_unit(js_sys::Math::random()))
        .map_err(|err| JsError::new(&err.to_string()).into())
}

/// Run `f` against the stage, then dispatch queued notifications once the
/// borrow is released so page listeners may call back in.
fn drive<F>(stage: &SharedStage, callbacks: &WebCallbacks, f: F)
where
    F: FnOnce(&mut MotionStage<WebHost>),
{
    match stage.try_borrow_mut() {
        Ok(mut stage) => f(&mut stage),
        Err(_) => tracing::warn!("aura background re-entered; call ignored"),
    }
    for event in callbacks.take_events() {
        dispatch(&event);
    }
}

fn dispatch(event: &LayerEvent) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let detail = js_sys::JSON::parse(&options::event_detail_json(event)).unwrap_or(JsValue::NULL);
    let init = CustomEventInit::new();
    init.set_detail(&detail);
    match CustomEvent::new_with_event_init_dict(event.dom_name(), &init) {
        Ok(dom_event) => {
            let _ = window.dispatch_event(&dom_event);
        }
        Err(_) => tracing::warn!(name = event.dom_name(), "could not create DOM event"),
    }
}

fn install_callbacks(stage: &SharedStage, callbacks: &Rc<WebCallbacks>) {
    let (weak_stage, weak_callbacks) = (Rc::downgrade(stage), Rc::downgrade(callbacks));
    let frame = Closure::wrap(Box::new(move |timestamp: f64| {
        let (Some(stage), Some(callbacks)) = (weak_stage.upgrade(), weak_callbacks.upgrade()) else {
            return;
        };
        let Some(handle) = callbacks.fired_frame() else {
            return;
        };
        drive(&stage, &callbacks, |stage| {
            stage.dispatch_frame(handle, options::timestamp(timestamp));
        });
    }) as Box<dyn FnMut(f64)>);

    let (weak_stage, weak_callbacks) = (Rc::downgrade(stage), Rc::downgrade(callbacks));
    let resize = Closure::wrap(Box::new(move || {
        let (Some(stage), Some(callbacks)) = (weak_stage.upgrade(), weak_callbacks.upgrade()) else {
            return;
        };
        drive(&stage, &callbacks, |stage| {
            let host = stage.layer().host();
            let (viewport, now) = (host.viewport(), host.now());
            if let Some(viewport) = viewport
                && let Some(delay) = stage.push_resize(viewport, now)
            {
                callbacks.arm_timer(delay);
            }
        });
    }) as Box<dyn FnMut()>);

    let (weak_stage, weak_callbacks) = (Rc::downgrade(stage), Rc::downgrade(callbacks));
    let debounce = Closure::wrap(Box::new(move || {
        let (Some(stage), Some(callbacks)) = (weak_stage.upgrade(), weak_callbacks.upgrade()) else {
            return;
        };
        callbacks.timer_fired();
        drive(&stage, &callbacks, |stage| {
            let now = stage.layer().host().now();
            stage.tick(now);
            if let Some(delay) = stage.debouncer().time_until_apply(now) {
                callbacks.arm_timer(delay);
            }
        });
    }) as Box<dyn FnMut()>);

    let (weak_stage, weak_callbacks) = (Rc::downgrade(stage), Rc::downgrade(callbacks));
    let mouse = Closure::wrap(Box::new(move |event: MouseEvent| {
        let (Some(stage), Some(callbacks)) = (weak_stage.upgrade(), weak_callbacks.upgrade()) else {
            return;
        };
        drive(&stage, &callbacks, |stage| {
            stage.pointer_moved(f64::from(event.client_x()), f64::from(event.client_y()));
        });
    }) as Box<dyn FnMut(MouseEvent)>);

    let (weak_stage, weak_callbacks) = (Rc::downgrade(stage), Rc::downgrade(callbacks));
    let touch = Closure::wrap(Box::new(move |event: TouchEvent| {
        let (Some(stage), Some(callbacks)) = (weak_stage.upgrade(), weak_callbacks.upgrade()) else {
            return;
        };
        let Some(touch) = event.touches().get(0) else {
            return;
        };
        drive(&stage, &callbacks, |stage| {
            stage.pointer_moved(f64::from(touch.client_x()), f64::from(touch.client_y()));
        });
    }) as Box<dyn FnMut(TouchEvent)>);

    let _ = callbacks.frame.set(frame);
    let _ = callbacks.resize.set(resize);
    let _ = callbacks.debounce.set(debounce);
    let _ = callbacks.mouse.set(mouse);
    let _ = callbacks.touch.set(touch);
}
