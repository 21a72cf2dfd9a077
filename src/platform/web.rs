//! Browser bindings
//!
//! Each exported `init_*` looks up its canvas by id and returns `None` when
//! it is missing. Sessions live in `Rc<RefCell<_>>` shared between DOM
//! listeners and the animation frame callback; listener closures are leaked
//! with `forget` for the lifetime of the page. Signals reach the host as
//! JSON strings through an optional JS callback.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use glam::Vec2;
use wasm_bindgen::Clamped;
use wasm_bindgen::prelude::*;
use web_sys::{
    CanvasRenderingContext2d, HtmlCanvasElement, HtmlInputElement, ImageData, KeyboardEvent,
    MouseEvent,
};

use crate::api::{self, DeflectionSession, InterferenceSession, OrbitSession};
use crate::catalog::MaterialProfile;
use crate::consts;
use crate::controls::{NavKey, ORB_SIZE, RotationOrb, Signal};
use crate::renderer::{OrbitDiagramParams, PixelBuffer, render_cross_section, render_lidar};
use crate::settings::Settings;
use crate::sim::{FrameHost, TickControl};

/// Console logging and panic messages, once per page
fn init_logging() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}

fn document() -> Option<web_sys::Document> {
    web_sys::window().and_then(|w| w.document())
}

fn canvas_by_id(id: &str) -> Option<HtmlCanvasElement> {
    document()?.get_element_by_id(id)?.dyn_into().ok()
}

/// Blits RGBA buffers onto a 2D canvas
pub struct CanvasPresenter {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasPresenter {
    /// Sizes the canvas to `width × height` and turns smoothing off
    pub fn new(canvas: HtmlCanvasElement, width: u32, height: u32) -> Option<Self> {
        canvas.set_width(width);
        canvas.set_height(height);
        let ctx: CanvasRenderingContext2d = canvas.get_context("2d").ok()??.dyn_into().ok()?;
        ctx.set_image_smoothing_enabled(false);
        Some(Self { canvas, ctx })
    }

    pub fn from_id(id: &str, width: u32, height: u32) -> Option<Self> {
        let Some(canvas) = canvas_by_id(id) else {
            log::debug!("Canvas #{} not found", id);
            return None;
        };
        Self::new(canvas, width, height)
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    pub fn present(&self, buf: &PixelBuffer) {
        match ImageData::new_with_u8_clamped_array_and_sh(
            Clamped(buf.as_bytes()),
            buf.width(),
            buf.height(),
        ) {
            Ok(image) => {
                if let Err(e) = self.ctx.put_image_data(&image, 0.0, 0.0) {
                    log::warn!("put_image_data failed: {:?}", e);
                }
            }
            Err(e) => log::warn!("ImageData creation failed: {:?}", e),
        }
    }

    /// Pointer position in canvas pixels
    pub fn pointer(&self, event: &MouseEvent) -> Vec2 {
        let client_w = self.canvas.client_width().max(1) as f32;
        let client_h = self.canvas.client_height().max(1) as f32;
        Vec2::new(
            event.offset_x() as f32 * self.canvas.width() as f32 / client_w,
            event.offset_y() as f32 * self.canvas.height() as f32 / client_h,
        )
    }
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// `requestAnimationFrame` as a frame host
///
/// The callback slot is filled after the session exists, since the
/// callback needs the session.
#[derive(Clone, Default)]
pub struct RafHost {
    callback: FrameCallback,
}

impl fmt::Debug for RafHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RafHost")
            .field("armed", &self.callback.borrow().is_some())
            .finish()
    }
}

impl FrameHost for RafHost {
    type Handle = i32;

    fn request_frame(&mut self) -> Option<i32> {
        let window = web_sys::window()?;
        let slot = self.callback.borrow();
        let callback = slot.as_ref()?;
        window
            .request_animation_frame(callback.as_ref().unchecked_ref())
            .ok()
    }

    fn cancel_frame(&mut self, handle: i32) {
        if let Some(window) = web_sys::window() {
            let _ = window.cancel_animation_frame(handle);
        }
    }
}

/// What the shared wiring needs from a game session
trait CanvasSession {
    fn frame(&self) -> &PixelBuffer;
    fn on_frame(&mut self, now_ms: f64) -> TickControl;
    fn drain_signals(&mut self) -> Vec<Signal>;
}

macro_rules! canvas_session {
    ($session:ident) => {
        impl CanvasSession for $session<RafHost> {
            fn frame(&self) -> &PixelBuffer {
                $session::frame(self)
            }

            fn on_frame(&mut self, now_ms: f64) -> TickControl {
                $session::on_frame(self, now_ms)
            }

            fn drain_signals(&mut self) -> Vec<Signal> {
                $session::drain_signals(self)
            }
        }
    };
}

canvas_session!(OrbitSession);
canvas_session!(DeflectionSession);
canvas_session!(InterferenceSession);

/// Forwards signals to the JS callback as JSON
#[derive(Clone, Default)]
struct SignalSink {
    callback: Option<js_sys::Function>,
}

impl SignalSink {
    fn send(&self, signals: Vec<Signal>) {
        let Some(callback) = &self.callback else {
            return;
        };
        for signal in signals {
            match serde_json::to_string(&signal) {
                Ok(json) => {
                    if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
                        log::warn!("Signal callback failed: {:?}", e);
                    }
                }
                Err(e) => log::warn!("Signal encoding failed: {}", e),
            }
        }
    }
}

/// Session plus the canvas it draws to
struct Bound<S> {
    session: Rc<RefCell<S>>,
    presenter: Rc<CanvasPresenter>,
    sink: SignalSink,
}

impl<S> Clone for Bound<S> {
    fn clone(&self) -> Self {
        Self {
            session: self.session.clone(),
            presenter: self.presenter.clone(),
            sink: self.sink.clone(),
        }
    }
}

impl<S: CanvasSession + 'static> Bound<S> {
    /// Arm the frame callback and show the first frame
    fn start(session: S, presenter: CanvasPresenter, host: &RafHost, sink: SignalSink) -> Self {
        let bound = Self {
            session: Rc::new(RefCell::new(session)),
            presenter: Rc::new(presenter),
            sink,
        };
        let on_frame = bound.clone();
        *host.callback.borrow_mut() = Some(Closure::new(move |now: f64| {
            on_frame.with(|session| {
                session.on_frame(now);
            });
        }));
        bound.with(|_| {});
        bound
    }

    /// Run `f` on the session, then present and flush signals
    fn with<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        let (result, signals) = {
            let mut session = self.session.borrow_mut();
            let result = f(&mut *session);
            self.presenter.present(session.frame());
            (result, session.drain_signals())
        };
        self.sink.send(signals);
        result
    }

    /// Listen for a mouse event on the canvas
    fn listen(&self, event: &str, handler: impl Fn(&mut S, Vec2) + 'static) {
        let bound = self.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |e: MouseEvent| {
            let pos = bound.presenter.pointer(&e);
            bound.with(|session| handler(session, pos));
        });
        let _ = self
            .presenter
            .canvas()
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

/// Orbit insertion game handle
#[wasm_bindgen]
pub struct OrbitGameHandle {
    bound: Bound<OrbitSession<RafHost>>,
}

#[wasm_bindgen]
impl OrbitGameHandle {
    pub fn reset(&self) {
        self.bound.with(|s| s.reset());
    }

    #[wasm_bindgen(js_name = currentState)]
    pub fn current_state(&self) -> String {
        self.bound.session.borrow().current_state().as_str().to_string()
    }

    #[wasm_bindgen(js_name = isSuccess)]
    pub fn is_success(&self) -> bool {
        self.bound.session.borrow().is_success()
    }
}

#[wasm_bindgen(js_name = initOrbitGame)]
pub fn init_orbit_game(canvas_id: &str, on_signal: Option<js_sys::Function>) -> Option<OrbitGameHandle> {
    use consts::orbit::{CANVAS_HEIGHT, CANVAS_WIDTH};
    init_logging();
    let presenter = CanvasPresenter::from_id(canvas_id, CANVAS_WIDTH, CANVAS_HEIGHT);
    let target = presenter.is_some().then(|| PixelBuffer::new(CANVAS_WIDTH, CANVAS_HEIGHT));
    let host = RafHost::default();
    let session = api::init_orbit_game(target, host.clone(), &Settings::load())?;
    let bound = Bound::start(session, presenter?, &host, SignalSink { callback: on_signal });

    bound.listen("mousemove", |s, pos| s.pointer_moved(pos));
    bound.listen("click", |s, pos| s.click(pos));
    Some(OrbitGameHandle { bound })
}

/// Ray deflection puzzle handle
#[wasm_bindgen]
pub struct DeflectionGameHandle {
    bound: Bound<DeflectionSession<RafHost>>,
}

#[wasm_bindgen]
impl DeflectionGameHandle {
    pub fn reset(&self) -> Result<(), JsValue> {
        self.bound
            .with(|s| s.reset())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen(js_name = isComplete)]
    pub fn is_complete(&self) -> bool {
        self.bound.session.borrow().is_complete()
    }
}

#[wasm_bindgen(js_name = initDeflectionGame)]
pub fn init_deflection_game(
    canvas_id: &str,
    on_signal: Option<js_sys::Function>,
) -> Result<Option<DeflectionGameHandle>, JsValue> {
    use consts::deflection::{CANVAS_HEIGHT, CANVAS_WIDTH};
    init_logging();
    let presenter = CanvasPresenter::from_id(canvas_id, CANVAS_WIDTH, CANVAS_HEIGHT);
    let target = presenter.is_some().then(|| PixelBuffer::new(CANVAS_WIDTH, CANVAS_HEIGHT));
    let host = RafHost::default();
    let Some(session) = api::init_deflection_game(target, host.clone(), &Settings::load()) else {
        return Ok(None);
    };
    let session = session.map_err(|e| JsValue::from_str(&e.to_string()))?;
    let Some(presenter) = presenter else {
        return Ok(None);
    };
    let bound = Bound::start(session, presenter, &host, SignalSink { callback: on_signal });
    bound.with(|s| s.start());

    bound.listen("mousemove", |s, pos| s.pointer_moved(pos));

    let keys = bound.clone();
    let closure = Closure::<dyn FnMut(_)>::new(move |e: KeyboardEvent| {
        keys.with(|s| {
            if s.key_pressed(&e.key()) {
                e.prevent_default();
            }
        });
    });
    if let Some(doc) = document() {
        let _ = doc.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
    }
    closure.forget();

    Ok(Some(DeflectionGameHandle { bound }))
}

/// Wave interference puzzle handle
#[wasm_bindgen]
pub struct WaveGameHandle {
    bound: Bound<InterferenceSession<RafHost>>,
}

#[wasm_bindgen]
impl WaveGameHandle {
    pub fn reset(&self) {
        self.bound.with(|s| s.reset());
    }

    #[wasm_bindgen(js_name = isComplete)]
    pub fn is_complete(&self) -> bool {
        self.bound.session.borrow().is_complete()
    }
}

#[wasm_bindgen(js_name = initWaveGame)]
pub fn init_wave_game(canvas_id: &str, on_signal: Option<js_sys::Function>) -> Option<WaveGameHandle> {
    use consts::interference::{CANVAS_HEIGHT, CANVAS_WIDTH};
    init_logging();
    let presenter = CanvasPresenter::from_id(canvas_id, CANVAS_WIDTH, CANVAS_HEIGHT);
    let target = presenter.is_some().then(|| PixelBuffer::new(CANVAS_WIDTH, CANVAS_HEIGHT));
    let host = RafHost::default();
    let session = api::init_wave_game(target, host.clone(), &Settings::load())?;
    let bound = Bound::start(session, presenter?, &host, SignalSink { callback: on_signal });

    bound.listen("mousedown", |s, pos| s.pointer_down(pos));
    bound.listen("mousemove", |s, pos| s.pointer_moved(pos));
    bound.listen("mouseup", |s, _| s.pointer_up());
    bound.listen("mouseleave", |s, _| s.pointer_up());
    Some(WaveGameHandle { bound })
}

#[wasm_bindgen(js_name = initLidar)]
pub fn init_lidar(canvas_id: &str, object_id: &str, rx: f32, ry: f32, rz: f32, shape: &str) -> Option<usize> {
    init_logging();
    let size = consts::lidar::CANVAS_SIZE;
    let presenter = CanvasPresenter::from_id(canvas_id, size, size)?;
    let mut buf = PixelBuffer::new(size, size);
    let drawn = api::init_lidar(Some(&mut buf), object_id, rx, ry, rz, shape);
    presenter.present(&buf);
    drawn
}

/// Drag orb steering a LIDAR canvas
#[wasm_bindgen(js_name = initRotationOrb)]
pub fn init_rotation_orb(
    orb_canvas_id: &str,
    lidar_canvas_id: &str,
    object_id: &str,
    shape: &str,
    on_signal: Option<js_sys::Function>,
) -> bool {
    init_logging();
    let Some(orb_view) = CanvasPresenter::from_id(orb_canvas_id, ORB_SIZE, ORB_SIZE) else {
        return false;
    };
    let size = consts::lidar::CANVAS_SIZE;
    let lidar_view = CanvasPresenter::from_id(lidar_canvas_id, size, size);
    let kind = crate::geometry::ShapeKind::from_name(shape);
    log::info!("Rotation orb bound to {}", object_id);

    struct OrbState {
        orb: RotationOrb,
        orb_buf: PixelBuffer,
        lidar_buf: PixelBuffer,
    }
    let state = Rc::new(RefCell::new(OrbState {
        orb: RotationOrb::new(),
        orb_buf: PixelBuffer::new(ORB_SIZE, ORB_SIZE),
        lidar_buf: PixelBuffer::new(size, size),
    }));
    let orb_view = Rc::new(orb_view);
    let lidar_view = Rc::new(lidar_view);
    let sink = SignalSink { callback: on_signal };

    {
        let mut s = state.borrow_mut();
        let OrbState { orb, orb_buf, .. } = &mut *s;
        orb.draw(orb_buf);
        orb_view.present(orb_buf);
    }

    let listen = |event: &str, handler: Box<dyn Fn(&mut OrbState, Vec2) -> Option<Signal>>| {
        let state = state.clone();
        let orb_view = orb_view.clone();
        let lidar_view = lidar_view.clone();
        let sink = sink.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |e: MouseEvent| {
            let pos = orb_view.pointer(&e);
            let mut s = state.borrow_mut();
            let Some(signal) = handler(&mut *s, pos) else {
                return;
            };
            let OrbState {
                orb,
                orb_buf,
                lidar_buf,
            } = &mut *s;
            orb.draw(orb_buf);
            orb_view.present(orb_buf);
            if let Some(view) = &*lidar_view {
                render_lidar(lidar_buf, kind, &orb.rotation);
                view.present(lidar_buf);
            }
            drop(s);
            sink.send(vec![signal]);
        });
        let _ = orb_view
            .canvas()
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
        closure.forget();
    };

    listen(
        "mousedown",
        Box::new(|s: &mut OrbState, pos: Vec2| {
            s.orb.pointer_down(pos);
            None
        }),
    );
    listen(
        "mousemove",
        Box::new(|s: &mut OrbState, pos: Vec2| s.orb.pointer_moved(pos)),
    );
    listen(
        "mouseup",
        Box::new(|s: &mut OrbState, _: Vec2| {
            s.orb.pointer_up();
            None
        }),
    );
    listen(
        "mouseleave",
        Box::new(|s: &mut OrbState, _: Vec2| {
            s.orb.pointer_up();
            None
        }),
    );
    true
}

/// Cross-section canvas driven by a range input
///
/// `attributes_json` is a `MaterialProfile`; missing fields default.
#[wasm_bindgen(js_name = initCrossSectionSlider)]
pub fn init_cross_section_slider(
    canvas_id: &str,
    slider_id: &str,
    shape: &str,
    initial_slice: f32,
    attributes_json: &str,
) -> bool {
    init_logging();
    let size = consts::cross_section::RESOLUTION;
    let Some(presenter) = CanvasPresenter::from_id(canvas_id, size, size) else {
        return false;
    };
    let Some(slider) = document()
        .and_then(|d| d.get_element_by_id(slider_id))
        .and_then(|e| e.dyn_into::<HtmlInputElement>().ok())
    else {
        log::debug!("Slider #{} not found", slider_id);
        return false;
    };

    let profile: MaterialProfile = serde_json::from_str(attributes_json).unwrap_or_else(|e| {
        log::warn!("Bad material attributes, using defaults: {}", e);
        MaterialProfile::default()
    });
    let kind = crate::geometry::ShapeKind::from_name(shape);
    let mut buf = PixelBuffer::new(size, size);
    let mut draw = move |slice: f32| {
        render_cross_section(&mut buf, kind, slice, &profile, &mut rand::rng());
        presenter.present(&buf);
    };

    slider.set_value(&initial_slice.to_string());
    draw(initial_slice);

    let input = slider.clone();
    let closure = Closure::<dyn FnMut(_)>::new(move |_e: web_sys::Event| {
        if let Ok(slice) = input.value().parse::<f32>() {
            draw(slice);
        }
    });
    let _ = slider.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
    closure.forget();
    true
}

/// Orbit diagram from a JSON `OrbitDiagramParams`
#[wasm_bindgen(js_name = generateOrbit)]
pub fn generate_orbit(canvas_id: &str, params_json: &str) -> Result<bool, JsValue> {
    init_logging();
    let params: OrbitDiagramParams =
        serde_json::from_str(params_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let Some(canvas) = canvas_by_id(canvas_id) else {
        return Ok(false);
    };
    let (w, h) = (canvas.width().max(1), canvas.height().max(1));
    let Some(presenter) = CanvasPresenter::new(canvas, w, h) else {
        return Ok(false);
    };
    let mut buf = PixelBuffer::new(w, h);
    api::init_orbit_diagram(Some(&mut buf), &params);
    presenter.present(&buf);
    Ok(true)
}

/// Arrow keys and Enter forwarded as `keyPressed` signals
#[wasm_bindgen(js_name = addKeyboardListener)]
pub fn add_keyboard_listener(on_signal: js_sys::Function) {
    init_logging();
    let sink = SignalSink {
        callback: Some(on_signal),
    };
    let closure = Closure::<dyn FnMut(_)>::new(move |e: KeyboardEvent| {
        if let Some(key) = NavKey::from_key(&e.key()) {
            e.prevent_default();
            sink.send(vec![Signal::KeyPressed { key }]);
        }
    });
    if let Some(doc) = document() {
        let _ = doc.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
    }
    closure.forget();
}
