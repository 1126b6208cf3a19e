#![cfg(target_arch = "wasm32")]
//! Browser bindings: runs the fireworks effect on a WebGL2 canvas.
//!
//! ```js
//! import init, { WebFireworks } from "./heartworks_wasm.js";
//! await init();
//! const fireworks = new WebFireworks("webgl-canvas");
//! fireworks.start();
//! ```
//!
//! Construction never throws. A missing canvas or a browser without WebGL2
//! yields an instance whose methods do nothing; the reason is logged to the
//! console.

mod host;

pub use host::WebHost;

use heartworks_core::driver::{SurfaceDriver, DEFAULT_TIME_SCALE};
use heartworks_core::error::DriverError;
use heartworks_core::glsl::fragment_shader;
use heartworks_core::render::{GlFieldProgram, GpuContext};
use heartworks_core::FireworkParams;
use host::FrameCallback;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlCanvasElement, MouseEvent, WebGl2RenderingContext, Window};

type Driver = SurfaceDriver<GlFieldProgram, WebHost>;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
}

/// One fireworks effect bound to one canvas.
#[wasm_bindgen]
pub struct WebFireworks {
    driver: Option<Rc<RefCell<Driver>>>,
}

#[wasm_bindgen]
impl WebFireworks {
    /// Binds to the canvas with id `canvas_id` using default parameters.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str) -> WebFireworks {
        Self::with_params(canvas_id, "{}")
    }

    /// Binds to `canvas_id` with parameter overrides given as a JSON object.
    /// Malformed or invalid parameters fall back to the defaults.
    #[wasm_bindgen(js_name = withParams)]
    pub fn with_params(canvas_id: &str, params_json: &str) -> WebFireworks {
        let driver = match build_driver(canvas_id, params_json) {
            Ok(driver) => Some(driver),
            Err(e) => {
                log::error!("{e}");
                None
            }
        };
        WebFireworks { driver }
    }

    /// Shows the canvas and starts the animation loop.
    pub fn start(&self) {
        self.with_driver(Driver::start);
    }

    /// Hides the canvas and cancels the pending frame.
    pub fn stop(&self) {
        self.with_driver(Driver::stop);
    }

    pub fn toggle(&self) {
        self.with_driver(Driver::toggle);
    }

    /// Resizes the canvas to the window. Also runs on every window resize.
    pub fn resize(&self) {
        self.with_driver(Driver::resize);
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.inspect(Driver::is_running)
    }

    #[wasm_bindgen(js_name = isEnabled)]
    pub fn is_enabled(&self) -> bool {
        self.inspect(Driver::is_enabled)
    }
}

impl WebFireworks {
    fn with_driver(&self, f: impl FnOnce(&mut Driver)) {
        if let Some(driver) = &self.driver {
            with_weak(&Rc::downgrade(driver), f);
        }
    }

    fn inspect(&self, f: impl FnOnce(&Driver) -> bool) -> bool {
        self.driver
            .as_ref()
            .and_then(|d| d.try_borrow().ok().map(|d| f(&*d)))
            .unwrap_or(false)
    }
}

impl Drop for WebFireworks {
    fn drop(&mut self) {
        // A frame left scheduled would call into a freed closure.
        self.with_driver(Driver::stop);
    }
}

/// Runs `f` on the driver if it is still alive and not already borrowed.
fn with_weak(driver: &Weak<RefCell<Driver>>, f: impl FnOnce(&mut Driver)) {
    let Some(driver) = driver.upgrade() else {
        return;
    };
    match driver.try_borrow_mut() {
        Ok(mut d) => f(&mut *d),
        Err(_) => log::debug!("driver busy; event dropped"),
    };
}

fn build_driver(canvas_id: &str, params_json: &str) -> Result<Rc<RefCell<Driver>>, DriverError> {
    let window = web_sys::window().ok_or_else(|| DriverError::SurfaceMissing("no window".into()))?;
    let canvas = window
        .document()
        .and_then(|doc| doc.get_element_by_id(canvas_id))
        .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        .ok_or_else(|| DriverError::SurfaceMissing(format!("#{canvas_id}")))?;

    let frame_callback: FrameCallback = Rc::new(RefCell::new(None));
    let host = WebHost::new(window.clone(), canvas.clone(), frame_callback.clone());
    let mut driver = SurfaceDriver::initialize_with(host, acquire_device(&canvas), DEFAULT_TIME_SCALE);
    if driver.is_enabled() {
        // A build failure is logged and disables the driver; nothing else to do.
        let _ = driver.compile_field(&fragment_shader(&load_params(params_json)));
    }
    let driver = Rc::new(RefCell::new(driver));

    if driver.borrow().is_enabled() {
        let weak = Rc::downgrade(&driver);
        *frame_callback.borrow_mut() = Some(Closure::wrap(Box::new(move |timestamp: f64| {
            with_weak(&weak, |d| d.on_frame(timestamp));
        }) as Box<dyn FnMut(f64)>));
        install_listeners(&window, &canvas, &driver)?;
    }
    Ok(driver)
}

fn acquire_device(canvas: &HtmlCanvasElement) -> Result<GlFieldProgram, DriverError> {
    let webgl2 = canvas
        .get_context("webgl2")
        .ok()
        .flatten()
        .and_then(|ctx| ctx.dyn_into::<WebGl2RenderingContext>().ok())
        .ok_or_else(|| DriverError::Capability("WebGL 2 not supported".into()))?;
    let gl = glow::Context::from_webgl2_context(webgl2);
    GlFieldProgram::new(GpuContext::new(gl)?)
}

fn load_params(params_json: &str) -> FireworkParams {
    let params = match serde_json::from_str(params_json) {
        Ok(value) => FireworkParams::from_json(&value),
        Err(e) => {
            log::warn!("ignoring malformed fireworks params: {e}");
            return FireworkParams::default();
        }
    };
    match params.validate() {
        Ok(()) => params,
        Err(e) => {
            log::warn!("{e}; using default fireworks params");
            FireworkParams::default()
        }
    }
}

fn install_listeners(
    window: &Window,
    canvas: &HtmlCanvasElement,
    driver: &Rc<RefCell<Driver>>,
) -> Result<(), DriverError> {
    let listen_err = |e: JsValue| DriverError::Device(format!("addEventListener failed: {e:?}"));

    let weak = Rc::downgrade(driver);
    let on_resize = Closure::wrap(Box::new(move || {
        with_weak(&weak, Driver::resize);
    }) as Box<dyn FnMut()>);
    window
        .add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())
        .map_err(listen_err)?;
    on_resize.forget();

    let weak = Rc::downgrade(driver);
    let target = canvas.clone();
    let on_move = Closure::wrap(Box::new(move |event: MouseEvent| {
        let rect = target.get_bounding_client_rect();
        with_weak(&weak, |d| {
            d.pointer_moved(
                f64::from(event.client_x()),
                f64::from(event.client_y()),
                rect.left(),
                rect.top(),
            )
        });
    }) as Box<dyn FnMut(MouseEvent)>);
    canvas
        .add_event_listener_with_callback("mousemove", on_move.as_ref().unchecked_ref())
        .map_err(listen_err)?;
    on_move.forget();

    let weak = Rc::downgrade(driver);
    let on_down = Closure::wrap(Box::new(move || {
        with_weak(&weak, Driver::pointer_pressed);
    }) as Box<dyn FnMut()>);
    canvas
        .add_event_listener_with_callback("mousedown", on_down.as_ref().unchecked_ref())
        .map_err(listen_err)?;
    on_down.forget();

    let weak = Rc::downgrade(driver);
    let on_up = Closure::wrap(Box::new(move || {
        with_weak(&weak, Driver::pointer_released);
    }) as Box<dyn FnMut()>);
    canvas
        .add_event_listener_with_callback("mouseup", on_up.as_ref().unchecked_ref())
        .map_err(listen_err)?;
    on_up.forget();

    Ok(())
}
