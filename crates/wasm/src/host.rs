//! The browser as a [`SurfaceHost`]: window size, canvas display, and
//! `requestAnimationFrame` scheduling.

use heartworks_core::driver::{FrameRequest, SurfaceHost};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{HtmlCanvasElement, Window};

/// Slot holding the frame callback. Filled once the driver it calls into
/// exists; the host only ever borrows it to hand it to the browser.
pub type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// A canvas filling the browser window.
pub struct WebHost {
    window: Window,
    canvas: HtmlCanvasElement,
    frame_callback: FrameCallback,
}

impl WebHost {
    pub fn new(window: Window, canvas: HtmlCanvasElement, frame_callback: FrameCallback) -> Self {
        Self {
            window,
            canvas,
            frame_callback,
        }
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }
}

fn css_pixels(value: Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue>) -> u32 {
    value
        .ok()
        .and_then(|v| v.as_f64())
        .filter(|v| v.is_finite() && *v > 0.0)
        .map_or(0, |v| v as u32)
}

impl SurfaceHost for WebHost {
    fn viewport_size(&self) -> (u32, u32) {
        (
            css_pixels(self.window.inner_width()),
            css_pixels(self.window.inner_height()),
        )
    }

    fn set_surface_size(&mut self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }

    fn set_visible(&mut self, visible: bool) {
        let display = if visible { "block" } else { "none" };
        if let Err(e) = self.canvas.style().set_property("display", display) {
            log::warn!("could not set canvas display to {display}: {e:?}");
        }
    }

    fn request_frame(&mut self) -> Option<FrameRequest> {
        let slot = self.frame_callback.borrow();
        let callback = slot.as_ref()?;
        match self
            .window
            .request_animation_frame(callback.as_ref().unchecked_ref())
        {
            Ok(id) => Some(FrameRequest(id)),
            Err(e) => {
                log::warn!("requestAnimationFrame failed: {e:?}");
                None
            }
        }
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        if let Err(e) = self.window.cancel_animation_frame(request.0) {
            log::warn!("cancelAnimationFrame({}) failed: {e:?}", request.0);
        }
    }
}
