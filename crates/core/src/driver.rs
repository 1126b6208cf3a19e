//! The surface driver: lifecycle, resize, pointer tracking and the frame loop.
//!
//! `SurfaceDriver` holds no visual logic. It owns a [`FieldDevice`] (compiles
//! the field program, uploads per-frame inputs, draws) and a [`SurfaceHost`]
//! (viewport size, surface visibility, animation-frame scheduling) and keeps
//! them in step.
//!
//! Failures are terminal and local: a missing device or a program that does
//! not build is logged once and the driver turns into a no-op. Nothing is
//! retried and nothing panics into the host.

use crate::error::DriverError;
use crate::frame::{FrameInputs, PointerState};
use crate::glsl::FULLSCREEN_VERTEX_SHADER;

/// Wall-clock seconds are multiplied by this before reaching the field function.
pub const DEFAULT_TIME_SCALE: f32 = 0.38;

/// A graphics device able to run the field program over a full surface.
pub trait FieldDevice {
    /// Compiles and links the program, replacing any previous one.
    fn build_program(&mut self, vertex_src: &str, fragment_src: &str) -> Result<(), DriverError>;

    /// Sets the drawable area in pixels.
    fn set_viewport(&mut self, width: u32, height: u32);

    /// Writes the frame inputs into the program's uniform slots.
    fn upload_inputs(&mut self, inputs: &FrameInputs);

    /// Issues one draw covering the whole viewport.
    fn draw(&mut self);
}

/// Handle of a scheduled animation frame, as returned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequest(pub i32);

/// The environment the surface lives in.
pub trait SurfaceHost {
    /// Current viewport size in pixels.
    fn viewport_size(&self) -> (u32, u32);

    /// Resizes the drawable surface.
    fn set_surface_size(&mut self, width: u32, height: u32);

    /// Shows or hides the surface.
    fn set_visible(&mut self, visible: bool);

    /// Schedules one call to the frame callback. `None` if the host refused.
    fn request_frame(&mut self) -> Option<FrameRequest>;

    /// Cancels a scheduled frame callback.
    fn cancel_frame(&mut self, request: FrameRequest);
}

/// Lifecycle of a [`SurfaceDriver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// A device is available but no field program has been built yet.
    AwaitingProgram,
    /// The program is built; the loop is not running.
    Ready,
    /// Frames are being drawn.
    Running,
    /// A terminal failure occurred; every call is a no-op.
    Disabled,
}

/// Drives one effect instance on one surface.
pub struct SurfaceDriver<D, H> {
    device: Option<D>,
    host: H,
    state: DriverState,
    pending: Option<FrameRequest>,
    resolution: (u32, u32),
    pointer: PointerState,
    time_scale: f32,
}

impl<D: FieldDevice, H: SurfaceHost> SurfaceDriver<D, H> {
    /// Wraps `host` and the device acquired from it.
    ///
    /// `device` is `None` when the host lacks the required graphics context;
    /// the driver is then permanently disabled. Otherwise the surface is
    /// sized to the viewport right away.
    pub fn initialize(host: H, device: Option<D>, time_scale: f32) -> Self {
        if device.is_none() {
            log::warn!("WebGL 2 not supported; fireworks effect disabled");
        }
        Self::build(host, device, time_scale)
    }

    /// Like [`initialize`](Self::initialize), but takes the outcome of
    /// acquiring the device so the actual failure is what gets logged.
    pub fn initialize_with(host: H, device: Result<D, DriverError>, time_scale: f32) -> Self {
        let device = match device {
            Ok(device) => Some(device),
            Err(e) => {
                log::warn!("{e}; fireworks effect disabled");
                None
            }
        };
        Self::build(host, device, time_scale)
    }

    fn build(host: H, device: Option<D>, time_scale: f32) -> Self {
        let state = if device.is_some() {
            DriverState::AwaitingProgram
        } else {
            DriverState::Disabled
        };
        let mut driver = Self {
            device,
            host,
            state,
            pending: None,
            resolution: (0, 0),
            pointer: PointerState::default(),
            time_scale,
        };
        driver.resize();
        driver
    }

    /// Builds the field program from `fragment_src` and the fullscreen vertex shader.
    ///
    /// A failure is logged with the compiler's diagnostics and disables the
    /// driver for good.
    pub fn compile_field(&mut self, fragment_src: &str) -> Result<(), DriverError> {
        if self.state == DriverState::Disabled {
            return Err(DriverError::Disabled);
        }
        let device = self.device.as_mut().ok_or(DriverError::Disabled)?;
        match device.build_program(FULLSCREEN_VERTEX_SHADER, fragment_src) {
            Ok(()) => {
                if self.state == DriverState::AwaitingProgram {
                    self.state = DriverState::Ready;
                }
                log::debug!("field program built ({} bytes)", fragment_src.len());
                Ok(())
            }
            Err(e) => {
                log::error!("field program failed to build: {e}");
                self.disable();
                Err(e)
            }
        }
    }

    /// Matches the surface and the device viewport to the host viewport.
    pub fn resize(&mut self) {
        if self.state == DriverState::Disabled {
            return;
        }
        let (width, height) = self.host.viewport_size();
        self.host.set_surface_size(width, height);
        if let Some(device) = self.device.as_mut() {
            device.set_viewport(width, height);
        }
        if self.resolution != (width, height) {
            log::debug!("surface resized to {width}x{height}");
        }
        self.resolution = (width, height);
    }

    /// Shows the surface and starts the frame loop. No-op unless ready.
    pub fn start(&mut self) {
        match self.state {
            DriverState::Ready => {
                self.state = DriverState::Running;
                self.host.set_visible(true);
                if self.pending.is_none() {
                    self.pending = self.host.request_frame();
                }
                log::info!("fireworks started");
            }
            DriverState::Running => {}
            DriverState::AwaitingProgram | DriverState::Disabled => {
                log::debug!("start ignored in state {:?}", self.state);
            }
        }
    }

    /// Hides the surface and cancels the pending frame. No-op unless running.
    pub fn stop(&mut self) {
        if self.state != DriverState::Running {
            return;
        }
        self.state = DriverState::Ready;
        self.host.set_visible(false);
        self.cancel_pending();
        log::info!("fireworks stopped");
    }

    pub fn toggle(&mut self) {
        if self.is_running() {
            self.stop();
        } else {
            self.start();
        }
    }

    /// One loop iteration: push inputs, draw, schedule the next frame.
    ///
    /// `elapsed_ms` is the host's frame timestamp in milliseconds.
    pub fn on_frame(&mut self, elapsed_ms: f64) {
        // The request that triggered this call has fired.
        self.pending = None;
        if self.state != DriverState::Running {
            return;
        }
        let inputs = self.frame_inputs(elapsed_ms);
        if let Some(device) = self.device.as_mut() {
            device.upload_inputs(&inputs);
            device.draw();
        }
        self.pending = self.host.request_frame();
    }

    /// The inputs a frame at `elapsed_ms` would receive.
    pub fn frame_inputs(&self, elapsed_ms: f64) -> FrameInputs {
        let time = elapsed_ms * 0.001 * f64::from(self.time_scale);
        FrameInputs::new(self.resolution.0, self.resolution.1, time as f32)
            .with_pointer(self.pointer)
    }

    /// Records a pointer move given in client coordinates, flipping the
    /// vertical axis so `y` grows upwards like `gl_FragCoord`.
    pub fn pointer_moved(&mut self, client_x: f64, client_y: f64, rect_left: f64, rect_top: f64) {
        if self.state == DriverState::Disabled {
            return;
        }
        self.pointer.x = (client_x - rect_left) as f32;
        self.pointer.y = (f64::from(self.resolution.1) - (client_y - rect_top)) as f32;
    }

    pub fn pointer_pressed(&mut self) {
        if self.state != DriverState::Disabled {
            self.pointer.pressed = true;
        }
    }

    pub fn pointer_released(&mut self) {
        if self.state != DriverState::Disabled {
            self.pointer.pressed = false;
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.state != DriverState::Disabled
    }

    pub fn is_running(&self) -> bool {
        self.state == DriverState::Running
    }

    /// Surface size recorded by the last resize.
    pub fn resolution(&self) -> (u32, u32) {
        self.resolution
    }

    pub fn pointer(&self) -> PointerState {
        self.pointer
    }

    pub fn pending_frame(&self) -> Option<FrameRequest> {
        self.pending
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn device(&self) -> Option<&D> {
        self.device.as_ref()
    }

    fn cancel_pending(&mut self) {
        if let Some(request) = self.pending.take() {
            self.host.cancel_frame(request);
        }
    }

    fn disable(&mut self) {
        self.cancel_pending();
        if self.state == DriverState::Running {
            self.host.set_visible(false);
        }
        self.state = DriverState::Disabled;
    }
}
