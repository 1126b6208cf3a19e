//! GPU context wrapper with capability detection.
//!
//! The field program is GLSL ES 3.00 and samples nothing, so the only hard
//! requirement is a GL ES 3 / WebGL2-class context. `GpuContext` records what
//! the driver reported so the host can log it once at startup.

use crate::error::DriverError;

/// Wraps a `glow::Context` with the capabilities the field program cares about.
pub struct GpuContext {
    gl: glow::Context,
    version: String,
    renderer: String,
    max_viewport: (i32, i32),
}

impl GpuContext {
    /// Wraps `gl` and queries its version, renderer and viewport limits.
    ///
    /// # Errors
    ///
    /// Returns `DriverError::Capability` if the context reports an ES/WebGL
    /// major version below 3 or a zero-sized maximum viewport.
    #[allow(unsafe_code)]
    pub fn new(gl: glow::Context) -> Result<Self, DriverError> {
        use glow::HasContext;

        let major = gl.version().major;
        if major < 3 && gl.version().is_embedded {
            return Err(DriverError::Capability(format!(
                "OpenGL ES {major}.x context; 3.0 or newer is required"
            )));
        }

        // SAFETY: plain parameter queries on a live context.
        let (version, renderer, dims) = unsafe {
            let mut dims = [0i32; 2];
            gl.get_parameter_i32_slice(glow::MAX_VIEWPORT_DIMS, &mut dims);
            (
                gl.get_parameter_string(glow::VERSION),
                gl.get_parameter_string(glow::RENDERER),
                dims,
            )
        };
        if dims[0] <= 0 || dims[1] <= 0 {
            return Err(DriverError::Capability(
                "context reports an empty maximum viewport".to_string(),
            ));
        }
        log::info!("GL context: {version} on {renderer}, max viewport {}x{}", dims[0], dims[1]);

        Ok(Self {
            gl,
            version,
            renderer,
            max_viewport: (dims[0], dims[1]),
        })
    }

    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }

    /// `GL_VERSION` as reported by the driver.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// `GL_RENDERER` as reported by the driver.
    pub fn renderer(&self) -> &str {
        &self.renderer
    }

    /// Largest viewport the context accepts.
    pub fn max_viewport(&self) -> (i32, i32) {
        self.max_viewport
    }

    /// Clamps a requested surface size to what the context can draw.
    pub fn clamp_viewport(&self, width: u32, height: u32) -> (u32, u32) {
        clamp_to_limit((width, height), self.max_viewport)
    }
}

fn clamp_to_limit((width, height): (u32, u32), (max_w, max_h): (i32, i32)) -> (u32, u32) {
    let max_w = u32::try_from(max_w).unwrap_or(0);
    let max_h = u32::try_from(max_h).unwrap_or(0);
    (width.min(max_w), height.min(max_h))
}
