//! Error types for the heartworks core.

use thiserror::Error;

/// Errors produced by parameter validation, scene handling and snapshots.
#[derive(Debug, Error)]
pub enum FireworksError {
    /// Width or height was zero (or their product overflowed) for a frame or scene.
    #[error("invalid dimensions: width and height must be non-zero")]
    InvalidDimensions,

    /// A parameter value was present but unusable.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParam { name: String, reason: String },

    /// Writing or reading a file failed.
    #[error("i/o error: {0}")]
    Io(String),
}

/// Errors that can occur during shader compilation or program linking.
#[derive(Debug, Clone, Error)]
pub enum ShaderError {
    /// A shader stage failed to compile.
    #[error("shader compile error ({stage}):\n{log}")]
    CompileError {
        /// The shader stage that failed (e.g. "vertex", "fragment").
        stage: String,
        /// The driver's info log, prefixed by the numbered source.
        log: String,
    },
    /// A program failed to link.
    #[error("shader link error:\n{0}")]
    LinkError(String),
}

/// Failures of the surface driver. All of them are terminal for the
/// driver instance that reports them.
#[derive(Debug, Clone, Error)]
pub enum DriverError {
    /// The host cannot provide the required graphics context.
    #[error("graphics context unavailable: {0}")]
    Capability(String),

    /// The target surface could not be located.
    #[error("surface not found: {0}")]
    SurfaceMissing(String),

    /// The field program failed to build.
    #[error(transparent)]
    Shader(#[from] ShaderError),

    /// The device rejected a resource allocation (vertex array, program object).
    #[error("device error: {0}")]
    Device(String),

    /// The driver was disabled by an earlier failure.
    #[error("effect is disabled")]
    Disabled,
}
