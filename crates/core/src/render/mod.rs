//! GL backend for the surface driver.
//!
//! Only available with the `render` feature. Provides shader compilation,
//! context capability checks, and [`GlFieldProgram`], the glow-backed
//! [`FieldDevice`](crate::driver::FieldDevice).
//!
//! - [`context`] -- GPU context wrapper with capability detection.
//! - [`shader`] -- Shader compilation, linking, and error formatting.
//! - [`program`] -- The field program: uniforms, viewport, fullscreen draw.

pub mod context;
pub mod program;
pub mod shader;

pub use context::GpuContext;
pub use program::GlFieldProgram;
pub use shader::{compile_program, compile_shader, format_shader_error, ShaderStage};
