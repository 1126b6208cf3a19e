//! The field program on a real GL context.
//!
//! `GlFieldProgram` is the glow-backed [`FieldDevice`]: it owns the linked
//! program, its uniform locations and an empty VAO for the attribute-less
//! fullscreen triangle.

use super::context::GpuContext;
use super::shader::compile_program;
use crate::driver::FieldDevice;
use crate::error::DriverError;
use crate::frame::FrameInputs;
use crate::glsl::{POINTER_UNIFORM, RESOLUTION_UNIFORM, TIME_UNIFORM};

#[derive(Default)]
struct UniformSlots {
    resolution: Option<glow::UniformLocation>,
    time: Option<glow::UniformLocation>,
    pointer: Option<glow::UniformLocation>,
}

/// Field program bound to a GL context.
pub struct GlFieldProgram {
    context: GpuContext,
    program: Option<glow::Program>,
    vao: glow::VertexArray,
    uniforms: UniformSlots,
}

impl GlFieldProgram {
    /// Allocates the VAO. The program itself is built by
    /// [`FieldDevice::build_program`].
    ///
    /// # Errors
    ///
    /// Returns `DriverError::Device` if the context cannot create a vertex array.
    #[allow(unsafe_code)]
    pub fn new(context: GpuContext) -> Result<Self, DriverError> {
        use glow::HasContext;

        // SAFETY: object creation on a live context.
        let vao = unsafe { context.gl().create_vertex_array() }.map_err(DriverError::Device)?;
        Ok(Self {
            context,
            program: None,
            vao,
            uniforms: UniformSlots::default(),
        })
    }

}

impl Drop for GlFieldProgram {
    /// Deletes the program and VAO; the context does not clean them up by itself.
    #[allow(unsafe_code)]
    fn drop(&mut self) {
        use glow::HasContext;

        let gl = self.context.gl();
        // SAFETY: handles were created on this context and nothing uses them
        // after drop.
        unsafe {
            if let Some(program) = self.program.take() {
                gl.delete_program(program);
            }
            gl.delete_vertex_array(self.vao);
        }
    }
}

impl FieldDevice for GlFieldProgram {
    #[allow(unsafe_code)]
    fn build_program(&mut self, vertex_src: &str, fragment_src: &str) -> Result<(), DriverError> {
        use glow::HasContext;

        let gl = self.context.gl();
        let program = compile_program(gl, vertex_src, fragment_src)?;

        // SAFETY: `program` was just linked on this context; the replaced one
        // is no longer referenced.
        let uniforms = unsafe {
            if let Some(old) = self.program.replace(program) {
                gl.delete_program(old);
            }
            gl.use_program(Some(program));
            UniformSlots {
                resolution: gl.get_uniform_location(program, RESOLUTION_UNIFORM),
                time: gl.get_uniform_location(program, TIME_UNIFORM),
                pointer: gl.get_uniform_location(program, POINTER_UNIFORM),
            }
        };

        if uniforms.time.is_none() || uniforms.resolution.is_none() {
            log::warn!("field program does not use {TIME_UNIFORM} and {RESOLUTION_UNIFORM}");
        }
        if uniforms.pointer.is_none() {
            // The effect ignores the pointer, so the compiler usually strips it.
            log::debug!("{POINTER_UNIFORM} is inactive in the field program");
        }
        self.uniforms = uniforms;
        Ok(())
    }

    #[allow(unsafe_code)]
    fn set_viewport(&mut self, width: u32, height: u32) {
        use glow::HasContext;

        let (w, h) = self.context.clamp_viewport(width, height);
        // SAFETY: viewport dimensions are clamped to the context limits.
        unsafe { self.context.gl().viewport(0, 0, w as i32, h as i32) };
    }

    #[allow(unsafe_code)]
    fn upload_inputs(&mut self, inputs: &FrameInputs) {
        use glow::HasContext;

        let gl = self.context.gl();
        let r = inputs.resolution;
        let p = inputs.pointer;
        // SAFETY: locations belong to the current program; `None` is a no-op.
        unsafe {
            gl.uniform_3_f32(self.uniforms.resolution.as_ref(), r.x, r.y, r.z);
            gl.uniform_1_f32(self.uniforms.time.as_ref(), inputs.time);
            gl.uniform_4_f32(self.uniforms.pointer.as_ref(), p.x, p.y, p.z, p.w);
        }
    }

    #[allow(unsafe_code)]
    fn draw(&mut self) {
        use glow::HasContext;

        let Some(program) = self.program else {
            return;
        };
        let gl = self.context.gl();
        // SAFETY: program and VAO are live handles on this context.
        unsafe {
            gl.use_program(Some(program));
            gl.bind_vertex_array(Some(self.vao));
            gl.draw_arrays(glow::TRIANGLES, 0, 3);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gl_field_program_is_a_field_device() {
        fn _assert_device<D: FieldDevice>() {}
        _assert_device::<GlFieldProgram>();
    }

    #[test]
    fn gl_objects_are_released_on_drop() {
        assert!(std::mem::needs_drop::<GlFieldProgram>());
    }

    #[test]
    #[ignore = "requires GL context"]
    fn dropping_after_rebuild_deletes_only_live_handles() {
        // Would test: build_program twice, then drop; the first program is
        // deleted at rebuild and the second plus the VAO at drop, with no
        // GL errors reported.
    }

    #[test]
    #[ignore = "requires GL context"]
    fn build_program_resolves_time_and_resolution() {
        // Would test: after build_program with the generated shader,
        // uniforms.time and uniforms.resolution are Some.
    }
}
