//! Building the field program with glow.
//!
//! Compile and link diagnostics are turned into [`ShaderError`]s whose log
//! carries the offending source with line numbers, since driver logs refer
//! to lines and the fragment shader is generated at runtime.

use crate::error::ShaderError;

/// A programmable pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    /// The GL enum for this stage.
    pub fn gl_type(self) -> u32 {
        match self {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        }
    }
}

/// Prepends right-aligned line numbers to `source` and appends the driver `log`.
///
/// Either part may be empty.
pub fn format_shader_error(source: &str, log: &str) -> String {
    let lines: Vec<&str> = source.lines().collect();
    let width = lines.len().max(1).to_string().len();

    let numbered = lines
        .iter()
        .enumerate()
        .map(|(i, line)| format!("{:>width$}: {line}", i + 1))
        .collect::<Vec<_>>()
        .join("\n");

    match (numbered.is_empty(), log.is_empty()) {
        (true, true) => String::new(),
        (true, false) => log.to_string(),
        (false, true) => numbered,
        (false, false) => format!("{numbered}\n\n{log}"),
    }
}

/// Compiles one stage.
///
/// # Errors
///
/// Returns `ShaderError::CompileError` carrying the numbered source and the
/// driver's info log. The shader object is deleted on failure.
#[allow(unsafe_code)]
pub fn compile_shader(
    gl: &glow::Context,
    stage: ShaderStage,
    source: &str,
) -> Result<glow::Shader, ShaderError> {
    use glow::HasContext;

    let compile_error = |log: String| ShaderError::CompileError {
        stage: stage.name().to_string(),
        log,
    };

    // SAFETY: glow exposes raw GL calls as unsafe. The stage enum is a valid
    // shader type and the handle is deleted on the failure path.
    let shader = unsafe { gl.create_shader(stage.gl_type()).map_err(compile_error)? };

    let compiled = unsafe {
        gl.shader_source(shader, source);
        gl.compile_shader(shader);
        gl.get_shader_compile_status(shader)
    };

    if compiled {
        return Ok(shader);
    }

    let info_log = unsafe {
        let log = gl.get_shader_info_log(shader);
        gl.delete_shader(shader);
        log
    };
    Err(compile_error(format_shader_error(source, &info_log)))
}

/// Compiles both stages and links them into a program.
///
/// Stage objects are always released once linking has been attempted; the
/// program keeps what it needs.
///
/// # Errors
///
/// Returns `ShaderError::CompileError` if either stage fails to compile, or
/// `ShaderError::LinkError` if linking fails.
#[allow(unsafe_code)]
pub fn compile_program(
    gl: &glow::Context,
    vertex_src: &str,
    fragment_src: &str,
) -> Result<glow::Program, ShaderError> {
    use glow::HasContext;

    let vertex = compile_shader(gl, ShaderStage::Vertex, vertex_src)?;
    let fragment = match compile_shader(gl, ShaderStage::Fragment, fragment_src) {
        Ok(f) => f,
        Err(e) => {
            // SAFETY: vertex is a live handle from a successful compile.
            unsafe { gl.delete_shader(vertex) };
            return Err(e);
        }
    };

    // SAFETY: both stage handles are live; they are detached and deleted
    // whatever the link outcome, and the program is deleted on failure.
    unsafe {
        let program = match gl.create_program() {
            Ok(p) => p,
            Err(e) => {
                gl.delete_shader(vertex);
                gl.delete_shader(fragment);
                return Err(ShaderError::LinkError(e));
            }
        };
        gl.attach_shader(program, vertex);
        gl.attach_shader(program, fragment);
        gl.link_program(program);
        gl.detach_shader(program, vertex);
        gl.detach_shader(program, fragment);
        gl.delete_shader(vertex);
        gl.delete_shader(fragment);

        if gl.get_program_link_status(program) {
            Ok(program)
        } else {
            let log = gl.get_program_info_log(program);
            gl.delete_program(program);
            Err(ShaderError::LinkError(log))
        }
    }
}
