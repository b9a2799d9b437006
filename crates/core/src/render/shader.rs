//! Shader compilation and linking helpers.
//!
//! Provides error types, source formatting for debugging, and functions
//! to compile individual shader stages and link them into programs
//! against any [`GlBackend`]. The formatting utilities are pure string
//! processing.

use thiserror::Error;

use super::backend::{GlBackend, ShaderStage};

/// Errors that can occur during shader compilation or program linking.
#[derive(Debug, Clone, Error)]
pub enum ShaderError {
    /// A shader stage failed to compile.
    #[error("shader compile error ({stage}):\n{log}")]
    CompileError {
        /// The shader stage that failed (e.g. "vertex", "fragment").
        stage: String,
        /// The driver's info log describing the error.
        log: String,
    },
    /// A program failed to link.
    #[error("shader link error:\n{0}")]
    LinkError(String),
}

/// Formats a shader compilation error for human-readable debugging.
///
/// Prepends right-aligned line numbers to each line of `source`, then
/// appends the driver's error `log`. This makes it easy to correlate
/// error messages (which reference line numbers) with the actual GLSL.
pub fn format_shader_error(source: &str, log: &str) -> String {
    let source_lines: Vec<&str> = source.lines().collect();
    let width = source_lines.len().max(1).to_string().len();

    let numbered: String = source_lines
        .iter()
        .enumerate()
        .map(|(i, line)| format!("{:>width$}: {line}", i + 1, width = width))
        .collect::<Vec<_>>()
        .join("\n");

    match (numbered.is_empty(), log.is_empty()) {
        (true, true) => String::new(),
        (true, false) => log.to_string(),
        (false, true) => numbered,
        (false, false) => format!("{numbered}\n\n{log}"),
    }
}

/// Compiles a single shader stage.
///
/// Returns the compiled shader handle or a `ShaderError::CompileError`
/// with the driver's info log. The shader object is deleted on failure.
///
/// # Errors
///
/// Returns `ShaderError::CompileError` if the GLSL source fails to compile.
pub fn compile_shader<G: GlBackend>(
    gl: &G,
    stage: ShaderStage,
    source: &str,
) -> Result<G::Shader, ShaderError> {
    let shader = gl
        .create_shader(stage)
        .map_err(|e| ShaderError::CompileError {
            stage: stage.name().to_string(),
            log: e,
        })?;

    gl.shader_source(shader, source);
    gl.compile_shader(shader);

    if gl.shader_compile_status(shader) {
        log::debug!("compiled {} shader", stage.name());
        Ok(shader)
    } else {
        let info_log = gl.shader_info_log(shader);
        gl.delete_shader(shader);
        Err(ShaderError::CompileError {
            stage: stage.name().to_string(),
            log: format_shader_error(source, &info_log),
        })
    }
}

/// Links a vertex and fragment shader into a program.
///
/// Attaches both shaders, links, and detaches them afterward (the
/// program retains its own copies).
///
/// # Errors
///
/// Returns `ShaderError::LinkError` if linking fails.
pub fn link_program<G: GlBackend>(
    gl: &G,
    vertex: G::Shader,
    fragment: G::Shader,
) -> Result<G::Program, ShaderError> {
    let program = gl.create_program().map_err(ShaderError::LinkError)?;

    gl.attach_shader(program, vertex);
    gl.attach_shader(program, fragment);
    gl.link_program(program);

    // Detach regardless of link success.
    gl.detach_shader(program, vertex);
    gl.detach_shader(program, fragment);

    if gl.program_link_status(program) {
        Ok(program)
    } else {
        let info_log = gl.program_info_log(program);
        gl.delete_program(program);
        Err(ShaderError::LinkError(info_log))
    }
}

/// Compiles vertex and fragment sources and links them into a program.
///
/// Shader handles are cleaned up after linking regardless of success or
/// failure.
///
/// # Errors
///
/// Returns `ShaderError::CompileError` if either shader fails to compile,
/// or `ShaderError::LinkError` if linking fails.
pub fn compile_program<G: GlBackend>(
    gl: &G,
    vertex_src: &str,
    fragment_src: &str,
) -> Result<G::Program, ShaderError> {
    let vert = compile_shader(gl, ShaderStage::Vertex, vertex_src)?;
    let frag = match compile_shader(gl, ShaderStage::Fragment, fragment_src) {
        Ok(f) => f,
        Err(e) => {
            gl.delete_shader(vert);
            return Err(e);
        }
    };

    let result = link_program(gl, vert, frag);

    gl.delete_shader(vert);
    gl.delete_shader(frag);

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::flat_color::{FLAT_COLOR_FRAGMENT_SHADER, FLAT_COLOR_VERTEX_SHADER};
    use crate::render::recording::{GlCall, RecordingGl};

    // --- format_shader_error tests ---

    #[test]
    fn format_shader_error_prepends_line_numbers() {
        let source = "precision mediump float;\nvoid main() {\n}\n";
        let log = "ERROR: 0:2: syntax error";
        let formatted = format_shader_error(source, log);

        assert!(
            formatted.contains("1: precision mediump float;"),
            "expected line 1 with content, got:\n{formatted}"
        );
        assert!(
            formatted.contains("3: }"),
            "expected line 3 with content, got:\n{formatted}"
        );
        assert!(
            formatted.contains(log),
            "expected original log in output, got:\n{formatted}"
        );
    }

    #[test]
    fn format_shader_error_handles_empty_inputs() {
        assert_eq!(format_shader_error("", "some error"), "some error");
        assert_eq!(format_shader_error("void main() {}", ""), "1: void main() {}");
        assert!(format_shader_error("", "").is_empty());
    }

    #[test]
    fn format_shader_error_right_aligns_line_numbers() {
        let source = (1..=12)
            .map(|i| format!("line {i}"))
            .collect::<Vec<_>>()
            .join("\n");
        let formatted = format_shader_error(&source, "err");
        let lines: Vec<&str> = formatted.lines().collect();

        assert!(
            lines[0].starts_with(" 1: "),
            "expected right-aligned single digit, got: '{}'",
            lines[0]
        );
        assert!(
            lines[9].starts_with("10: "),
            "expected no padding for double digit, got: '{}'",
            lines[9]
        );
    }

    // --- ShaderError Display tests ---

    #[test]
    fn shader_compile_error_display_includes_stage_and_log() {
        let err = ShaderError::CompileError {
            stage: "fragment".into(),
            log: "undeclared identifier".into(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("fragment"), "missing stage in: {msg}");
        assert!(
            msg.contains("undeclared identifier"),
            "missing log in: {msg}"
        );
    }

    // --- compile/link against the recording context ---

    #[test]
    fn compile_program_succeeds_and_cleans_up_shaders() {
        let gl = RecordingGl::new();
        let program = compile_program(&gl, FLAT_COLOR_VERTEX_SHADER, FLAT_COLOR_FRAGMENT_SHADER);
        assert!(program.is_ok(), "expected link success, got: {program:?}");

        let deleted = gl
            .calls()
            .iter()
            .filter(|c| matches!(c, GlCall::DeleteShader { .. }))
            .count();
        assert_eq!(deleted, 2, "both shader objects should be deleted after link");

        let detached = gl
            .calls()
            .iter()
            .filter(|c| matches!(c, GlCall::DetachShader { .. }))
            .count();
        assert_eq!(detached, 2);
    }

    #[test]
    fn fragment_compile_failure_deletes_vertex_shader() {
        let gl = RecordingGl::new();
        gl.fail_compile(ShaderStage::Fragment, "0:1: bad token");

        let err = compile_program(&gl, FLAT_COLOR_VERTEX_SHADER, FLAT_COLOR_FRAGMENT_SHADER)
            .unwrap_err();
        match err {
            ShaderError::CompileError { stage, log } => {
                assert_eq!(stage, "fragment");
                assert!(log.contains("bad token"), "log missing driver text: {log}");
                assert!(log.contains("1: "), "log missing numbered source: {log}");
            }
            other => panic!("expected compile error, got: {other:?}"),
        }

        let deleted = gl
            .calls()
            .iter()
            .filter(|c| matches!(c, GlCall::DeleteShader { .. }))
            .count();
        assert_eq!(deleted, 2, "failed fragment and orphaned vertex shader");
        assert!(
            !gl.calls().iter().any(|c| matches!(c, GlCall::CreateProgram { .. })),
            "no program should be created after a compile failure"
        );
    }

    #[test]
    fn link_failure_deletes_program() {
        let gl = RecordingGl::new();
        gl.fail_link("varying mismatch");

        let err = compile_program(&gl, FLAT_COLOR_VERTEX_SHADER, FLAT_COLOR_FRAGMENT_SHADER)
            .unwrap_err();
        assert!(matches!(err, ShaderError::LinkError(ref log) if log == "varying mismatch"));
        assert!(gl
            .calls()
            .iter()
            .any(|c| matches!(c, GlCall::DeleteProgram { .. })));
    }

    #[test]
    fn shader_error_implements_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<ShaderError>();
    }
}
