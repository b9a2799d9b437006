//! Non-blocking GL error queries.
//!
//! GL accumulates error flags instead of failing calls. [`check_gl_error`]
//! drains them after an operation and logs each one; rendering carries on
//! regardless.

use super::backend::{GlBackend, NO_ERROR};

pub const INVALID_ENUM: u32 = 0x0500;
pub const INVALID_VALUE: u32 = 0x0501;
pub const INVALID_OPERATION: u32 = 0x0502;
pub const OUT_OF_MEMORY: u32 = 0x0505;
pub const INVALID_FRAMEBUFFER_OPERATION: u32 = 0x0506;

// GL implementations may keep one flag per error kind; never loop forever
// on a context that keeps reporting.
const MAX_DRAINED: usize = 16;

/// Symbolic name of a GL error code.
pub fn error_name(code: u32) -> &'static str {
    match code {
        NO_ERROR => "GL_NO_ERROR",
        INVALID_ENUM => "GL_INVALID_ENUM",
        INVALID_VALUE => "GL_INVALID_VALUE",
        INVALID_OPERATION => "GL_INVALID_OPERATION",
        OUT_OF_MEMORY => "GL_OUT_OF_MEMORY",
        INVALID_FRAMEBUFFER_OPERATION => "GL_INVALID_FRAMEBUFFER_OPERATION",
        _ => "unknown GL error",
    }
}

/// Drains pending GL errors after `op`, logging each at `warn`.
///
/// Returns the codes seen so callers and tests can inspect them.
pub fn check_gl_error<G: GlBackend>(gl: &G, op: &str) -> Vec<u32> {
    let mut seen = Vec::new();
    while seen.len() < MAX_DRAINED {
        let code = gl.get_error();
        if code == NO_ERROR {
            break;
        }
        log::warn!("{op}: glError 0x{code:04X} ({})", error_name(code));
        seen.push(code);
    }
    seen
}
