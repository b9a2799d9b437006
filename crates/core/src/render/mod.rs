//! OpenGL ES 2.0 rendering infrastructure.
//!
//! # Module overview
//!
//! - [`backend`] -- The `GlBackend` trait: the GL entry points a quad uses.
//! - [`context`] -- `glow`-backed context (requires the `glow` feature).
//! - [`recording`] -- In-memory context that records a call trace.
//! - [`shader`] -- Shader compilation, linking, and error formatting.
//! - [`flat_color`] -- Flat-color GLSL sources and their binding names.
//! - [`library`] -- Compile-once cache for the flat-color program.
//! - [`diagnostics`] -- Non-blocking GL error queries.

pub mod backend;
#[cfg(feature = "glow")]
pub mod context;
pub mod diagnostics;
pub mod flat_color;
pub mod library;
pub mod recording;
pub mod shader;

// Re-export key types at the render module level for convenience.
pub use backend::{BufferTarget, BufferUsage, GlBackend, ShaderStage};
#[cfg(feature = "glow")]
pub use context::GpuContext;
pub use diagnostics::{check_gl_error, error_name};
pub use library::ShaderLibrary;
pub use recording::{GlCall, RecordingGl};
pub use shader::{compile_program, compile_shader, format_shader_error, link_program, ShaderError};
