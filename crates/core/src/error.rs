//! Error types for the quad primitive.

use thiserror::Error;

use crate::render::ShaderError;

/// Errors produced while building or drawing a quad.
#[derive(Debug, Error)]
pub enum QuadError {
    /// The flat-color program failed to compile or link.
    #[error(transparent)]
    Shader(#[from] ShaderError),

    /// The context refused to create a GL object (buffer, program).
    #[error("gl object creation failed: {0}")]
    Gl(String),

    /// `render` was called while no graphics context was current.
    #[error("no graphics context is current on this thread")]
    ContextNotCurrent,
}
