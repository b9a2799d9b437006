//! Shader library: compiles the flat-color program once per context.
//!
//! Every quad built from the same library shares one program handle.
//! The library never deletes the program; its lifetime ends with the
//! context that owns it.

use super::backend::GlBackend;
use super::flat_color::{FLAT_COLOR_FRAGMENT_SHADER, FLAT_COLOR_VERTEX_SHADER};
use super::shader::{compile_program, ShaderError};

/// Caches compiled programs for one graphics context.
#[derive(Debug)]
pub struct ShaderLibrary<G: GlBackend> {
    flat_color: Option<G::Program>,
    compilations: usize,
}

impl<G: GlBackend> Default for ShaderLibrary<G> {
    fn default() -> Self {
        Self {
            flat_color: None,
            compilations: 0,
        }
    }
}

impl<G: GlBackend> ShaderLibrary<G> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the flat-color program, compiling and linking it on the
    /// first call.
    ///
    /// # Errors
    ///
    /// Returns the compile or link error. A failed attempt is not cached,
    /// so the next call retries.
    pub fn flat_color(&mut self, gl: &G) -> Result<G::Program, ShaderError> {
        if let Some(program) = self.flat_color {
            return Ok(program);
        }
        self.compilations += 1;
        let program = compile_program(gl, FLAT_COLOR_VERTEX_SHADER, FLAT_COLOR_FRAGMENT_SHADER)?;
        log::debug!("flat-color program linked: {program:?}");
        self.flat_color = Some(program);
        Ok(program)
    }

    /// How many times a program build was attempted.
    pub fn compilations(&self) -> usize {
        self.compilations
    }
}
