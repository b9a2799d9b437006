//! The graphics-context seam.
//!
//! `GlBackend` names the OpenGL ES 2.0 entry points the quad needs and
//! nothing more. Handles are associated types so a real context and the
//! in-memory [`RecordingGl`](super::recording::RecordingGl) can hand out
//! their own kinds of objects. Methods take `&self`, matching how GL
//! contexts are shared by reference across a frame.

use std::fmt::Debug;

/// Pipeline stage a shader object belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn name(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        }
    }
}

/// Binding point for a buffer object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BufferTarget {
    /// `GL_ARRAY_BUFFER`
    Array,
    /// `GL_ELEMENT_ARRAY_BUFFER`
    ElementArray,
}

/// Upload frequency hint passed with buffer data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BufferUsage {
    Static,
    Dynamic,
}

/// `GL_NO_ERROR`
pub const NO_ERROR: u32 = 0;

/// The subset of an OpenGL ES 2.0 context used to build and draw a quad.
pub trait GlBackend {
    type Shader: Copy + Debug;
    type Program: Copy + Debug + PartialEq;
    type Buffer: Copy + Debug + PartialEq;
    type UniformLocation: Clone + Debug;

    /// Whether this context is current on the calling thread.
    fn is_current(&self) -> bool;

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String>;
    fn shader_source(&self, shader: Self::Shader, source: &str);
    fn compile_shader(&self, shader: Self::Shader);
    fn shader_compile_status(&self, shader: Self::Shader) -> bool;
    fn shader_info_log(&self, shader: Self::Shader) -> String;
    fn delete_shader(&self, shader: Self::Shader);

    fn create_program(&self) -> Result<Self::Program, String>;
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn detach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn link_program(&self, program: Self::Program);
    fn program_link_status(&self, program: Self::Program) -> bool;
    fn program_info_log(&self, program: Self::Program) -> String;
    fn delete_program(&self, program: Self::Program);
    fn use_program(&self, program: Option<Self::Program>);

    fn create_buffer(&self) -> Result<Self::Buffer, String>;
    fn bind_buffer(&self, target: BufferTarget, buffer: Option<Self::Buffer>);
    /// Replaces the storage of the buffer bound to `target`.
    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage);
    /// Overwrites part of the buffer bound to `target` starting at `offset` bytes.
    fn buffer_sub_data(&self, target: BufferTarget, offset: usize, data: &[u8]);

    fn attrib_location(&self, program: Self::Program, name: &str) -> Option<u32>;
    fn uniform_location(&self, program: Self::Program, name: &str)
        -> Option<Self::UniformLocation>;

    fn enable_vertex_attrib_array(&self, index: u32);
    fn disable_vertex_attrib_array(&self, index: u32);
    /// Points attribute `index` at float data in the bound array buffer.
    fn vertex_attrib_pointer_f32(
        &self,
        index: u32,
        size: i32,
        normalized: bool,
        stride: i32,
        offset: i32,
    );

    fn uniform_4_f32(&self, location: Option<&Self::UniformLocation>, value: &[f32; 4]);
    fn uniform_matrix_4_f32(
        &self,
        location: Option<&Self::UniformLocation>,
        transpose: bool,
        value: &[f32; 16],
    );

    /// Draws `count` `u16` indices from the bound element buffer as triangles.
    fn draw_triangles_u16(&self, count: i32, offset: i32);

    /// Pops one code off the context's error queue (`NO_ERROR` when empty).
    fn get_error(&self) -> u32;
}
