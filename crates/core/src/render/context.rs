//! `glow`-backed graphics context.
//!
//! `GpuContext` wraps a `glow::Context` and implements [`GlBackend`] for
//! it. glow cannot tell whether its context is current, so the host marks
//! that explicitly with [`GpuContext::make_current`] and
//! [`GpuContext::release_current`] around its frame loop.

use std::cell::Cell;

use glow::HasContext;

use super::backend::{BufferTarget, BufferUsage, GlBackend, ShaderStage};

/// Wraps a `glow::Context` plus the host-reported currency flag.
pub struct GpuContext {
    gl: glow::Context,
    current: Cell<bool>,
}

impl GpuContext {
    /// Wraps `gl`, which the caller has just made current.
    pub fn new(gl: glow::Context) -> Self {
        Self {
            gl,
            current: Cell::new(true),
        }
    }

    /// Returns a reference to the underlying `glow::Context`.
    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }

    /// Consumes this wrapper and returns the underlying `glow::Context`.
    pub fn into_gl(self) -> glow::Context {
        self.gl
    }

    pub fn make_current(&self) {
        self.current.set(true);
    }

    pub fn release_current(&self) {
        self.current.set(false);
    }
}

fn stage_enum(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => glow::VERTEX_SHADER,
        ShaderStage::Fragment => glow::FRAGMENT_SHADER,
    }
}

fn target_enum(target: BufferTarget) -> u32 {
    match target {
        BufferTarget::Array => glow::ARRAY_BUFFER,
        BufferTarget::ElementArray => glow::ELEMENT_ARRAY_BUFFER,
    }
}

fn usage_enum(usage: BufferUsage) -> u32 {
    match usage {
        BufferUsage::Static => glow::STATIC_DRAW,
        BufferUsage::Dynamic => glow::DYNAMIC_DRAW,
    }
}

// SAFETY (all methods below): glow wraps raw GL calls as unsafe. Handles
// passed in were produced by this same context, and slice arguments are
// sized by Rust, so GL never reads past them.
#[allow(unsafe_code)]
impl GlBackend for GpuContext {
    type Shader = glow::Shader;
    type Program = glow::Program;
    type Buffer = glow::Buffer;
    type UniformLocation = glow::UniformLocation;

    fn is_current(&self) -> bool {
        self.current.get()
    }

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String> {
        unsafe { self.gl.create_shader(stage_enum(stage)) }
    }

    fn shader_source(&self, shader: Self::Shader, source: &str) {
        unsafe { self.gl.shader_source(shader, source) }
    }

    fn compile_shader(&self, shader: Self::Shader) {
        unsafe { self.gl.compile_shader(shader) }
    }

    fn shader_compile_status(&self, shader: Self::Shader) -> bool {
        unsafe { self.gl.get_shader_compile_status(shader) }
    }

    fn shader_info_log(&self, shader: Self::Shader) -> String {
        unsafe { self.gl.get_shader_info_log(shader) }
    }

    fn delete_shader(&self, shader: Self::Shader) {
        unsafe { self.gl.delete_shader(shader) }
    }

    fn create_program(&self) -> Result<Self::Program, String> {
        unsafe { self.gl.create_program() }
    }

    fn attach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { self.gl.attach_shader(program, shader) }
    }

    fn detach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { self.gl.detach_shader(program, shader) }
    }

    fn link_program(&self, program: Self::Program) {
        unsafe { self.gl.link_program(program) }
    }

    fn program_link_status(&self, program: Self::Program) -> bool {
        unsafe { self.gl.get_program_link_status(program) }
    }

    fn program_info_log(&self, program: Self::Program) -> String {
        unsafe { self.gl.get_program_info_log(program) }
    }

    fn delete_program(&self, program: Self::Program) {
        unsafe { self.gl.delete_program(program) }
    }

    fn use_program(&self, program: Option<Self::Program>) {
        unsafe { self.gl.use_program(program) }
    }

    fn create_buffer(&self) -> Result<Self::Buffer, String> {
        unsafe { self.gl.create_buffer() }
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<Self::Buffer>) {
        unsafe { self.gl.bind_buffer(target_enum(target), buffer) }
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage) {
        unsafe {
            self.gl
                .buffer_data_u8_slice(target_enum(target), data, usage_enum(usage))
        }
    }

    fn buffer_sub_data(&self, target: BufferTarget, offset: usize, data: &[u8]) {
        unsafe {
            self.gl
                .buffer_sub_data_u8_slice(target_enum(target), offset as i32, data)
        }
    }

    fn attrib_location(&self, program: Self::Program, name: &str) -> Option<u32> {
        unsafe { self.gl.get_attrib_location(program, name) }
    }

    fn uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation> {
        unsafe { self.gl.get_uniform_location(program, name) }
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        unsafe { self.gl.enable_vertex_attrib_array(index) }
    }

    fn disable_vertex_attrib_array(&self, index: u32) {
        unsafe { self.gl.disable_vertex_attrib_array(index) }
    }

    fn vertex_attrib_pointer_f32(
        &self,
        index: u32,
        size: i32,
        normalized: bool,
        stride: i32,
        offset: i32,
    ) {
        unsafe {
            self.gl
                .vertex_attrib_pointer_f32(index, size, glow::FLOAT, normalized, stride, offset)
        }
    }

    fn uniform_4_f32(&self, location: Option<&Self::UniformLocation>, value: &[f32; 4]) {
        unsafe { self.gl.uniform_4_f32_slice(location, value) }
    }

    fn uniform_matrix_4_f32(
        &self,
        location: Option<&Self::UniformLocation>,
        transpose: bool,
        value: &[f32; 16],
    ) {
        unsafe { self.gl.uniform_matrix_4_f32_slice(location, transpose, value) }
    }

    fn draw_triangles_u16(&self, count: i32, offset: i32) {
        unsafe {
            self.gl
                .draw_elements(glow::TRIANGLES, count, glow::UNSIGNED_SHORT, offset)
        }
    }

    fn get_error(&self) -> u32 {
        unsafe { self.gl.get_error() }
    }
}
