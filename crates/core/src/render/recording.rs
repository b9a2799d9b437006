//! In-memory graphics context that records calls instead of drawing.
//!
//! `RecordingGl` keeps just enough GL object state (shader sources, link
//! results, buffer contents, bound targets, uniform values) to answer the
//! queries the quad makes, and appends every call to a trace of
//! [`GlCall`]s. Names are plain `u32`s handed out sequentially from 1,
//! as a GL driver would.
//!
//! Failure injection covers the paths a real driver can take: per-stage
//! compile failures, link failures, refused buffer creation, queued error
//! codes, and a context that is not current.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap, VecDeque};

use serde::Serialize;

use super::backend::{BufferTarget, BufferUsage, GlBackend, ShaderStage, NO_ERROR};
use super::diagnostics::INVALID_OPERATION;

/// One recorded call against the context.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum GlCall {
    CreateShader { stage: ShaderStage, shader: u32 },
    ShaderSource { shader: u32, len: usize },
    CompileShader { shader: u32 },
    DeleteShader { shader: u32 },
    CreateProgram { program: u32 },
    AttachShader { program: u32, shader: u32 },
    DetachShader { program: u32, shader: u32 },
    LinkProgram { program: u32 },
    DeleteProgram { program: u32 },
    UseProgram { program: Option<u32> },
    CreateBuffer { buffer: u32 },
    BindBuffer { target: BufferTarget, buffer: Option<u32> },
    BufferData { target: BufferTarget, len: usize, usage: BufferUsage },
    BufferSubData { target: BufferTarget, offset: usize, len: usize },
    GetAttribLocation { program: u32, name: String, location: Option<u32> },
    GetUniformLocation { program: u32, name: String, found: bool },
    EnableVertexAttribArray { index: u32 },
    DisableVertexAttribArray { index: u32 },
    VertexAttribPointer { index: u32, size: i32, normalized: bool, stride: i32, offset: i32 },
    Uniform4f { location: Option<String>, value: [f32; 4] },
    UniformMatrix4f { location: Option<String>, transpose: bool, value: [f32; 16] },
    DrawElements { count: i32, offset: i32 },
    GetError { code: u32 },
}

#[derive(Debug)]
struct ShaderObject {
    stage: ShaderStage,
    source: String,
    compiled: bool,
}

#[derive(Debug, Default)]
struct ProgramObject {
    attached: Vec<u32>,
    linked: bool,
    attributes: Vec<String>,
    uniforms: Vec<String>,
    info_log: String,
}

#[derive(Debug, Default)]
struct State {
    next_name: u32,
    current: bool,
    calls: Vec<GlCall>,
    shaders: HashMap<u32, ShaderObject>,
    programs: HashMap<u32, ProgramObject>,
    buffers: HashMap<u32, Vec<u8>>,
    bound: HashMap<BufferTarget, u32>,
    current_program: Option<u32>,
    enabled_attribs: BTreeSet<u32>,
    uniform_values: HashMap<(u32, String), Vec<f32>>,
    errors: VecDeque<u32>,
    compile_failures: HashMap<&'static str, String>,
    link_failure: Option<String>,
    refuse_buffers: bool,
}

impl State {
    fn alloc_name(&mut self) -> u32 {
        self.next_name += 1;
        self.next_name
    }

    fn raise(&mut self, code: u32) {
        self.errors.push_back(code);
    }
}

/// Extracts `(qualifier, name)` pairs such as `("uniform", "vColor")` from
/// GLSL declarations of the form `<qualifier> <type> <name>;`.
fn declarations(source: &str) -> impl Iterator<Item = (&str, &str)> {
    source.split(';').filter_map(|stmt| {
        let tokens: Vec<&str> = stmt.split_whitespace().collect();
        match tokens.as_slice() {
            [qualifier @ ("attribute" | "uniform"), _ty, name] => Some((*qualifier, *name)),
            _ => None,
        }
    })
}

/// A [`GlBackend`] that records calls into memory.
#[derive(Debug)]
pub struct RecordingGl {
    state: RefCell<State>,
}

impl Default for RecordingGl {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingGl {
    /// Creates a context that is current and has no objects.
    pub fn new() -> Self {
        Self {
            state: RefCell::new(State {
                current: true,
                ..State::default()
            }),
        }
    }

    /// Snapshot of every recorded call, oldest first.
    pub fn calls(&self) -> Vec<GlCall> {
        self.state.borrow().calls.clone()
    }

    /// Discards the recorded trace. Object state is kept.
    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    pub fn set_current(&self, current: bool) {
        self.state.borrow_mut().current = current;
    }

    /// Makes every subsequent compile of `stage` fail with `log`.
    pub fn fail_compile(&self, stage: ShaderStage, log: &str) {
        self.state
            .borrow_mut()
            .compile_failures
            .insert(stage.name(), log.to_string());
    }

    /// Makes every subsequent link fail with `log`.
    pub fn fail_link(&self, log: &str) {
        self.state.borrow_mut().link_failure = Some(log.to_string());
    }

    /// Makes `create_buffer` fail from now on.
    pub fn refuse_buffers(&self) {
        self.state.borrow_mut().refuse_buffers = true;
    }

    /// Queues an error code for `get_error` to report.
    pub fn push_error(&self, code: u32) {
        self.state.borrow_mut().raise(code);
    }

    /// Current contents of `buffer`, if it exists.
    pub fn buffer_contents(&self, buffer: u32) -> Option<Vec<u8>> {
        self.state.borrow().buffers.get(&buffer).cloned()
    }

    /// Last value uploaded to uniform `name` of `program`.
    pub fn uniform_value(&self, program: u32, name: &str) -> Option<Vec<f32>> {
        self.state
            .borrow()
            .uniform_values
            .get(&(program, name.to_string()))
            .cloned()
    }

    pub fn current_program(&self) -> Option<u32> {
        self.state.borrow().current_program
    }

    pub fn enabled_attribs(&self) -> Vec<u32> {
        self.state.borrow().enabled_attribs.iter().copied().collect()
    }

    /// Number of live (created and not deleted) programs.
    pub fn live_programs(&self) -> usize {
        self.state.borrow().programs.len()
    }

    fn record(&self, call: GlCall) {
        self.state.borrow_mut().calls.push(call);
    }

    fn upload_uniform(&self, location: Option<&String>, value: &[f32]) {
        let mut st = self.state.borrow_mut();
        let Some(program) = st.current_program else {
            st.raise(INVALID_OPERATION);
            return;
        };
        // A missing location is silently ignored, as in GL.
        if let Some(name) = location {
            st.uniform_values
                .insert((program, name.clone()), value.to_vec());
        }
    }
}

impl GlBackend for RecordingGl {
    type Shader = u32;
    type Program = u32;
    type Buffer = u32;
    type UniformLocation = String;

    fn is_current(&self) -> bool {
        self.state.borrow().current
    }

    fn create_shader(&self, stage: ShaderStage) -> Result<u32, String> {
        let shader = {
            let mut st = self.state.borrow_mut();
            let name = st.alloc_name();
            st.shaders.insert(
                name,
                ShaderObject {
                    stage,
                    source: String::new(),
                    compiled: false,
                },
            );
            name
        };
        self.record(GlCall::CreateShader { stage, shader });
        Ok(shader)
    }

    fn shader_source(&self, shader: u32, source: &str) {
        if let Some(obj) = self.state.borrow_mut().shaders.get_mut(&shader) {
            obj.source = source.to_string();
        }
        self.record(GlCall::ShaderSource {
            shader,
            len: source.len(),
        });
    }

    fn compile_shader(&self, shader: u32) {
        {
            let mut st = self.state.borrow_mut();
            let failures = &st.compile_failures;
            let compiled = match st.shaders.get(&shader) {
                Some(obj) => !obj.source.is_empty() && !failures.contains_key(obj.stage.name()),
                None => false,
            };
            if let Some(obj) = st.shaders.get_mut(&shader) {
                obj.compiled = compiled;
            }
        }
        self.record(GlCall::CompileShader { shader });
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .is_some_and(|s| s.compiled)
    }

    fn shader_info_log(&self, shader: u32) -> String {
        let st = self.state.borrow();
        st.shaders
            .get(&shader)
            .and_then(|s| st.compile_failures.get(s.stage.name()))
            .cloned()
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader: u32) {
        self.state.borrow_mut().shaders.remove(&shader);
        self.record(GlCall::DeleteShader { shader });
    }

    fn create_program(&self) -> Result<u32, String> {
        let program = {
            let mut st = self.state.borrow_mut();
            let name = st.alloc_name();
            st.programs.insert(name, ProgramObject::default());
            name
        };
        self.record(GlCall::CreateProgram { program });
        Ok(program)
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        if let Some(p) = self.state.borrow_mut().programs.get_mut(&program) {
            p.attached.push(shader);
        }
        self.record(GlCall::AttachShader { program, shader });
    }

    fn detach_shader(&self, program: u32, shader: u32) {
        if let Some(p) = self.state.borrow_mut().programs.get_mut(&program) {
            p.attached.retain(|s| *s != shader);
        }
        self.record(GlCall::DetachShader { program, shader });
    }

    fn link_program(&self, program: u32) {
        {
            let mut st = self.state.borrow_mut();
            let st = &mut *st;
            if let Some(p) = st.programs.get_mut(&program) {
                let attached: Vec<&ShaderObject> =
                    p.attached.iter().filter_map(|s| st.shaders.get(s)).collect();
                let has_both = attached.iter().any(|s| s.stage == ShaderStage::Vertex)
                    && attached.iter().any(|s| s.stage == ShaderStage::Fragment);
                let all_compiled = attached.iter().all(|s| s.compiled);

                p.attributes.clear();
                p.uniforms.clear();
                if let Some(log) = &st.link_failure {
                    p.linked = false;
                    p.info_log = log.clone();
                } else if !has_both || !all_compiled {
                    p.linked = false;
                    p.info_log = "program needs a compiled vertex and fragment shader".into();
                } else {
                    p.linked = true;
                    p.info_log.clear();
                    for shader in &attached {
                        for (qualifier, name) in declarations(&shader.source) {
                            let list = if qualifier == "attribute" {
                                &mut p.attributes
                            } else {
                                &mut p.uniforms
                            };
                            if !list.iter().any(|n| n == name) {
                                list.push(name.to_string());
                            }
                        }
                    }
                }
            }
        }
        self.record(GlCall::LinkProgram { program });
    }

    fn program_link_status(&self, program: u32) -> bool {
        self.state
            .borrow()
            .programs
            .get(&program)
            .is_some_and(|p| p.linked)
    }

    fn program_info_log(&self, program: u32) -> String {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|p| p.info_log.clone())
            .unwrap_or_default()
    }

    fn delete_program(&self, program: u32) {
        {
            let mut st = self.state.borrow_mut();
            st.programs.remove(&program);
            if st.current_program == Some(program) {
                st.current_program = None;
            }
        }
        self.record(GlCall::DeleteProgram { program });
    }

    fn use_program(&self, program: Option<u32>) {
        {
            let mut st = self.state.borrow_mut();
            match program {
                Some(p) if !st.programs.get(&p).is_some_and(|p| p.linked) => {
                    st.raise(INVALID_OPERATION);
                }
                _ => st.current_program = program,
            }
        }
        self.record(GlCall::UseProgram { program });
    }

    fn create_buffer(&self) -> Result<u32, String> {
        let buffer = {
            let mut st = self.state.borrow_mut();
            if st.refuse_buffers {
                return Err("buffer creation refused".to_string());
            }
            let name = st.alloc_name();
            st.buffers.insert(name, Vec::new());
            name
        };
        self.record(GlCall::CreateBuffer { buffer });
        Ok(buffer)
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<u32>) {
        {
            let mut st = self.state.borrow_mut();
            match buffer {
                Some(b) => {
                    st.bound.insert(target, b);
                }
                None => {
                    st.bound.remove(&target);
                }
            }
        }
        self.record(GlCall::BindBuffer { target, buffer });
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage) {
        {
            let mut st = self.state.borrow_mut();
            match st.bound.get(&target).copied() {
                Some(b) => {
                    st.buffers.insert(b, data.to_vec());
                }
                None => st.raise(INVALID_OPERATION),
            }
        }
        self.record(GlCall::BufferData {
            target,
            len: data.len(),
            usage,
        });
    }

    fn buffer_sub_data(&self, target: BufferTarget, offset: usize, data: &[u8]) {
        {
            let mut st = self.state.borrow_mut();
            let st = &mut *st;
            let storage = st
                .bound
                .get(&target)
                .and_then(|b| st.buffers.get_mut(b))
                .filter(|s| offset + data.len() <= s.len());
            match storage {
                Some(s) => s[offset..offset + data.len()].copy_from_slice(data),
                None => st.errors.push_back(INVALID_OPERATION),
            }
        }
        self.record(GlCall::BufferSubData {
            target,
            offset,
            len: data.len(),
        });
    }

    fn attrib_location(&self, program: u32, name: &str) -> Option<u32> {
        let location = self
            .state
            .borrow()
            .programs
            .get(&program)
            .filter(|p| p.linked)
            .and_then(|p| p.attributes.iter().position(|a| a == name))
            .map(|i| i as u32);
        self.record(GlCall::GetAttribLocation {
            program,
            name: name.to_string(),
            location,
        });
        location
    }

    fn uniform_location(&self, program: u32, name: &str) -> Option<String> {
        let found = self
            .state
            .borrow()
            .programs
            .get(&program)
            .is_some_and(|p| p.linked && p.uniforms.iter().any(|u| u == name));
        self.record(GlCall::GetUniformLocation {
            program,
            name: name.to_string(),
            found,
        });
        found.then(|| name.to_string())
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        self.state.borrow_mut().enabled_attribs.insert(index);
        self.record(GlCall::EnableVertexAttribArray { index });
    }

    fn disable_vertex_attrib_array(&self, index: u32) {
        self.state.borrow_mut().enabled_attribs.remove(&index);
        self.record(GlCall::DisableVertexAttribArray { index });
    }

    fn vertex_attrib_pointer_f32(
        &self,
        index: u32,
        size: i32,
        normalized: bool,
        stride: i32,
        offset: i32,
    ) {
        {
            let mut st = self.state.borrow_mut();
            if !st.bound.contains_key(&BufferTarget::Array) {
                st.raise(INVALID_OPERATION);
            }
        }
        self.record(GlCall::VertexAttribPointer {
            index,
            size,
            normalized,
            stride,
            offset,
        });
    }

    fn uniform_4_f32(&self, location: Option<&String>, value: &[f32; 4]) {
        self.upload_uniform(location, value);
        self.record(GlCall::Uniform4f {
            location: location.cloned(),
            value: *value,
        });
    }

    fn uniform_matrix_4_f32(&self, location: Option<&String>, transpose: bool, value: &[f32; 16]) {
        self.upload_uniform(location, value);
        self.record(GlCall::UniformMatrix4f {
            location: location.cloned(),
            transpose,
            value: *value,
        });
    }

    fn draw_triangles_u16(&self, count: i32, offset: i32) {
        {
            let mut st = self.state.borrow_mut();
            let needed = (offset.max(0) as usize) + count.max(0) as usize * 2;
            let indices_ok = st
                .bound
                .get(&BufferTarget::ElementArray)
                .and_then(|b| st.buffers.get(b))
                .is_some_and(|s| s.len() >= needed);
            if !st.current || st.current_program.is_none() || !indices_ok {
                st.raise(INVALID_OPERATION);
            }
        }
        self.record(GlCall::DrawElements { count, offset });
    }

    fn get_error(&self) -> u32 {
        let code = self
            .state
            .borrow_mut()
            .errors
            .pop_front()
            .unwrap_or(NO_ERROR);
        self.record(GlCall::GetError { code });
        code
    }
}
