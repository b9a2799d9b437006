//! The quad primitive: a flat-colored square that can be moved and drawn.
//!
//! A `Quad` owns its vertex positions, two GPU buffers (vertices and
//! indices) and a handle to the shared flat-color program. `translate`
//! only touches CPU memory and marks the geometry dirty; the next
//! `render` pushes the new positions into the existing vertex buffer
//! before drawing.

use serde_json::Value;

use crate::color::Rgba;
use crate::error::QuadError;
use crate::geometry::{Geometry, COORDS_PER_VERTEX, DRAW_ORDER, VERTEX_STRIDE};
use crate::params::{param_bool, param_f32_vec, param_string};
use crate::render::diagnostics::check_gl_error;
use crate::render::flat_color::{COLOR_UNIFORM, MVP_UNIFORM, POSITION_ATTRIBUTE};
use crate::render::{BufferTarget, BufferUsage, GlBackend, ShaderLibrary};

/// Id given to quads built from params without an `"id"` key.
pub const DEFAULT_ID: &str = "square";

/// Behavior switches for construction and drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Fail with [`QuadError::ContextNotCurrent`] instead of issuing calls
    /// against a context that is not current.
    pub strict: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { strict: true }
    }
}

/// A colored unit square drawn with an indexed triangle list.
#[derive(Debug)]
pub struct Quad<G: GlBackend> {
    id: String,
    geometry: Geometry,
    color: Rgba,
    program: G::Program,
    vertex_buffer: G::Buffer,
    index_buffer: G::Buffer,
    options: RenderOptions,
}

impl<G: GlBackend> Quad<G> {
    /// Builds a quad with default [`RenderOptions`].
    ///
    /// `color` is used only if it has exactly four components; otherwise
    /// [`Rgba::DEFAULT`] is kept.
    ///
    /// # Errors
    ///
    /// Fails if the context is not current, the flat-color program does
    /// not compile or link, or the context refuses to create a buffer.
    pub fn new(
        gl: &G,
        shaders: &mut ShaderLibrary<G>,
        id: impl Into<String>,
        color: &[f32],
    ) -> Result<Self, QuadError> {
        Self::with_options(gl, shaders, id, color, RenderOptions::default())
    }

    /// Builds a quad with explicit options.
    pub fn with_options(
        gl: &G,
        shaders: &mut ShaderLibrary<G>,
        id: impl Into<String>,
        color: &[f32],
        options: RenderOptions,
    ) -> Result<Self, QuadError> {
        if options.strict && !gl.is_current() {
            return Err(QuadError::ContextNotCurrent);
        }

        let id = id.into();
        let color = Rgba::from_components_or_default(color);
        let geometry = Geometry::unit_square();
        let program = shaders.flat_color(gl)?;

        let vertex_buffer = gl.create_buffer().map_err(QuadError::Gl)?;
        gl.bind_buffer(BufferTarget::Array, Some(vertex_buffer));
        gl.buffer_data(
            BufferTarget::Array,
            geometry.vertex_bytes(),
            BufferUsage::Dynamic,
        );
        gl.bind_buffer(BufferTarget::Array, None);

        let index_buffer = gl.create_buffer().map_err(QuadError::Gl)?;
        gl.bind_buffer(BufferTarget::ElementArray, Some(index_buffer));
        gl.buffer_data(
            BufferTarget::ElementArray,
            geometry.index_bytes(),
            BufferUsage::Static,
        );
        gl.bind_buffer(BufferTarget::ElementArray, None);

        log::debug!(
            "quad '{id}' created: program {program:?}, vbo {vertex_buffer:?}, ibo {index_buffer:?}"
        );

        Ok(Self {
            id,
            geometry,
            color,
            program,
            vertex_buffer,
            index_buffer,
            options,
        })
    }

    /// Builds a quad from JSON params.
    ///
    /// Recognized keys: `"id"` (string), `"color"` (array of numbers, used
    /// only when it has four entries) and `"strict"` (bool). Anything
    /// missing or malformed falls back to its default.
    pub fn from_params(
        gl: &G,
        shaders: &mut ShaderLibrary<G>,
        params: &Value,
    ) -> Result<Self, QuadError> {
        let id = param_string(params, "id", DEFAULT_ID);
        let color = param_f32_vec(params, "color").unwrap_or_default();
        let options = RenderOptions {
            strict: param_bool(params, "strict", RenderOptions::default().strict),
        };
        Self::with_options(gl, shaders, id, &color, options)
    }

    /// Moves every vertex by `dx` along X and `dy` along Y.
    ///
    /// No GL call is made; the vertex buffer is refreshed on the next
    /// [`Quad::render`].
    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.geometry.translate(dx, dy);
    }

    /// Draws the quad with `transform` (column-major projection × view × model).
    ///
    /// Leaves the flat-color program bound and the position attribute
    /// disabled. GL errors raised along the way are logged, not returned.
    ///
    /// # Errors
    ///
    /// In strict mode, returns [`QuadError::ContextNotCurrent`] without
    /// issuing any call when the context is not current.
    pub fn render(&mut self, gl: &G, transform: &[f32; 16]) -> Result<(), QuadError> {
        if self.options.strict && !gl.is_current() {
            return Err(QuadError::ContextNotCurrent);
        }

        gl.use_program(Some(self.program));

        gl.bind_buffer(BufferTarget::Array, Some(self.vertex_buffer));
        if self.geometry.take_dirty() {
            gl.buffer_sub_data(BufferTarget::Array, 0, self.geometry.vertex_bytes());
            log::trace!("quad '{}': vertex buffer refreshed", self.id);
        }

        let position = gl.attrib_location(self.program, POSITION_ATTRIBUTE);
        match position {
            Some(index) => {
                gl.enable_vertex_attrib_array(index);
                gl.vertex_attrib_pointer_f32(
                    index,
                    COORDS_PER_VERTEX as i32,
                    false,
                    VERTEX_STRIDE as i32,
                    0,
                );
            }
            None => log::debug!("quad '{}': {POSITION_ATTRIBUTE} not active", self.id),
        }

        let color_location = gl.uniform_location(self.program, COLOR_UNIFORM);
        gl.uniform_4_f32(color_location.as_ref(), &self.color.to_array());

        let mvp_location = gl.uniform_location(self.program, MVP_UNIFORM);
        check_gl_error(gl, "glGetUniformLocation");
        gl.uniform_matrix_4_f32(mvp_location.as_ref(), false, transform);
        check_gl_error(gl, "glUniformMatrix4fv");

        gl.bind_buffer(BufferTarget::ElementArray, Some(self.index_buffer));
        gl.draw_triangles_u16(DRAW_ORDER.len() as i32, 0);

        if let Some(index) = position {
            gl.disable_vertex_attrib_array(index);
        }
        Ok(())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn color(&self) -> Rgba {
        self.color
    }

    /// Packed `x, y, z` positions, four vertices.
    pub fn vertices(&self) -> &[f32] {
        self.geometry.positions()
    }

    pub fn vertex(&self, index: usize) -> Option<[f32; 3]> {
        self.geometry.vertex(index)
    }

    pub fn draw_order(&self) -> &'static [u16] {
        self.geometry.draw_order()
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn program(&self) -> G::Program {
        self.program
    }

    pub fn vertex_buffer(&self) -> G::Buffer {
        self.vertex_buffer
    }

    pub fn index_buffer(&self) -> G::Buffer {
        self.index_buffer
    }

    pub fn options(&self) -> RenderOptions {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::diagnostics::INVALID_VALUE;
    use crate::render::{GlCall, RecordingGl, ShaderStage};
    use crate::transform::IDENTITY;
    use proptest::prelude::*;
    use serde_json::json;

    fn setup() -> (RecordingGl, ShaderLibrary<RecordingGl>) {
        (RecordingGl::new(), ShaderLibrary::new())
    }

    fn count(gl: &RecordingGl, pred: impl Fn(&GlCall) -> bool) -> usize {
        gl.calls().iter().filter(|c| pred(c)).count()
    }

    fn decode_f32(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|b| f32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
            .collect()
    }

    #[test]
    fn end_to_end_scenario() {
        let (gl, mut lib) = setup();
        let mut quad = Quad::new(&gl, &mut lib, "sq1", &[1.0, 0.0, 0.0, 1.0]).unwrap();
        assert_eq!(quad.id(), "sq1");
        assert_eq!(quad.vertex(0), Some([-0.5, 0.5, 0.0]));

        quad.translate(0.5, -0.5);
        assert_eq!(quad.vertex(0), Some([0.0, 0.0, 0.0]));

        gl.clear_calls();
        quad.render(&gl, &IDENTITY).unwrap();

        let calls = gl.calls();
        assert!(
            calls.contains(&GlCall::DrawElements { count: 6, offset: 0 }),
            "expected a 6-index draw, got: {calls:?}"
        );
        assert!(calls.contains(&GlCall::Uniform4f {
            location: Some(COLOR_UNIFORM.to_string()),
            value: [1.0, 0.0, 0.0, 1.0],
        }));
        assert_eq!(
            gl.uniform_value(quad.program(), COLOR_UNIFORM),
            Some(vec![1.0, 0.0, 0.0, 1.0])
        );
        assert_eq!(gl.get_error(), 0, "render should leave no GL error behind");
    }

    #[test]
    fn default_color_kept_for_wrong_length() {
        let (gl, mut lib) = setup();
        let quad = Quad::new(&gl, &mut lib, "a", &[1.0, 0.0]).unwrap();
        assert_eq!(quad.color(), Rgba::DEFAULT);
    }

    #[test]
    fn construction_uploads_both_buffers() {
        let (gl, mut lib) = setup();
        let quad = Quad::new(&gl, &mut lib, "a", &[]).unwrap();

        let vertices = gl.buffer_contents(quad.vertex_buffer()).unwrap();
        assert_eq!(decode_f32(&vertices), crate::geometry::UNIT_SQUARE);

        let indices = gl.buffer_contents(quad.index_buffer()).unwrap();
        assert_eq!(indices, quad.geometry().index_bytes());
        assert!(gl.calls().contains(&GlCall::BufferData {
            target: BufferTarget::ElementArray,
            len: 12,
            usage: BufferUsage::Static,
        }));
    }

    #[test]
    fn translate_makes_no_gl_calls() {
        let (gl, mut lib) = setup();
        let mut quad = Quad::new(&gl, &mut lib, "a", &[]).unwrap();
        gl.clear_calls();
        quad.translate(1.0, 1.0);
        assert!(gl.calls().is_empty());
        assert!(quad.geometry().is_dirty());
    }

    #[test]
    fn render_uploads_only_when_dirty() {
        let (gl, mut lib) = setup();
        let mut quad = Quad::new(&gl, &mut lib, "a", &[]).unwrap();
        let is_upload = |c: &GlCall| matches!(c, GlCall::BufferSubData { .. });

        gl.clear_calls();
        quad.render(&gl, &IDENTITY).unwrap();
        assert_eq!(count(&gl, is_upload), 0, "clean geometry must not re-upload");

        quad.translate(0.25, 0.0);
        quad.translate(0.25, 0.0);
        gl.clear_calls();
        quad.render(&gl, &IDENTITY).unwrap();
        assert_eq!(count(&gl, is_upload), 1, "two translates, one upload");

        gl.clear_calls();
        quad.render(&gl, &IDENTITY).unwrap();
        assert_eq!(count(&gl, is_upload), 0);
    }

    #[test]
    fn gpu_buffer_mirrors_vertices_after_render() {
        let (gl, mut lib) = setup();
        let mut quad = Quad::new(&gl, &mut lib, "a", &[]).unwrap();
        quad.translate(1.5, -2.0);
        quad.render(&gl, &IDENTITY).unwrap();

        let uploaded = gl.buffer_contents(quad.vertex_buffer()).unwrap();
        assert_eq!(decode_f32(&uploaded), quad.vertices());
    }

    #[test]
    fn render_issues_calls_in_pipeline_order() {
        let (gl, mut lib) = setup();
        let mut quad = Quad::new(&gl, &mut lib, "a", &[]).unwrap();
        gl.clear_calls();
        quad.render(&gl, &IDENTITY).unwrap();
        let calls = gl.calls();

        let pos = |pred: &dyn Fn(&GlCall) -> bool| {
            calls
                .iter()
                .position(|c| pred(c))
                .unwrap_or_else(|| panic!("missing call in: {calls:?}"))
        };
        let use_program = pos(&|c| matches!(c, GlCall::UseProgram { program: Some(_) }));
        let pointer = pos(&|c| matches!(c, GlCall::VertexAttribPointer { .. }));
        let color = pos(&|c| matches!(c, GlCall::Uniform4f { .. }));
        let matrix = pos(&|c| matches!(c, GlCall::UniformMatrix4f { .. }));
        let draw = pos(&|c| matches!(c, GlCall::DrawElements { .. }));
        let disable = pos(&|c| matches!(c, GlCall::DisableVertexAttribArray { .. }));

        assert!(use_program < pointer);
        assert!(pointer < color);
        assert!(color < matrix);
        assert!(matrix < draw);
        assert!(draw < disable);
    }

    #[test]
    fn position_attribute_uses_three_float_stride() {
        let (gl, mut lib) = setup();
        let mut quad = Quad::new(&gl, &mut lib, "a", &[]).unwrap();
        quad.render(&gl, &IDENTITY).unwrap();
        assert!(gl.calls().contains(&GlCall::VertexAttribPointer {
            index: 0,
            size: 3,
            normalized: false,
            stride: 12,
            offset: 0,
        }));
    }

    #[test]
    fn transform_is_uploaded_untransposed() {
        let (gl, mut lib) = setup();
        let mut quad = Quad::new(&gl, &mut lib, "a", &[]).unwrap();
        let transform = crate::transform::camera_mvp(1.5, 3.0);
        quad.render(&gl, &transform).unwrap();
        assert!(gl.calls().contains(&GlCall::UniformMatrix4f {
            location: Some(MVP_UNIFORM.to_string()),
            transpose: false,
            value: transform,
        }));
    }

    #[test]
    fn program_stays_bound_and_attribute_disabled_after_render() {
        let (gl, mut lib) = setup();
        let mut quad = Quad::new(&gl, &mut lib, "a", &[]).unwrap();
        quad.render(&gl, &IDENTITY).unwrap();
        assert_eq!(gl.current_program(), Some(quad.program()));
        assert!(gl.enabled_attribs().is_empty());
    }

    #[test]
    fn error_queries_follow_location_lookup_and_matrix_upload() {
        let (gl, mut lib) = setup();
        let mut quad = Quad::new(&gl, &mut lib, "a", &[]).unwrap();
        gl.clear_calls();
        quad.render(&gl, &IDENTITY).unwrap();
        assert_eq!(count(&gl, |c| matches!(c, GlCall::GetError { .. })), 2);
    }

    #[test]
    fn pending_gl_errors_do_not_abort_render() {
        let (gl, mut lib) = setup();
        let mut quad = Quad::new(&gl, &mut lib, "a", &[]).unwrap();
        gl.push_error(INVALID_VALUE);
        assert!(quad.render(&gl, &IDENTITY).is_ok());
        assert!(gl
            .calls()
            .contains(&GlCall::DrawElements { count: 6, offset: 0 }));
    }

    #[test]
    fn quads_share_one_program() {
        let (gl, mut lib) = setup();
        let a = Quad::new(&gl, &mut lib, "a", &[]).unwrap();
        let b = Quad::new(&gl, &mut lib, "b", &[0.0, 0.0, 1.0, 1.0]).unwrap();
        assert_eq!(a.program(), b.program());
        assert_eq!(lib.compilations(), 1);
        assert_ne!(a.vertex_buffer(), b.vertex_buffer());
    }

    #[test]
    fn quads_move_independently() {
        let (gl, mut lib) = setup();
        let mut a = Quad::new(&gl, &mut lib, "a", &[]).unwrap();
        let b = Quad::new(&gl, &mut lib, "b", &[]).unwrap();
        a.translate(1.0, 0.0);
        assert_eq!(b.vertex(0), Some([-0.5, 0.5, 0.0]));
    }

    #[test]
    fn strict_render_without_context_issues_nothing() {
        let (gl, mut lib) = setup();
        let mut quad = Quad::new(&gl, &mut lib, "a", &[]).unwrap();
        gl.set_current(false);
        gl.clear_calls();
        let err = quad.render(&gl, &IDENTITY).unwrap_err();
        assert!(matches!(err, QuadError::ContextNotCurrent));
        assert!(gl.calls().is_empty());
    }

    #[test]
    fn lenient_render_without_context_still_issues_draw() {
        let (gl, mut lib) = setup();
        let options = RenderOptions { strict: false };
        let mut quad = Quad::with_options(&gl, &mut lib, "a", &[], options).unwrap();
        gl.set_current(false);
        assert!(quad.render(&gl, &IDENTITY).is_ok());
        assert!(gl
            .calls()
            .contains(&GlCall::DrawElements { count: 6, offset: 0 }));
    }

    #[test]
    fn strict_construction_without_context_fails() {
        let (gl, mut lib) = setup();
        gl.set_current(false);
        let err = Quad::new(&gl, &mut lib, "a", &[]).unwrap_err();
        assert!(matches!(err, QuadError::ContextNotCurrent));
        assert_eq!(lib.compilations(), 0);
    }

    #[test]
    fn shader_failure_surfaces_from_construction() {
        let (gl, mut lib) = setup();
        gl.fail_compile(ShaderStage::Vertex, "0:3: 'uMVPMatrix' undeclared");
        let err = Quad::new(&gl, &mut lib, "a", &[]).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("vertex"), "missing stage in: {msg}");
        assert!(msg.contains("undeclared"), "missing log in: {msg}");
    }

    #[test]
    fn refused_buffer_surfaces_as_gl_error() {
        let (gl, mut lib) = setup();
        gl.refuse_buffers();
        let err = Quad::new(&gl, &mut lib, "a", &[]).unwrap_err();
        assert!(matches!(err, QuadError::Gl(_)), "got: {err:?}");
    }

    #[test]
    fn from_params_reads_id_color_and_strict() {
        let (gl, mut lib) = setup();
        let params = json!({"id": "sq9", "color": [0, 0, 1, 1], "strict": false});
        let quad = Quad::from_params(&gl, &mut lib, &params).unwrap();
        assert_eq!(quad.id(), "sq9");
        assert_eq!(quad.color(), Rgba::new(0.0, 0.0, 1.0, 1.0));
        assert!(!quad.options().strict);
    }

    #[test]
    fn from_params_falls_back_on_everything() {
        let (gl, mut lib) = setup();
        let params = json!({"color": [1, 0, 0], "id": 7});
        let quad = Quad::from_params(&gl, &mut lib, &params).unwrap();
        assert_eq!(quad.id(), DEFAULT_ID);
        assert_eq!(quad.color(), Rgba::DEFAULT);
        assert!(quad.options().strict);
    }

    proptest! {
        #[test]
        fn draw_order_never_changes(moves in proptest::collection::vec((-2.0f32..2.0, -2.0f32..2.0), 0..8)) {
            let (gl, mut lib) = setup();
            let mut quad = Quad::new(&gl, &mut lib, "p", &[]).unwrap();
            for (dx, dy) in moves {
                quad.translate(dx, dy);
                quad.render(&gl, &IDENTITY).unwrap();
            }
            prop_assert_eq!(quad.draw_order(), &[0u16, 1, 2, 0, 2, 3]);
            let indices = gl.buffer_contents(quad.index_buffer()).unwrap();
            prop_assert_eq!(indices.as_slice(), quad.geometry().index_bytes());
        }

        #[test]
        fn single_translate_shifts_every_vertex(dx in -3.0f32..3.0, dy in -3.0f32..3.0) {
            let (gl, mut lib) = setup();
            let mut quad = Quad::new(&gl, &mut lib, "p", &[]).unwrap();
            quad.translate(dx, dy);
            for i in 0..4 {
                let before = Geometry::unit_square().vertex(i).unwrap();
                let after = quad.vertex(i).unwrap();
                prop_assert!((after[0] - (before[0] + dx)).abs() < 1e-5);
                prop_assert!((after[1] - (before[1] + dy)).abs() < 1e-5);
                prop_assert_eq!(after[2], 0.0);
            }
        }
    }
}
