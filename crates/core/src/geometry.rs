//! CPU-side vertex and index data for the quad.
//!
//! Positions live in one contiguous `Vec<f32>` laid out as `x, y, z` per
//! vertex. Mutations happen in place and set a dirty flag; the owner
//! uploads [`Geometry::vertex_bytes`] when it next renders and clears the
//! flag with [`Geometry::take_dirty`].

/// Number of floats per vertex position.
pub const COORDS_PER_VERTEX: usize = 3;

/// Byte distance between consecutive vertices in the vertex buffer.
pub const VERTEX_STRIDE: usize = COORDS_PER_VERTEX * std::mem::size_of::<f32>();

/// Index order splitting the quad into two triangles.
pub const DRAW_ORDER: [u16; 6] = [0, 1, 2, 0, 2, 3];

/// Unit square centered at the origin in the XY plane.
///
/// Order: top left, bottom left, bottom right, top right.
pub const UNIT_SQUARE: [f32; 12] = [
    -0.5, 0.5, 0.0, //
    -0.5, -0.5, 0.0, //
    0.5, -0.5, 0.0, //
    0.5, 0.5, 0.0,
];

/// Vertex positions plus the fixed index list.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    positions: Vec<f32>,
    dirty: bool,
}

impl Geometry {
    /// Creates geometry from packed `x, y, z` positions.
    ///
    /// Trailing floats that do not form a whole vertex are dropped.
    pub fn from_positions(positions: &[f32]) -> Self {
        let whole = positions.len() - positions.len() % COORDS_PER_VERTEX;
        Self {
            positions: positions[..whole].to_vec(),
            dirty: false,
        }
    }

    /// The initial quad: [`UNIT_SQUARE`].
    pub fn unit_square() -> Self {
        Self::from_positions(&UNIT_SQUARE)
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / COORDS_PER_VERTEX
    }

    /// Returns vertex `index` as `[x, y, z]`, or `None` past the end.
    pub fn vertex(&self, index: usize) -> Option<[f32; 3]> {
        let start = index.checked_mul(COORDS_PER_VERTEX)?;
        let end = start.checked_add(COORDS_PER_VERTEX)?;
        match self.positions.get(start..end)? {
            &[x, y, z] => Some([x, y, z]),
            _ => None,
        }
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn draw_order(&self) -> &'static [u16] {
        &DRAW_ORDER
    }

    /// Shifts every vertex by `dx` along X and `dy` along Y. Z is untouched.
    pub fn translate(&mut self, dx: f32, dy: f32) {
        for vertex in self.positions.chunks_exact_mut(COORDS_PER_VERTEX) {
            vertex[0] += dx;
            vertex[1] += dy;
        }
        self.dirty = true;
    }

    /// Native-endian bytes of the position array, as uploaded to the GPU.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Native-endian bytes of [`DRAW_ORDER`].
    pub fn index_bytes(&self) -> &'static [u8] {
        bytemuck::cast_slice(&DRAW_ORDER)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clears the dirty flag, returning whether it was set.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self::unit_square()
    }
}
