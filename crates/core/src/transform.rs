//! Column-major transform helpers.
//!
//! `render` takes a plain `[f32; 16]` in column-major order, which is what
//! `glam::Mat4::to_cols_array` produces and what `glUniformMatrix4fv`
//! expects with `transpose = false`.

use glam::{Mat4, Vec3};

/// Identity transform: model space is clip space.
pub const IDENTITY: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

/// Combines `projection * view * model` into a column-major array.
pub fn mvp(projection: Mat4, view: Mat4, model: Mat4) -> [f32; 16] {
    (projection * view * model).to_cols_array()
}

/// Perspective frustum plus a camera on +Z looking at the origin.
///
/// `aspect` is width over height. The camera sits at `distance` along +Z
/// with +Y up, so a unit quad at the origin fills most of the view.
pub fn camera_mvp(aspect: f32, distance: f32) -> [f32; 16] {
    let projection = Mat4::perspective_rh_gl(45f32.to_radians(), aspect.max(f32::EPSILON), 0.1, 100.0);
    let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, distance), Vec3::ZERO, Vec3::Y);
    mvp(projection, view, Mat4::IDENTITY)
}

/// Applies a column-major matrix to a point, returning clip coordinates.
pub fn apply(transform: &[f32; 16], point: [f32; 3]) -> [f32; 4] {
    let m = Mat4::from_cols_array(transform);
    m.mul_vec4(Vec3::from(point).extend(1.0)).to_array()
}
