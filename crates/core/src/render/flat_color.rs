//! GLSL ES 1.00 sources for the flat-color program.
//!
//! The vertex stage multiplies each position by `uMVPMatrix`. The matrix
//! must come first: positions are column vectors and the matrix is
//! column-major, so `vPosition * uMVPMatrix` would apply the transpose.

/// Attribute carrying model-space vertex positions.
pub const POSITION_ATTRIBUTE: &str = "vPosition";

/// Uniform holding the RGBA fill color.
pub const COLOR_UNIFORM: &str = "vColor";

/// Uniform holding the combined projection × view × model matrix.
pub const MVP_UNIFORM: &str = "uMVPMatrix";

/// Vertex stage: `gl_Position = uMVPMatrix * vPosition`.
pub const FLAT_COLOR_VERTEX_SHADER: &str = r#"uniform mat4 uMVPMatrix;
attribute vec4 vPosition;
void main() {
    gl_Position = uMVPMatrix * vPosition;
}
"#;

/// Fragment stage: every fragment gets `vColor`, unlit and untextured.
pub const FLAT_COLOR_FRAGMENT_SHADER: &str = r#"precision mediump float;
uniform vec4 vColor;
void main() {
    gl_FragColor = vColor;
}
"#;
