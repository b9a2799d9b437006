#![deny(unsafe_code)]
//! A flat-colored, movable quad drawn through an OpenGL ES 2.0 style context.
//!
//! Provides the `Quad` primitive, its CPU-side `Geometry` and `Rgba` color,
//! the `GlBackend` seam over the graphics context (with a `glow` backend
//! behind the `glow` feature and an in-memory `RecordingGl`), the
//! compile-once `ShaderLibrary`, and column-major transform helpers.

pub mod color;
pub mod error;
pub mod geometry;
pub mod params;
pub mod quad;
pub mod render;
pub mod transform;

pub use color::Rgba;
pub use error::QuadError;
pub use geometry::Geometry;
pub use quad::{Quad, RenderOptions};
pub use render::{GlBackend, RecordingGl, ShaderLibrary};
