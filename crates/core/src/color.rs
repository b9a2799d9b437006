//! RGBA color used as the quad's uniform fill.
//!
//! Components are `f32` because they are uploaded as-is to a `vec4`
//! uniform. Values are expected in [0, 1] but are not clamped; the
//! fragment stage writes them through unchanged.

use serde::{Deserialize, Serialize};

/// Straight (non-premultiplied) RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    /// The color a quad gets when no usable color is supplied.
    pub const DEFAULT: Rgba = Rgba::new(0.636_718_75, 0.769_531_25, 0.222_656_25, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Builds a color from exactly four components.
    ///
    /// Returns `None` for any other length so callers can decide what to
    /// fall back to.
    pub fn from_components(components: &[f32]) -> Option<Rgba> {
        match *components {
            [r, g, b, a] => Some(Rgba::new(r, g, b, a)),
            _ => None,
        }
    }

    /// Like [`Rgba::from_components`], but keeps [`Rgba::DEFAULT`] when the
    /// slice does not have exactly four components.
    pub fn from_components_or_default(components: &[f32]) -> Rgba {
        Self::from_components(components).unwrap_or_else(|| {
            log::debug!(
                "color has {} components, expected 4; keeping default",
                components.len()
            );
            Rgba::DEFAULT
        })
    }

    /// Component array in uniform upload order.
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Rgba::DEFAULT
    }
}

impl From<[f32; 4]> for Rgba {
    fn from([r, g, b, a]: [f32; 4]) -> Self {
        Rgba::new(r, g, b, a)
    }
}
