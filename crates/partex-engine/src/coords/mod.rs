//! Coordinate types shared by the shape formulas and the rasterizers.
//!
//! Canonical shape space:
//! - the texture spans `[-0.5, 0.5]` on both axes
//! - origin at the texture center
//! - +X right, +Y up (image rows run the other way)
//!
//! The compute kernel mirrors the same convention in WGSL.

mod vec2;

pub use vec2::Vec2;

/// Maps the center of texel `(px, py)` of a `resolution`-sized image into
/// shape space.
#[inline]
pub fn texel_center(px: u32, py: u32, resolution: u32) -> Vec2 {
    let inv = 1.0 / resolution.max(1) as f32;
    let u = (px as f32 + 0.5) * inv;
    let v = (py as f32 + 0.5) * inv;
    Vec2::new(u - 0.5, 0.5 - v)
}
