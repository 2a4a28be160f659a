use image::{Rgba, RgbaImage};

use super::{Color, Gradient};

/// Default lookup width (gradient samples).
pub const LOOKUP_WIDTH: u32 = 128;
/// Default lookup height (redundant rows).
pub const LOOKUP_HEIGHT: u32 = 32;

/// A gradient baked into a 2-D RGBA8 image for kernel sampling.
///
/// Column `x` holds `gradient.evaluate(x / width)`; every row is identical.
/// Sampling clamps to the edge columns.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientLookup {
    image: RgbaImage,
}

impl GradientLookup {
    #[inline]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    #[inline]
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Raw RGBA8 bytes, row-major, tightly packed.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// Column index a gradient coordinate reads from.
    #[inline]
    pub fn column(&self, g: f32) -> u32 {
        let w = self.image.width();
        let x = (g * w as f32).floor();
        if x.is_nan() || x <= 0.0 {
            0
        } else {
            (x as u32).min(w - 1)
        }
    }

    /// Samples row 0 at gradient coordinate `g` (clamped).
    #[inline]
    pub fn sample(&self, g: f32) -> Color {
        let Rgba([r, g8, b, a]) = *self.image.get_pixel(self.column(g), 0);
        Color::from_rgba8(r, g8, b, a)
    }
}

/// Bakes `gradient` into a `width × height` lookup.
///
/// Each column is evaluated once and replicated down all rows. Zero
/// dimensions are raised to 1.
pub fn bake(gradient: &Gradient, width: u32, height: u32) -> GradientLookup {
    let width = width.max(1);
    let height = height.max(1);

    let columns: Vec<[u8; 4]> = (0..width)
        .map(|x| gradient.evaluate(x as f32 / width as f32).to_rgba8())
        .collect();

    let image = RgbaImage::from_fn(width, height, |x, _| Rgba(columns[x as usize]));
    GradientLookup { image }
}
