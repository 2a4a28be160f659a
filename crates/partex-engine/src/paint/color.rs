/// Straight-alpha RGBA color.
///
/// Invariant:
/// - constructors do not clamp; `to_rgba8` clamps when quantizing.
///
/// Gradient stops are authored in straight alpha. Rasterized output is
/// coverage-scaled on all four channels, which is what the particle blend
/// presets expect.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);
    pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);

    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a color from straight RGBA bytes (`0`–`255`).
    #[inline]
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, a as f32 / 255.0)
    }

    /// Parses `#rrggbb` or `#rrggbbaa` (the leading `#` is optional).
    ///
    /// Six-digit colors are opaque.
    pub fn from_hex(src: &str) -> Option<Self> {
        let hex = src.trim().strip_prefix('#').unwrap_or(src.trim());
        if !(hex.len() == 6 || hex.len() == 8) || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        let a = if hex.len() == 8 { byte(6)? } else { 255 };
        Some(Self::from_rgba8(byte(0)?, byte(2)?, byte(4)?, a))
    }

    /// Formats as `#rrggbbaa`.
    pub fn to_hex(self) -> String {
        let [r, g, b, a] = self.to_rgba8();
        format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
    }

    /// Quantizes to bytes with round-to-nearest, clamping out-of-range channels.
    #[inline]
    pub fn to_rgba8(self) -> [u8; 4] {
        [
            unorm8(self.r),
            unorm8(self.g),
            unorm8(self.b),
            unorm8(self.a),
        ]
    }

    /// Linear interpolation in straight alpha.
    #[inline]
    pub fn lerp(self, other: Color, t: f32) -> Color {
        Color::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
            self.a + (other.a - self.a) * t,
        )
    }

    /// Scales every channel, alpha included.
    #[inline]
    pub fn scaled(self, k: f32) -> Color {
        Color::new(self.r * k, self.g * k, self.b * k, self.a * k)
    }
}

/// Float to 8-bit unorm, matching the GPU's rgba8unorm store conversion.
#[inline]
pub(crate) fn unorm8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}
