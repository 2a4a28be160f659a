//! Particle shapes and their coverage/gradient mapping.
//!
//! Every shape is described by a signed distance in shape space (negative
//! inside) plus a ramp that picks the gradient coordinate. The CPU reference
//! rasterizer calls [`Shape::sample`]; `render/shaders/particle.wgsl` carries
//! the same formulas for the compute kernel, keyed by [`Shape::id`].

mod sdf;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::coords::Vec2;

/// Edge band width in texels for hard-edged shapes.
pub const EDGE_TEXELS: f32 = 1.5;

/// Shape selector. Discriminants are the kernel's shape ids.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    #[default]
    Circle = 0,
    Triangle = 1,
    Rectangle = 2,
    Pentagon = 3,
    Hexagon = 4,
    Heptagon = 5,
    Octagon = 6,
    Flower = 7,
    Blob = 8,
    Star = 9,
    SoftRect = 10,
    Blade = 11,
    Rhombus = 12,
}

/// How a shape derives its gradient coordinate.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Ramp {
    /// `|p| / outer_radius`.
    Radial { outer_radius: f32 },
    /// `1 + d / inradius`: 0 at the center, 1 on the edge.
    Inset { inradius: f32 },
    /// `0.5 - p.y`: 0 at the top row, 1 at the bottom row.
    Linear,
}

/// Result of evaluating a shape at one point.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ShapeSample {
    /// Coverage in `[0, 1]`.
    pub coverage: f32,
    /// Gradient lookup coordinate in `[0, 1]`.
    pub gradient: f32,
}

impl Shape {
    pub const ALL: [Shape; 13] = [
        Shape::Circle,
        Shape::Triangle,
        Shape::Rectangle,
        Shape::Pentagon,
        Shape::Hexagon,
        Shape::Heptagon,
        Shape::Octagon,
        Shape::Flower,
        Shape::Blob,
        Shape::Star,
        Shape::SoftRect,
        Shape::Blade,
        Shape::Rhombus,
    ];

    /// Kernel shape id.
    #[inline]
    pub const fn id(self) -> u32 {
        self as u32
    }

    pub fn from_id(id: u32) -> Option<Shape> {
        Shape::ALL.get(id as usize).copied()
    }

    pub const fn name(self) -> &'static str {
        match self {
            Shape::Circle => "circle",
            Shape::Triangle => "triangle",
            Shape::Rectangle => "rectangle",
            Shape::Pentagon => "pentagon",
            Shape::Hexagon => "hexagon",
            Shape::Heptagon => "heptagon",
            Shape::Octagon => "octagon",
            Shape::Flower => "flower",
            Shape::Blob => "blob",
            Shape::Star => "star",
            Shape::SoftRect => "soft_rect",
            Shape::Blade => "blade",
            Shape::Rhombus => "rhombus",
        }
    }

    /// Signed distance at `p`, negative inside.
    pub fn distance(self, p: Vec2) -> f32 {
        match self {
            Shape::Circle => sdf::circle(p, sdf::CIRCLE_RADIUS),
            Shape::Triangle => sdf::regular_polygon(p, sdf::POLYGON_RADIUS, 3),
            Shape::Rectangle => sdf::rect(p, sdf::RECT_HALF),
            Shape::Pentagon => sdf::regular_polygon(p, sdf::POLYGON_RADIUS, 5),
            Shape::Hexagon => sdf::regular_polygon(p, sdf::POLYGON_RADIUS, 6),
            Shape::Heptagon => sdf::regular_polygon(p, sdf::POLYGON_RADIUS, 7),
            Shape::Octagon => sdf::regular_polygon(p, sdf::POLYGON_RADIUS, 8),
            Shape::Flower => sdf::flower(p),
            Shape::Blob => sdf::blob(p),
            Shape::Star => sdf::star5(p, sdf::STAR_RADIUS, sdf::STAR_INNER),
            Shape::SoftRect => sdf::rounded_rect(p, sdf::SOFT_RECT_HALF, sdf::SOFT_RECT_CORNER),
            Shape::Blade => sdf::vesica(p),
            Shape::Rhombus => sdf::rhombus(p, sdf::RHOMBUS_HALF),
        }
    }

    pub fn ramp(self) -> Ramp {
        match self {
            Shape::Circle => Ramp::Radial { outer_radius: sdf::CIRCLE_RADIUS },
            Shape::Flower => Ramp::Radial { outer_radius: sdf::FLOWER_ORBIT + sdf::FLOWER_PETAL },
            Shape::Blob => Ramp::Radial { outer_radius: sdf::BLOB_BASE + sdf::BLOB_AMP },
            Shape::Star => Ramp::Radial { outer_radius: sdf::STAR_RADIUS },
            Shape::Triangle => polygon_ramp(3),
            Shape::Pentagon => polygon_ramp(5),
            Shape::Hexagon => polygon_ramp(6),
            Shape::Heptagon => polygon_ramp(7),
            Shape::Octagon => polygon_ramp(8),
            Shape::Rhombus => Ramp::Inset { inradius: sdf::rhombus_inradius(sdf::RHOMBUS_HALF) },
            Shape::Rectangle | Shape::SoftRect | Shape::Blade => Ramp::Linear,
        }
    }

    /// Extra edge softness in shape units; 0 for hard-edged shapes.
    pub fn feather(self) -> f32 {
        match self {
            Shape::SoftRect => sdf::SOFT_RECT_FEATHER,
            Shape::Blob => sdf::BLOB_FEATHER,
            _ => 0.0,
        }
    }

    /// Width of the coverage transition at `resolution`.
    #[inline]
    pub fn edge_band(self, resolution: u32) -> f32 {
        (EDGE_TEXELS / resolution.max(1) as f32).max(self.feather())
    }

    /// Evaluates coverage and gradient coordinate at `p`.
    pub fn sample(self, p: Vec2, resolution: u32) -> ShapeSample {
        let d = self.distance(p);
        let coverage = (0.5 - d / self.edge_band(resolution)).clamp(0.0, 1.0);
        let gradient = match self.ramp() {
            Ramp::Radial { outer_radius } => p.length() / outer_radius,
            Ramp::Inset { inradius } => 1.0 + d / inradius,
            Ramp::Linear => 0.5 - p.y,
        };
        ShapeSample {
            coverage,
            gradient: gradient.clamp(0.0, 1.0),
        }
    }
}

fn polygon_ramp(sides: u32) -> Ramp {
    Ramp::Inset {
        inradius: sdf::polygon_inradius(sdf::POLYGON_RADIUS, sides),
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a shape name does not match any variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown shape `{0}`")]
pub struct UnknownShape(pub String);

impl FromStr for Shape {
    type Err = UnknownShape;

    /// Accepts snake_case names, ignoring case, hyphens and spaces.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        Shape::ALL
            .into_iter()
            .find(|shape| shape.name().replace('_', "") == norm)
            .ok_or_else(|| UnknownShape(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::texel_center;
    use std::f32::consts::PI;

    fn rotate(p: Vec2, angle: f32) -> Vec2 {
        let (s, c) = angle.sin_cos();
        Vec2::new(p.x * c - p.y * s, p.x * s + p.y * c)
    }

    fn mirror_x(p: Vec2) -> Vec2 {
        Vec2::new(-p.x, p.y)
    }

    // ── identity ───────────────────────────────────────────────────────────

    #[test]
    fn ids_round_trip() {
        for (i, shape) in Shape::ALL.into_iter().enumerate() {
            assert_eq!(shape.id(), i as u32);
            assert_eq!(Shape::from_id(i as u32), Some(shape));
        }
        assert_eq!(Shape::from_id(13), None);
    }

    #[test]
    fn names_parse_back() {
        for shape in Shape::ALL {
            assert_eq!(shape.to_string().parse::<Shape>(), Ok(shape));
        }
        assert_eq!("SoftRect".parse::<Shape>(), Ok(Shape::SoftRect));
        assert_eq!("soft-rect".parse::<Shape>(), Ok(Shape::SoftRect));
        assert!("dodecagon".parse::<Shape>().is_err());
    }

    // ── coverage contract ──────────────────────────────────────────────────

    #[test]
    fn center_is_covered_and_corners_are_not() {
        for shape in Shape::ALL {
            let center = shape.sample(Vec2::zero(), 256);
            assert_eq!(center.coverage, 1.0, "{shape} center");
            let corner = shape.sample(Vec2::new(-0.49, 0.49), 256);
            assert_eq!(corner.coverage, 0.0, "{shape} corner");
        }
    }

    #[test]
    fn coverage_is_monotonic_along_rays() {
        for shape in Shape::ALL {
            for k in 0..16 {
                let dir = rotate(Vec2::new(0.0, 1.0), k as f32 * PI / 8.0 + 0.1);
                let mut prev = 1.0f32;
                for step in 0..=70 {
                    let r = step as f32 * 0.01;
                    let c = shape.sample(dir * r, 128).coverage;
                    assert!(c <= prev + 1e-4, "{shape} ray {k} step {step}: {c} > {prev}");
                    prev = c;
                }
            }
        }
    }

    #[test]
    fn coverage_is_continuous() {
        // Neighboring texels never jump by more than the edge band allows.
        let res = 256;
        for shape in Shape::ALL {
            let max_step = (1.0 / res as f32) / shape.edge_band(res) * 2.0 + 1e-3;
            for py in 0..res {
                for px in 1..res {
                    let a = shape.sample(texel_center(px - 1, py, res), res).coverage;
                    let b = shape.sample(texel_center(px, py, res), res).coverage;
                    assert!((a - b).abs() <= max_step, "{shape} at ({px},{py}): {a} vs {b}");
                }
            }
        }
    }

    // ── symmetry ───────────────────────────────────────────────────────────

    #[test]
    fn shapes_are_mirror_symmetric() {
        for shape in Shape::ALL {
            for i in 0..40 {
                let p = Vec2::new(0.013 * i as f32 - 0.26, 0.4 - 0.021 * i as f32);
                let a = shape.distance(p);
                let b = shape.distance(mirror_x(p));
                assert!((a - b).abs() < 1e-4, "{shape} at {p:?}");
            }
        }
    }

    #[test]
    fn shapes_have_rotational_symmetry() {
        let folds = [
            (Shape::Circle, 12),
            (Shape::Triangle, 3),
            (Shape::Rectangle, 4),
            (Shape::Pentagon, 5),
            (Shape::Hexagon, 6),
            (Shape::Heptagon, 7),
            (Shape::Octagon, 8),
            (Shape::Flower, 6),
            (Shape::Blob, 3),
            (Shape::Star, 5),
            (Shape::SoftRect, 4),
            (Shape::Blade, 2),
            (Shape::Rhombus, 2),
        ];
        for (shape, n) in folds {
            let step = 2.0 * PI / n as f32;
            for i in 0..30 {
                let p = Vec2::new(0.31 - 0.017 * i as f32, 0.05 + 0.011 * i as f32);
                let a = shape.distance(p);
                let b = shape.distance(rotate(p, step));
                assert!((a - b).abs() < 1e-3, "{shape} {n}-fold at {p:?}: {a} vs {b}");
            }
        }
    }

    // ── gradient coordinate ────────────────────────────────────────────────

    #[test]
    fn radial_ramp_runs_center_to_rim() {
        assert_eq!(Shape::Circle.sample(Vec2::zero(), 64).gradient, 0.0);
        let rim = Shape::Circle.sample(Vec2::new(0.0, 0.45), 64).gradient;
        assert!((rim - 1.0).abs() < 1e-5);
    }

    #[test]
    fn inset_ramp_is_zero_at_center() {
        let g = Shape::Hexagon.sample(Vec2::zero(), 64).gradient;
        assert!(g.abs() < 1e-4, "{g}");
    }

    #[test]
    fn linear_ramp_is_half_at_center() {
        assert_eq!(Shape::Rectangle.sample(Vec2::zero(), 64).gradient, 0.5);
        assert_eq!(Shape::Blade.sample(Vec2::new(0.0, 0.5), 64).gradient, 0.0);
    }

    #[test]
    fn soft_shapes_have_wide_bands() {
        assert!(Shape::Blob.edge_band(1024) > Shape::Circle.edge_band(1024));
        assert!(Shape::SoftRect.edge_band(1024) > Shape::Rectangle.edge_band(1024));
        assert_eq!(Shape::Circle.edge_band(32), EDGE_TEXELS / 32.0);
    }
}
