//! Signed distance functions in shape space (+Y up, texture spans ±0.5).
//!
//! Keep in sync with `render/shaders/particle.wgsl`.

use std::f32::consts::PI;

use crate::coords::Vec2;

pub(super) const CIRCLE_RADIUS: f32 = 0.45;
/// Circumradius of the regular polygons.
pub(super) const POLYGON_RADIUS: f32 = 0.45;
pub(super) const RECT_HALF: Vec2 = Vec2::new(0.35, 0.35);

pub(super) const SOFT_RECT_HALF: Vec2 = Vec2::new(0.28, 0.28);
pub(super) const SOFT_RECT_CORNER: f32 = 0.1;
pub(super) const SOFT_RECT_FEATHER: f32 = 0.12;

/// Half diagonals (x, y).
pub(super) const RHOMBUS_HALF: Vec2 = Vec2::new(0.3, 0.45);

pub(super) const STAR_RADIUS: f32 = 0.45;
pub(super) const STAR_INNER: f32 = 0.45;

pub(super) const FLOWER_CORE: f32 = 0.2;
pub(super) const FLOWER_ORBIT: f32 = 0.25;
pub(super) const FLOWER_PETAL: f32 = 0.19;
const FLOWER_PETALS: u32 = 6;

pub(super) const BLOB_BASE: f32 = 0.3;
pub(super) const BLOB_AMP: f32 = 0.03;
pub(super) const BLOB_FEATHER: f32 = 0.3;

// Vesica arcs: tips at ±0.45 on Y, half width 0.08 on X.
const BLADE_ARC_RADIUS: f32 = 1.305_625;
const BLADE_ARC_OFFSET: f32 = 1.225_625;

#[inline]
pub(super) fn circle(p: Vec2, r: f32) -> f32 {
    p.length() - r
}

pub(super) fn rect(p: Vec2, half: Vec2) -> f32 {
    let q = p.abs() - half;
    q.max(Vec2::zero()).length() + q.x.max(q.y).min(0.0)
}

pub(super) fn rounded_rect(p: Vec2, half: Vec2, corner: f32) -> f32 {
    rect(p, half - Vec2::new(corner, corner)) - corner
}

/// Regular `n`-gon with circumradius `r` and a vertex pointing up.
pub(super) fn regular_polygon(p: Vec2, r: f32, n: u32) -> f32 {
    let an = PI / n as f32;
    let (sin_an, cos_an) = an.sin_cos();

    // Fold into the canonical sector; the edge midpoint lies on +X there.
    let bn = p.angle_from_up().rem_euclid(2.0 * an) - an;
    let (sin_bn, cos_bn) = bn.sin_cos();
    let mut q = Vec2::new(cos_bn, sin_bn.abs()) * p.length();

    q = q - Vec2::new(cos_an, sin_an) * r;
    q.y += (-q.y).clamp(0.0, r * sin_an);
    q.length() * q.x.signum()
}

#[inline]
pub(super) fn polygon_inradius(r: f32, n: u32) -> f32 {
    r * (PI / n as f32).cos()
}

pub(super) fn rhombus(p: Vec2, half: Vec2) -> f32 {
    let p = p.abs();
    let b = half;
    let w = b - p * 2.0;
    let ndot = w.x * b.x - w.y * b.y;
    let h = (ndot / b.dot(b)).clamp(-1.0, 1.0);
    let d = (p - b.mul_elem(Vec2::new(1.0 - h, 1.0 + h)) * 0.5).length();
    d * (p.x * b.y + p.y * b.x - b.x * b.y).signum()
}

#[inline]
pub(super) fn rhombus_inradius(half: Vec2) -> f32 {
    half.x * half.y / half.length()
}

/// Five-pointed star, one point up. `rf` sets how deep the notches cut.
pub(super) fn star5(p: Vec2, r: f32, rf: f32) -> f32 {
    let k1 = Vec2::new(0.809_017, -0.587_785);
    let k2 = Vec2::new(-k1.x, k1.y);

    let mut p = Vec2::new(p.x.abs(), p.y);
    p = p - k1 * (2.0 * k1.dot(p).max(0.0));
    p = p - k2 * (2.0 * k2.dot(p).max(0.0));
    p.x = p.x.abs();
    p.y -= r;

    let ba = Vec2::new(-k1.y, k1.x) * rf - Vec2::new(0.0, 1.0);
    let h = (p.dot(ba) / ba.dot(ba)).clamp(0.0, r);
    (p - ba * h).length() * (p.y * ba.x - p.x * ba.y).signum()
}

/// Central disk plus six overlapping petal disks, one petal up.
pub(super) fn flower(p: Vec2) -> f32 {
    let mut d = circle(p, FLOWER_CORE);
    for k in 0..FLOWER_PETALS {
        let a = k as f32 * 2.0 * PI / FLOWER_PETALS as f32;
        let center = Vec2::new(a.sin(), a.cos()) * FLOWER_ORBIT;
        d = d.min(circle(p - center, FLOWER_PETAL));
    }
    d
}

/// Soft disk with a slight three-lobed wobble.
pub(super) fn blob(p: Vec2) -> f32 {
    let radius = BLOB_BASE + BLOB_AMP * (3.0 * p.angle_from_up()).cos();
    p.length() - radius
}

/// Vertical lens shape.
pub(super) fn vesica(p: Vec2) -> f32 {
    let p = p.abs();
    let r = BLADE_ARC_RADIUS;
    let d = BLADE_ARC_OFFSET;
    let b = (r * r - d * d).sqrt();
    if (p.y - b) * d > p.x * b {
        (p - Vec2::new(0.0, b)).length()
    } else {
        (p - Vec2::new(-d, 0.0)).length() - r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polygon_vertex_points_up() {
        assert!(regular_polygon(Vec2::new(0.0, POLYGON_RADIUS), POLYGON_RADIUS, 3).abs() < 1e-5);
        assert!(regular_polygon(Vec2::new(0.0, -POLYGON_RADIUS), POLYGON_RADIUS, 3) > 0.1);
    }

    #[test]
    fn polygon_center_is_minus_inradius() {
        for n in 3..=8 {
            let d = regular_polygon(Vec2::zero(), POLYGON_RADIUS, n);
            assert!((d + polygon_inradius(POLYGON_RADIUS, n)).abs() < 1e-5, "n={n}");
        }
    }

    #[test]
    fn rhombus_center_is_minus_inradius() {
        let d = rhombus(Vec2::zero(), RHOMBUS_HALF);
        assert!((d + rhombus_inradius(RHOMBUS_HALF)).abs() < 1e-5);
    }

    #[test]
    fn star_tip_is_on_boundary() {
        assert!(star5(Vec2::new(0.0, STAR_RADIUS), STAR_RADIUS, STAR_INNER).abs() < 1e-4);
        assert!(star5(Vec2::zero(), STAR_RADIUS, STAR_INNER) < 0.0);
    }

    #[test]
    fn vesica_tips_and_waist() {
        assert!(vesica(Vec2::new(0.0, 0.45)).abs() < 1e-3);
        assert!((vesica(Vec2::zero()) + 0.08).abs() < 1e-3);
        assert!(vesica(Vec2::new(0.1, 0.0)) > 0.0);
    }

    #[test]
    fn flower_petal_tip_is_on_boundary() {
        let tip = Vec2::new(0.0, FLOWER_ORBIT + FLOWER_PETAL);
        assert!(flower(tip).abs() < 1e-5);
    }

    #[test]
    fn rounded_rect_matches_rect_on_flat_sides() {
        let p = Vec2::new(0.0, 0.4);
        let a = rounded_rect(p, SOFT_RECT_HALF, SOFT_RECT_CORNER);
        assert!((a - (0.4 - SOFT_RECT_HALF.y)).abs() < 1e-5);
    }
}
