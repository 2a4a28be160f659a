use core::ops::{Add, Mul, Sub};

/// 2D vector in normalized texture space.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    #[inline]
    pub fn dot(self, rhs: Vec2) -> f32 {
        self.x * rhs.x + self.y * rhs.y
    }

    #[inline]
    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Component-wise absolute value.
    #[inline]
    pub fn abs(self) -> Vec2 {
        Vec2::new(self.x.abs(), self.y.abs())
    }

    /// Component-wise maximum.
    #[inline]
    pub fn max(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x.max(rhs.x), self.y.max(rhs.y))
    }

    /// Component-wise product.
    #[inline]
    pub fn mul_elem(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x * rhs.x, self.y * rhs.y)
    }

    /// Angle measured clockwise from +Y, in `(-PI, PI]`.
    ///
    /// Polygon and petal formulas use this so that a vertex sits at the top.
    #[inline]
    pub fn angle_from_up(self) -> f32 {
        self.x.atan2(self.y)
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    #[inline]
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    #[inline]
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    #[inline]
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_of_unit_axes() {
        assert_eq!(Vec2::new(1.0, 0.0).length(), 1.0);
        assert_eq!(Vec2::new(0.0, -1.0).length(), 1.0);
    }

    #[test]
    fn angle_from_up_is_zero_on_positive_y() {
        assert_eq!(Vec2::new(0.0, 1.0).angle_from_up(), 0.0);
        assert!((Vec2::new(1.0, 0.0).angle_from_up() - core::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn abs_and_max_are_component_wise() {
        let v = Vec2::new(-2.0, 3.0);
        assert_eq!(v.abs(), Vec2::new(2.0, 3.0));
        assert_eq!(v.max(Vec2::zero()), Vec2::new(0.0, 3.0));
    }
}
