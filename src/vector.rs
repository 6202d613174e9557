use std::ops::{Add, Div, Mul, Neg, Sub};

/// 2D vector in map space. X grows east, Y grows north.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing at `radians` (counter-clockwise from +X).
    #[inline]
    pub fn from_angle(radians: f64) -> Self {
        let (s, c) = radians.sin_cos();
        Self { x: c, y: s }
    }

    #[inline]
    pub fn magnitude(self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Unit-length copy. The zero vector is returned unchanged.
    #[inline]
    pub fn normalized(self) -> Self {
        let mag = self.magnitude();
        if mag == 0.0 {
            return self;
        }
        self / mag
    }

    #[inline]
    pub fn angle(self) -> f64 {
        self.y.atan2(self.x)
    }

    #[inline]
    pub fn dot(self, other: Vec2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Rotate in place, counter-clockwise. Only meant for scratch values.
    #[inline]
    pub fn rotate(&mut self, radians: f64) {
        let (s, c) = radians.sin_cos();
        let x2 = self.x * c - self.y * s;
        let y2 = self.y * c + self.x * s;
        self.x = x2;
        self.y = y2;
    }

    #[inline]
    pub fn rotated(mut self, radians: f64) -> Self {
        self.rotate(radians);
        self
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

impl Mul<f64> for Vec2 {
    type Output = Vec2;
    #[inline]
    fn mul(self, scalar: f64) -> Vec2 {
        Vec2::new(self.x * scalar, self.y * scalar)
    }
}

impl Mul<Vec2> for f64 {
    type Output = Vec2;
    #[inline]
    fn mul(self, v: Vec2) -> Vec2 {
        v * self
    }
}

impl Div<f64> for Vec2 {
    type Output = Vec2;
    #[inline]
    fn div(self, scalar: f64) -> Vec2 {
        Vec2::new(self.x / scalar, self.y / scalar)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    #[inline]
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn close(a: Vec2, b: Vec2) -> bool {
        (a.x - b.x).abs() < 1e-12 && (a.y - b.y).abs() < 1e-12
    }

    #[test]
    fn arithmetic_produces_new_values() {
        let a = Vec2::new(1.0, 2.0);
        let b = Vec2::new(3.0, -4.0);
        assert_eq!(a + b, Vec2::new(4.0, -2.0));
        assert_eq!(a - b, Vec2::new(-2.0, 6.0));
        assert_eq!(a * 2.0, Vec2::new(2.0, 4.0));
        assert_eq!(2.0 * a, Vec2::new(2.0, 4.0));
        assert_eq!(b / 2.0, Vec2::new(1.5, -2.0));
        assert_eq!(-a, Vec2::new(-1.0, -2.0));
        assert_eq!(a, Vec2::new(1.0, 2.0));
    }

    #[test]
    fn magnitude_and_normalize() {
        let v = Vec2::new(3.0, 4.0);
        assert_eq!(v.magnitude(), 5.0);
        assert!(close(v.normalized(), Vec2::new(0.6, 0.8)));
    }

    #[test]
    fn normalize_zero_is_zero() {
        assert_eq!(Vec2::ZERO.normalized(), Vec2::ZERO);
    }

    #[test]
    fn angle_roundtrips_through_from_angle() {
        for a in [-3.0, -1.0, 0.0, 0.5, FRAC_PI_2, 3.0] {
            assert!((Vec2::from_angle(a).angle() - a).abs() < 1e-12);
        }
    }

    #[test]
    fn dot_product() {
        assert_eq!(Vec2::new(2.0, -5.0).dot(Vec2::new(-3.0, 1.0)), -11.0);
        assert_eq!(Vec2::new(1.0, 0.0).dot(Vec2::new(0.0, 1.0)), 0.0);
    }

    #[test]
    fn rotate_quarter_and_half_turns() {
        let mut v = Vec2::new(1.0, 0.0);
        v.rotate(FRAC_PI_2);
        assert!(close(v, Vec2::new(0.0, 1.0)));
        v.rotate(PI);
        assert!(close(v, Vec2::new(0.0, -1.0)));
        assert!(close(Vec2::new(2.0, 0.0).rotated(PI), Vec2::new(-2.0, 0.0)));
    }
}
