//! Shared geometry value types.
//!
//! World positions are plain `f32` triples in world units (metres). Headings
//! follow the compass convention used by the path recorder: degrees in
//! `[0, 360)`, where 0 points along +Y ("north") and 90 along +X ("east").
//!
//! ```text
//!            0° (+Y)
//!              ↑
//!   270° ←  vehicle  → 90° (+X)
//!              ↓
//!            180°
//! ```

use std::ops::{Add, Mul, Sub};

/// A position or direction in world space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    /// The origin.
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);

    /// World up (+Z).
    pub const UP: Vec3 = Vec3::new(0.0, 0.0, 1.0);

    /// Create a new vector.
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Squared Euclidean distance to another point (z included).
    pub fn distance_squared(self, other: Vec3) -> f32 {
        (self - other).length_squared()
    }

    pub fn distance(self, other: Vec3) -> f32 {
        self.distance_squared(other).sqrt()
    }

    /// Unit vector in the same direction, or `None` for a (near) zero vector.
    pub fn normalized(self) -> Option<Vec3> {
        let len = self.length();
        if len < 1e-3 {
            None
        } else {
            Some(self * (1.0 / len))
        }
    }

    /// Whether every component is finite.
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;

    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl std::fmt::Display for Vec3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

/// Normalize a heading to `[0, 360)`.
pub fn normalize_heading(degrees: f32) -> f32 {
    let h = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if h >= 360.0 {
        0.0
    } else {
        h
    }
}

/// Smallest absolute angle between two headings, in `[0, 180]`.
pub fn heading_delta(a: f32, b: f32) -> f32 {
    let d = (a - b).abs() % 360.0;
    if d > 180.0 {
        360.0 - d
    } else {
        d
    }
}

/// Compass heading from `from` towards `to`, ignoring height.
///
/// Returns `None` when the two points are (nearly) on top of each other and
/// the heading would be meaningless.
pub fn heading_towards(from: Vec3, to: Vec3) -> Option<f32> {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    if (dx * dx + dy * dy).sqrt() < 1e-3 {
        return None;
    }

    let math_angle = dy.atan2(dx).to_degrees();
    Some(normalize_heading(90.0 - math_angle))
}

/// Horizontal `(left, forward)` unit vectors for a compass heading.
pub fn track_basis(heading: f32) -> (Vec3, Vec3) {
    let rad = heading.to_radians();
    let forward = Vec3::new(rad.sin(), rad.cos(), 0.0);
    let left = Vec3::UP
        .cross(forward)
        .normalized()
        .unwrap_or(Vec3::new(-1.0, 0.0, 0.0));
    (left, forward)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_vector_arithmetic() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 6.0, 3.0);

        assert_eq!(b - a, Vec3::new(3.0, 4.0, 0.0));
        assert_eq!(a + b, Vec3::new(5.0, 8.0, 6.0));
        assert!(approx(a.distance(b), 5.0));
        assert!(approx(a.distance_squared(b), 25.0));
        assert!(approx(a.dot(b), 4.0 + 12.0 + 9.0));
    }

    #[test]
    fn test_normalized_zero_vector() {
        assert!(Vec3::ZERO.normalized().is_none());
        let n = Vec3::new(0.0, 3.0, 4.0).normalized().unwrap();
        assert!(approx(n.length(), 1.0));
    }

    #[test]
    fn test_normalize_heading() {
        assert!(approx(normalize_heading(370.0), 10.0));
        assert!(approx(normalize_heading(-90.0), 270.0));
        assert!(approx(normalize_heading(0.0), 0.0));
        assert!(normalize_heading(-1e-9) < 360.0);
    }

    #[test]
    fn test_heading_delta_wraps() {
        assert!(approx(heading_delta(350.0, 10.0), 20.0));
        assert!(approx(heading_delta(10.0, 350.0), 20.0));
        assert!(approx(heading_delta(90.0, 270.0), 180.0));
    }

    #[test]
    fn test_heading_towards_cardinals() {
        let origin = Vec3::ZERO;
        assert!(approx(heading_towards(origin, Vec3::new(0.0, 5.0, 0.0)).unwrap(), 0.0));
        assert!(approx(heading_towards(origin, Vec3::new(5.0, 0.0, 0.0)).unwrap(), 90.0));
        assert!(approx(heading_towards(origin, Vec3::new(0.0, -5.0, 0.0)).unwrap(), 180.0));
        assert!(approx(heading_towards(origin, Vec3::new(-5.0, 0.0, 0.0)).unwrap(), 270.0));
        assert!(heading_towards(origin, Vec3::new(0.0, 0.0, 10.0)).is_none());
    }

    #[test]
    fn test_track_basis_north() {
        let (left, forward) = track_basis(0.0);
        assert!(approx(forward.y, 1.0));
        assert!(approx(left.x, -1.0));
        assert!(approx(left.z, 0.0));
    }

    #[test]
    fn test_track_basis_east() {
        let (left, forward) = track_basis(90.0);
        assert!(approx(forward.x, 1.0));
        // Facing east, left is north
        assert!(approx(left.y, 1.0));
    }
}
