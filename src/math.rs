//! Vector helpers on top of nalgebra
//!
//! Positions are `Point3<f32>` and directions are `Vector3<f32>`. Normalizing a
//! zero-length vector yields NaN components; nothing here guards against that,
//! callers keep their inputs non-degenerate.

use nalgebra::{Point3, Vector3};

pub type Vec3 = Vector3<f32>;
pub type Point = Point3<f32>;

/// Euclidean distance between two points
pub fn distance(a: &Point, b: &Point) -> f32 {
    (b - a).magnitude()
}

/// Unit direction pointing from `from` towards `to`
pub fn point_to(from: &Point, to: &Point) -> Vec3 {
    (to - from).normalize()
}

/// Unsigned angle between two vectors in radians.
///
/// The cosine is clamped to [-1, 1] before `acos` so rounding overshoot on
/// (anti)parallel vectors never produces NaN.
pub fn angle_between(a: &Vec3, b: &Vec3) -> f32 {
    let cos = a.dot(b) / (a.magnitude_squared() * b.magnitude_squared()).sqrt();
    cos.clamp(-1.0, 1.0).acos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_normalize_unit_length() {
        for v in [
            Vec3::new(3.0, 4.0, 0.0),
            Vec3::new(-1.0, 2.0, 7.5),
            Vec3::new(0.001, 0.0, -0.002),
        ] {
            assert!((v.normalize().magnitude() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_normalize_zero_is_not_finite() {
        let n = Vec3::zeros().normalize();
        assert!(!n.x.is_finite());
    }

    #[test]
    fn test_angle_with_self_is_zero() {
        let v = Vec3::new(0.3, -1.7, 2.2);
        assert!(angle_between(&v, &v).abs() < 1e-3);
    }

    #[test]
    fn test_angle_with_opposite_is_pi() {
        let v = Vec3::new(0.3, -1.7, 2.2);
        assert!((angle_between(&v, &-v) - PI).abs() < 1e-3);
    }

    #[test]
    fn test_angle_never_nan_on_overshoot() {
        // Scaled copies of the same vector push dot/len slightly past 1.0
        for s in [1.0e-3_f32, 0.1, 3.0, 1.0e3] {
            let v = Vec3::new(0.1, 0.7, 0.3);
            assert!(!angle_between(&v, &(v * s)).is_nan());
            assert!(!angle_between(&v, &(v * -s)).is_nan());
        }
    }

    #[test]
    fn test_angle_perpendicular() {
        let a = Vec3::new(1.0, 0.0, 0.0);
        let b = Vec3::new(0.0, 0.0, 5.0);
        assert!((angle_between(&a, &b) - PI / 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_point_to_and_distance() {
        let a = Point::new(1.0, 1.0, 1.0);
        let b = Point::new(1.0, 4.0, 5.0);
        assert!((distance(&a, &b) - 5.0).abs() < 1e-5);
        let d = point_to(&a, &b);
        assert!((d - Vec3::new(0.0, 0.6, 0.8)).magnitude() < 1e-5);
    }
}
