//! Rays used for camera and shadow probes

use crate::math::{Point, Vec3};

/// A half-line in 3D space. `direction` is expected to be unit length.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Point,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Point, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    pub fn at(&self, t: f32) -> Point {
        self.origin + self.direction * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(Point::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        let p = ray.at(2.5);
        assert!((p.x - 1.0).abs() < 1e-6);
        assert!((p.z + 2.5).abs() < 1e-6);
    }
}
