//! Scene container and nearest-hit resolution

use crate::math::{Point, Vec3};
use crate::primitive::Primitive;
use crate::ray::Ray;

/// What a ray is being cast for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// Primary ray from the camera; every primitive is visible
    Camera,
    /// Occlusion test towards the light; non-shadow-casting primitives are skipped
    Shadow,
}

/// Nearest intersection of a ray with the scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit<'a> {
    pub point: Point,
    pub normal: Vec3,
    pub distance: f32,
    /// Display attribute of the primitive that was hit
    pub attribute: &'a str,
}

/// Ordered collection of primitives. Order only decides equal-distance ties.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub objects: Vec<Primitive>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_objects(objects: Vec<Primitive>) -> Self {
        Self { objects }
    }

    pub fn add(&mut self, object: Primitive) {
        self.objects.push(object);
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Find the closest primitive along `ray`.
    ///
    /// The earliest primitive in the list wins when two hits share a distance.
    pub fn intersect(&self, ray: &Ray, probe: Probe) -> Option<Hit<'_>> {
        let mut closest: Option<(f32, Vec3, &Primitive)> = None;

        for object in &self.objects {
            if probe == Probe::Shadow && !object.surface.casts_shadow {
                continue;
            }
            if let Some(hit) = object.intersect(ray) {
                if closest.map_or(true, |(t, _, _)| hit.t < t) {
                    closest = Some((hit.t, hit.normal, object));
                }
            }
        }

        closest.map(|(t, normal, object)| Hit {
            point: ray.at(t),
            normal,
            distance: t,
            attribute: &object.surface.attribute,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forward() -> Ray {
        Ray::new(Point::new(0.0, 0.0, -10.0), Vec3::new(0.0, 0.0, 1.0))
    }

    #[test]
    fn test_empty_scene_misses() {
        let scene = Scene::new();
        assert!(scene.intersect(&forward(), Probe::Camera).is_none());
    }

    #[test]
    fn test_nearest_hit_wins() {
        let scene = Scene::with_objects(vec![
            Primitive::sphere(Point::new(0.0, 0.0, 3.0), 1.0).with_attribute("34"),
            Primitive::sphere(Point::new(0.0, 0.0, 0.0), 2.0).with_attribute("31"),
        ]);
        let hit = scene.intersect(&forward(), Probe::Camera).unwrap();
        assert!((hit.distance - 8.0).abs() < 1e-4);
        assert_eq!(hit.attribute, "31");
        assert!((hit.point.z + 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_tie_goes_to_first() {
        let front = Vec3::new(0.0, 0.0, 1.0);
        let scene = Scene::with_objects(vec![
            Primitive::plane(Point::origin(), front, 5.0).with_attribute("first"),
            Primitive::plane(Point::origin(), -front, 5.0).with_attribute("second"),
        ]);
        let hit = scene.intersect(&forward(), Probe::Camera).unwrap();
        assert_eq!(hit.attribute, "first");
    }

    #[test]
    fn test_shadow_probe_skips_non_casters() {
        let scene = Scene::with_objects(vec![
            Primitive::sphere(Point::new(0.0, 0.0, 0.0), 1.0).with_shadow(false),
            Primitive::sphere(Point::new(0.0, 0.0, 5.0), 1.0).with_attribute("far"),
        ]);

        let camera = scene.intersect(&forward(), Probe::Camera).unwrap();
        assert!((camera.distance - 9.0).abs() < 1e-4);

        let shadow = scene.intersect(&forward(), Probe::Shadow).unwrap();
        assert!((shadow.distance - 14.0).abs() < 1e-4);
        assert_eq!(shadow.attribute, "far");
    }

    #[test]
    fn test_miss_returns_none() {
        let mut scene = Scene::new();
        scene.add(Primitive::sphere(Point::new(5.0, 5.0, 0.0), 1.0));
        assert_eq!(scene.len(), 1);
        assert!(scene.intersect(&forward(), Probe::Camera).is_none());
    }
}
