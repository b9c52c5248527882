//! Scene primitives: bounded planes (disks), spheres and rings

use crate::math::{distance, Point, Vec3};
use crate::ray::Ray;

/// Rays closer to parallel than this never hit a plane or ring
const PARALLEL_EPSILON: f32 = 1e-6;

/// Minimum accepted hit distance for planar shapes
const PLANAR_MIN_T: f32 = 0.001;

/// Minimum accepted hit distance for spheres
const SPHERE_MIN_T: f32 = 0.01;

/// Distance along a ray and the surface normal at that point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub t: f32,
    pub normal: Vec3,
}

/// Flat disk centred on `point`
#[derive(Debug, Clone, Copy)]
pub struct Plane {
    pub point: Point,
    pub normal: Vec3,
    pub radius: f32,
}

impl Plane {
    pub fn new(point: Point, normal: Vec3, radius: f32) -> Self {
        Self { point, normal: normal.normalize(), radius }
    }

    pub fn intersect(&self, ray: &Ray) -> Option<Intersection> {
        let (t, hit_distance) = planar_hit(&self.point, &self.normal, ray)?;
        if hit_distance > self.radius {
            return None;
        }
        Some(Intersection { t, normal: facing_normal(&self.point, &self.normal, ray) })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Sphere {
    pub center: Point,
    pub radius: f32,
}

impl Sphere {
    pub fn new(center: Point, radius: f32) -> Self {
        Self { center, radius }
    }

    pub fn intersect(&self, ray: &Ray) -> Option<Intersection> {
        let oc = ray.origin - self.center;
        let a = ray.direction.dot(&ray.direction);
        let b = 2.0 * oc.dot(&ray.direction);
        let c = oc.dot(&oc) - self.radius * self.radius;

        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrt_d = discriminant.sqrt();
        let near = (-b - sqrt_d) / (2.0 * a);
        let far = (-b + sqrt_d) / (2.0 * a);
        let t = if near > 0.0 { near } else { far };
        if t < SPHERE_MIN_T {
            return None;
        }

        let normal = (ray.at(t) - self.center).normalize();
        Some(Intersection { t, normal })
    }
}

/// Flat annulus centred on `point`. Both radii are inclusive bounds.
#[derive(Debug, Clone, Copy)]
pub struct Ring {
    pub point: Point,
    pub normal: Vec3,
    pub inner_radius: f32,
    pub outer_radius: f32,
}

impl Ring {
    pub fn new(point: Point, normal: Vec3, inner_radius: f32, outer_radius: f32) -> Self {
        Self { point, normal: normal.normalize(), inner_radius, outer_radius }
    }

    pub fn intersect(&self, ray: &Ray) -> Option<Intersection> {
        let (t, hit_distance) = planar_hit(&self.point, &self.normal, ray)?;
        if hit_distance < self.inner_radius || hit_distance > self.outer_radius {
            return None;
        }
        Some(Intersection { t, normal: facing_normal(&self.point, &self.normal, ray) })
    }
}

/// Solve the ray against the infinite plane through `point`.
/// Returns `t` and the in-plane distance of the hit from `point`.
fn planar_hit(point: &Point, normal: &Vec3, ray: &Ray) -> Option<(f32, f32)> {
    let denominator = ray.direction.dot(normal);
    if denominator.abs() < PARALLEL_EPSILON {
        return None;
    }

    let t = (point - ray.origin).dot(normal) / denominator;
    if t < PLANAR_MIN_T {
        return None;
    }

    Some((t, distance(&ray.at(t), point)))
}

/// Plane normal flipped to face the incoming ray
fn facing_normal(point: &Point, normal: &Vec3, ray: &Ray) -> Vec3 {
    if (point - ray.origin).dot(normal) > 0.0 {
        -normal
    } else {
        *normal
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Shape {
    Plane(Plane),
    Sphere(Sphere),
    Ring(Ring),
}

impl Shape {
    pub fn intersect(&self, ray: &Ray) -> Option<Intersection> {
        match self {
            Shape::Plane(plane) => plane.intersect(ray),
            Shape::Sphere(sphere) => sphere.intersect(ray),
            Shape::Ring(ring) => ring.intersect(ray),
        }
    }

    /// Reference position of the shape (sphere center or disk/ring center)
    pub fn position(&self) -> Point {
        match self {
            Shape::Plane(plane) => plane.point,
            Shape::Sphere(sphere) => sphere.center,
            Shape::Ring(ring) => ring.point,
        }
    }

    /// Move the shape so its reference position lands on `position`
    pub fn set_position(&mut self, position: Point) {
        match self {
            Shape::Plane(plane) => plane.point = position,
            Shape::Sphere(sphere) => sphere.center = position,
            Shape::Ring(ring) => ring.point = position,
        }
    }
}

/// How a primitive shows up on screen, independent of its geometry
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pub name: String,
    /// ANSI SGR parameters (e.g. "31;1"), empty for the terminal default
    pub attribute: String,
    pub casts_shadow: bool,
}

impl Default for Surface {
    fn default() -> Self {
        Self { name: String::new(), attribute: String::new(), casts_shadow: true }
    }
}

/// A shape plus its display surface
#[derive(Debug, Clone)]
pub struct Primitive {
    pub shape: Shape,
    pub surface: Surface,
}

impl Primitive {
    pub fn new(shape: Shape) -> Self {
        Self { shape, surface: Surface::default() }
    }

    pub fn sphere(center: Point, radius: f32) -> Self {
        Self::new(Shape::Sphere(Sphere::new(center, radius)))
    }

    pub fn plane(point: Point, normal: Vec3, radius: f32) -> Self {
        Self::new(Shape::Plane(Plane::new(point, normal, radius)))
    }

    pub fn ring(point: Point, normal: Vec3, inner_radius: f32, outer_radius: f32) -> Self {
        Self::new(Shape::Ring(Ring::new(point, normal, inner_radius, outer_radius)))
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.surface.name = name.into();
        self
    }

    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.surface.attribute = attribute.into();
        self
    }

    pub fn with_shadow(mut self, casts_shadow: bool) -> Self {
        self.surface.casts_shadow = casts_shadow;
        self
    }

    pub fn intersect(&self, ray: &Ray) -> Option<Intersection> {
        self.shape.intersect(ray)
    }
}
