//! Pinhole camera producing one ray per output cell

use crate::math::{point_to, Point, Vec3};
use crate::ray::Ray;

/// Pitch is kept inside this range so the view never flips over the poles
pub const PITCH_LIMIT: f32 = 89.0;

/// Camera for viewing the scene.
///
/// `fov`, `yaw` and `pitch` are in degrees. `direction` is derived from
/// yaw/pitch by [`Camera::rotate`], or set directly with [`Camera::look_at`].
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub position: Point,
    pub direction: Vec3,
    pub up: Vec3,
    pub fov: f32,
    pub yaw: f32,
    pub pitch: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Point::new(0.0, 1.7, 0.0), 100.0)
    }
}

impl Camera {
    pub fn new(position: Point, fov: f32) -> Self {
        let mut camera = Self {
            position,
            direction: Vec3::new(1.0, 0.0, 0.0),
            up: Vec3::new(0.0, 1.0, 0.0),
            fov,
            yaw: 0.0,
            pitch: 0.0,
        };
        camera.update_direction();
        camera
    }

    /// Turn the camera by the given yaw/pitch deltas (degrees)
    pub fn rotate(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.yaw += delta_yaw;
        self.pitch = (self.pitch + delta_pitch).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_direction();
    }

    /// Recompute `direction` from the current yaw and pitch
    pub fn update_direction(&mut self) {
        let yaw = self.yaw.to_radians();
        let pitch = self.pitch.to_radians();
        self.direction = Vec3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize();
    }

    /// Point the camera at `target`.
    ///
    /// Yaw and pitch are re-derived from the new direction so a later
    /// `rotate` continues from this view instead of snapping back.
    pub fn look_at(&mut self, target: &Point) {
        self.direction = point_to(&self.position, target);
        self.yaw = self.direction.z.atan2(self.direction.x).to_degrees();
        self.pitch = self
            .direction
            .y
            .clamp(-1.0, 1.0)
            .asin()
            .to_degrees()
            .clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Ray through image position (`x`, `y`) on a `width` x `height` grid.
    ///
    /// `x` is a fractional column: the renderer samples twice per glyph
    /// column and halves the index before calling this.
    pub fn get_ray(&self, x: f32, y: f32, width: usize, height: usize) -> Ray {
        let aspect_ratio = width as f32 / height as f32;
        let scale = (self.fov.to_radians() * 0.5).tan();

        let right = self.direction.cross(&self.up).normalize();
        let local_up = right.cross(&self.direction).normalize();

        let ndc_x = (2.0 * (x + 0.25) / width as f32 - 1.0) * aspect_ratio * scale;
        let ndc_y = (1.0 - 2.0 * (y + 0.5) / height as f32) * scale;

        let direction = (self.direction + right * ndc_x + local_up * ndc_y).normalize();
        Ray::new(self.position, direction)
    }
}
