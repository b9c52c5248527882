mod loader;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::camera::Camera;
use crate::error::RenderError;
use crate::math::{Point, Vec3};
use crate::primitive::Primitive;
use crate::renderer::RenderSettings;
use crate::scene::Scene;
use crate::shading::{Palette, ShadingParams, MIN_PALETTE_LEN};

pub use loader::load_config;

/// Main application configuration.
///
/// Every section is optional; an empty file renders the built-in demo scene.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub shading: ShadingConfig,
    /// Glyphs from darkest to brightest; the built-in palette when absent
    #[serde(default)]
    pub palette: Option<Vec<String>>,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default = "default_light")]
    pub light: [f32; 3],
    #[serde(default = "default_objects")]
    pub objects: Vec<ObjectConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            render: RenderConfig::default(),
            shading: ShadingConfig::default(),
            palette: None,
            camera: CameraConfig::default(),
            light: default_light(),
            objects: default_objects(),
        }
    }
}

fn default_light() -> [f32; 3] {
    [10.0, 5.0, 0.0]
}

fn default_objects() -> Vec<ObjectConfig> {
    vec![
        ObjectConfig {
            shape: ShapeConfig::Sphere { center: [0.0, 0.0, 0.0], radius: 1.5 },
            name: "planet".to_string(),
            attribute: "31;1".to_string(),
            casts_shadow: true,
        },
        ObjectConfig {
            shape: ShapeConfig::Ring {
                point: [0.0, 0.0, 0.0],
                normal: [1.0, 4.0, 0.0],
                inner_radius: 2.0,
                outer_radius: 3.0,
            },
            name: "ring".to_string(),
            attribute: String::new(),
            casts_shadow: true,
        },
    ]
}

/// Frame size, worker count and output behaviour
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RenderConfig {
    #[serde(default = "default_width")]
    pub width: usize,
    #[serde(default = "default_height")]
    pub height: usize,
    #[serde(default = "default_threads")]
    pub threads: usize,
    /// Render and time frames without drawing them
    #[serde(default)]
    pub skip_output: bool,
    /// Frame counter value before the first frame (also drives the camera animation)
    #[serde(default = "default_start_frame")]
    pub start_frame: u64,
}

fn default_width() -> usize {
    98
}

fn default_height() -> usize {
    48
}

fn default_threads() -> usize {
    3
}

fn default_start_frame() -> u64 {
    4500
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            threads: default_threads(),
            skip_output: false,
            start_frame: default_start_frame(),
        }
    }
}

/// Brightness quantization settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShadingConfig {
    #[serde(default = "default_dither_period")]
    pub dither_period: usize,
    /// Base brightness level; the middle of the palette when absent
    #[serde(default)]
    pub dither_offset: Option<usize>,
    #[serde(default = "default_shadow_bias")]
    pub shadow_bias: f32,
}

fn default_dither_period() -> usize {
    4
}

fn default_shadow_bias() -> f32 {
    0.01
}

impl Default for ShadingConfig {
    fn default() -> Self {
        Self {
            dither_period: default_dither_period(),
            dither_offset: None,
            shadow_bias: default_shadow_bias(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CameraConfig {
    #[serde(default = "default_camera_position")]
    pub position: [f32; 3],
    /// Field of view in degrees
    #[serde(default = "default_fov")]
    pub fov: f32,
    #[serde(default = "default_up")]
    pub up: [f32; 3],
    #[serde(default)]
    pub motion: CameraMotion,
}

fn default_camera_position() -> [f32; 3] {
    [3.0, 0.0, 0.0]
}

fn default_fov() -> f32 {
    100.0
}

fn default_up() -> [f32; 3] {
    [0.0, 1.0, 0.0]
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: default_camera_position(),
            fov: default_fov(),
            up: default_up(),
            motion: CameraMotion::default(),
        }
    }
}

/// How the driver moves the camera between frames
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum CameraMotion {
    /// Circle `target` in the horizontal plane, one revolution per
    /// `2 * PI * period_frames` frames, always looking at the target
    Orbit {
        radius: f32,
        period_frames: f32,
        #[serde(default)]
        height: f32,
        #[serde(default)]
        target: [f32; 3],
    },
    /// Turn by fixed yaw/pitch steps (degrees) every frame
    Spin {
        #[serde(default)]
        yaw_step: f32,
        #[serde(default)]
        pitch_step: f32,
    },
    /// Stay put, optionally looking at a target
    Fixed {
        #[serde(default)]
        target: Option<[f32; 3]>,
    },
}

impl Default for CameraMotion {
    fn default() -> Self {
        CameraMotion::Orbit {
            radius: 4.0,
            period_frames: 750.0,
            height: 0.0,
            target: [0.0, 0.0, 0.0],
        }
    }
}

/// One scene primitive
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ObjectConfig {
    #[serde(flatten)]
    pub shape: ShapeConfig,
    #[serde(default)]
    pub name: String,
    /// ANSI SGR parameters, e.g. "31;1" for bold red
    #[serde(default)]
    pub attribute: String,
    #[serde(default = "default_casts_shadow")]
    pub casts_shadow: bool,
}

fn default_casts_shadow() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ShapeConfig {
    Sphere {
        center: [f32; 3],
        radius: f32,
    },
    Plane {
        point: [f32; 3],
        normal: [f32; 3],
        radius: f32,
    },
    Ring {
        point: [f32; 3],
        normal: [f32; 3],
        inner_radius: f32,
        outer_radius: f32,
    },
}

fn point(v: [f32; 3]) -> Point {
    Point::new(v[0], v[1], v[2])
}

fn vector(v: [f32; 3]) -> Vec3 {
    Vec3::new(v[0], v[1], v[2])
}

impl ObjectConfig {
    pub fn to_primitive(&self) -> Primitive {
        let primitive = match self.shape {
            ShapeConfig::Sphere { center, radius } => Primitive::sphere(point(center), radius),
            ShapeConfig::Plane { point: p, normal, radius } => {
                Primitive::plane(point(p), vector(normal), radius)
            }
            ShapeConfig::Ring { point: p, normal, inner_radius, outer_radius } => {
                Primitive::ring(point(p), vector(normal), inner_radius, outer_radius)
            }
        };
        primitive
            .named(self.name.clone())
            .with_attribute(self.attribute.clone())
            .with_shadow(self.casts_shadow)
    }

    fn validate(&self, index: usize) -> Result<(), ConfigError> {
        let label = if self.name.is_empty() {
            format!("objects[{}]", index)
        } else {
            self.name.clone()
        };
        let invalid = |msg: &str| Err(ConfigError::Validation(format!("{}: {}", label, msg)));

        match self.shape {
            ShapeConfig::Sphere { radius, .. } | ShapeConfig::Plane { radius, .. }
                if radius <= 0.0 =>
            {
                invalid("radius must be positive")
            }
            ShapeConfig::Plane { normal, .. } | ShapeConfig::Ring { normal, .. }
                if vector(normal).magnitude_squared() == 0.0 =>
            {
                invalid("normal must be non-zero")
            }
            ShapeConfig::Ring { inner_radius, outer_radius, .. }
                if inner_radius < 0.0 || outer_radius < inner_radius =>
            {
                invalid("ring radii must satisfy 0 <= inner_radius <= outer_radius")
            }
            _ => Ok(()),
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        load_config(path)
    }

    /// Check everything the renderer would otherwise reject or misrender
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.render.width == 0 || self.render.height == 0 {
            return Err(ConfigError::Validation(format!(
                "render size must be at least 1x1, got {}x{}",
                self.render.width, self.render.height
            )));
        }
        if self.render.threads == 0 {
            return Err(ConfigError::Validation("render.threads must be at least 1".to_string()));
        }
        if self.shading.dither_period == 0 {
            return Err(ConfigError::Validation(
                "shading.dither_period must be at least 1".to_string(),
            ));
        }
        if let Some(palette) = &self.palette {
            if palette.len() < MIN_PALETTE_LEN {
                return Err(ConfigError::Validation(format!(
                    "palette needs at least {} glyphs, got {}",
                    MIN_PALETTE_LEN,
                    palette.len()
                )));
            }
        }
        if let CameraMotion::Orbit { period_frames, .. } = self.camera.motion {
            if period_frames <= 0.0 {
                return Err(ConfigError::Validation(
                    "camera.motion.period_frames must be positive".to_string(),
                ));
            }
        }
        for (index, object) in self.objects.iter().enumerate() {
            object.validate(index)?;
        }
        Ok(())
    }

    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            width: self.render.width,
            height: self.render.height,
            threads: self.render.threads,
            skip_output: self.render.skip_output,
            start_frame: self.render.start_frame,
        }
    }

    pub fn palette(&self) -> Result<Palette, RenderError> {
        match &self.palette {
            Some(glyphs) => Palette::new(glyphs.iter().cloned()),
            None => Ok(Palette::default()),
        }
    }

    pub fn shading_params(&self, palette: &Palette) -> ShadingParams {
        let defaults = ShadingParams::for_palette(palette);
        ShadingParams {
            dither_period: self.shading.dither_period,
            dither_offset: self.shading.dither_offset.unwrap_or(defaults.dither_offset),
            shadow_bias: self.shading.shadow_bias,
        }
    }

    pub fn build_scene(&self) -> Scene {
        Scene::with_objects(self.objects.iter().map(ObjectConfig::to_primitive).collect())
    }

    /// Camera in its starting pose, before any motion is applied
    pub fn build_camera(&self) -> Camera {
        let mut camera = Camera::new(point(self.camera.position), self.camera.fov);
        camera.up = vector(self.camera.up);
        match &self.camera.motion {
            CameraMotion::Orbit { target, .. } => camera.look_at(&point(*target)),
            CameraMotion::Fixed { target: Some(target) } => camera.look_at(&point(*target)),
            _ => {}
        }
        camera
    }

    pub fn light(&self) -> Point {
        point(self.light)
    }
}

impl CameraMotion {
    /// Move `camera` to its pose for frame number `frame`
    pub fn apply(&self, camera: &mut Camera, frame: u64) {
        match *self {
            CameraMotion::Orbit { radius, period_frames, height, target } => {
                let phase = frame as f64 / period_frames as f64;
                camera.position = Point::new(
                    (phase.sin() * radius as f64) as f32 + target[0],
                    height + target[1],
                    (phase.cos() * radius as f64) as f32 + target[2],
                );
                camera.look_at(&point(target));
            }
            CameraMotion::Spin { yaw_step, pitch_step } => camera.rotate(yaw_step, pitch_step),
            CameraMotion::Fixed { .. } => {}
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}
