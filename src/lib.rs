//! ASCII ray caster
//!
//! Renders spheres, disks and rings lit by a single point light to ANSI text
//! for terminal display. Frames are rasterized in horizontal bands on a
//! worker pool and presented as one bulk write.

pub mod camera;
pub mod config;
pub mod error;
pub mod math;
pub mod primitive;
pub mod ray;
pub mod renderer;
pub mod scene;
pub mod shading;
pub mod terminal;

pub use camera::Camera;
pub use config::AppConfig;
pub use error::RenderError;
pub use primitive::Primitive;
pub use renderer::{Frame, RenderSettings, Renderer, View};
pub use scene::Scene;
pub use shading::{Palette, ShadingParams};
pub use terminal::TerminalDisplay;
