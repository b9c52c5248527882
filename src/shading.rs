//! Lambert shading, hard shadows and glyph quantization

use std::borrow::Cow;

use crate::error::RenderError;
use crate::math::{angle_between, distance, point_to, Point};
use crate::ray::Ray;
use crate::scene::{Hit, Probe, Scene};

/// SGR parameter layered onto shadowed pixels
pub const DIM_ATTRIBUTE: &str = "2";

/// Smallest palette the renderer accepts (levels 0..=4)
pub const MIN_PALETTE_LEN: usize = 5;

/// Glyphs indexed by brightness level, darkest first
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    glyphs: Vec<String>,
}

impl Default for Palette {
    fn default() -> Self {
        Self { glyphs: [" ", "░", "▒", "▓", "█"].map(String::from).to_vec() }
    }
}

impl Palette {
    pub fn new<I, S>(glyphs: I) -> Result<Self, RenderError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let glyphs: Vec<String> = glyphs.into_iter().map(Into::into).collect();
        if glyphs.len() < MIN_PALETTE_LEN {
            return Err(RenderError::InvalidPalette(format!(
                "need at least {} glyphs, got {}",
                MIN_PALETTE_LEN,
                glyphs.len()
            )));
        }
        Ok(Self { glyphs })
    }

    /// Highest brightness level
    pub fn max_level(&self) -> usize {
        self.glyphs.len() - 1
    }

    /// Glyph for `level`, clamped into range
    pub fn glyph(&self, level: usize) -> &str {
        &self.glyphs[level.min(self.max_level())]
    }

    pub fn glyphs(&self) -> &[String] {
        &self.glyphs
    }
}

/// Tunables for brightness quantization and shadow probes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadingParams {
    /// Width of the horizontal dither pattern, in output columns
    pub dither_period: usize,
    /// Base level the dither pattern starts from
    pub dither_offset: usize,
    /// How far shadow probes start from the surface, towards the light
    pub shadow_bias: f32,
}

impl ShadingParams {
    /// Defaults that put the dither pattern in the upper half of `palette`
    pub fn for_palette(palette: &Palette) -> Self {
        Self {
            dither_period: 4,
            dither_offset: palette.max_level().div_ceil(2),
            shadow_bias: 0.01,
        }
    }
}

/// Final look of one output cell
#[derive(Debug, Clone, PartialEq)]
pub struct Shade<'a> {
    pub level: usize,
    pub attribute: Cow<'a, str>,
    pub shadowed: bool,
}

impl Shade<'_> {
    /// Unlit background cell
    pub fn background() -> Self {
        Self { level: 0, attribute: Cow::Borrowed(""), shadowed: false }
    }
}

/// Layer the dim attribute on top of a primitive's own attribute
pub fn dim(attribute: &str) -> Cow<'_, str> {
    if attribute.is_empty() {
        Cow::Borrowed(DIM_ATTRIBUTE)
    } else {
        Cow::Owned(format!("{};{}", attribute, DIM_ATTRIBUTE))
    }
}

/// Brightness from the dither pattern scaled by Lambert's cosine law.
///
/// Surfaces facing away from the light come out as level 0.
pub fn lambert_level(hit: &Hit<'_>, light: &Point, column: usize, params: &ShadingParams) -> usize {
    let period = params.dither_period.max(1);
    let base = (params.dither_offset + column % period) as f32;
    let to_light = point_to(&hit.point, light);
    let cos = angle_between(&hit.normal, &to_light).cos();
    (base * cos).round().max(0.0) as usize
}

/// True when something that casts shadows sits strictly between the hit and the light
pub fn in_shadow(scene: &Scene, hit: &Hit<'_>, light: &Point, params: &ShadingParams) -> bool {
    let to_light = point_to(&hit.point, light);
    let origin = hit.point + to_light * params.shadow_bias;
    let probe = Ray::new(origin, to_light);

    match scene.intersect(&probe, Probe::Shadow) {
        Some(blocker) => blocker.distance < distance(&origin, light),
        None => false,
    }
}

/// Shade a primary hit seen through output column `column`
pub fn shade<'a>(
    scene: &Scene,
    hit: &Hit<'a>,
    light: &Point,
    column: usize,
    params: &ShadingParams,
    palette: &Palette,
) -> Shade<'a> {
    let level = lambert_level(hit, light, column, params).min(palette.max_level());

    if in_shadow(scene, hit, light, params) {
        Shade { level, attribute: dim(hit.attribute), shadowed: true }
    } else {
        Shade { level, attribute: Cow::Borrowed(hit.attribute), shadowed: false }
    }
}
