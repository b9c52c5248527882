//! Multi-threaded frame production
//!
//! A frame is split into horizontal row bands. Each band is rasterized into its
//! own text tile on the worker pool, and the tiles are joined top to bottom
//! into one buffer that is written to the output in a single call.

use std::borrow::Cow;
use std::io::Write;
use std::ops::Range;
use std::time::Instant;

use crossterm::{cursor, queue};
use rayon::prelude::*;

use crate::camera::Camera;
use crate::error::RenderError;
use crate::math::Point;
use crate::scene::{Probe, Scene};
use crate::shading::{shade, Palette, Shade, ShadingParams};

/// SGR reset
pub const RESET: &str = "\x1b[0m";

/// Everything the renderer reads during one pass
#[derive(Debug, Clone, Copy)]
pub struct View<'a> {
    pub scene: &'a Scene,
    pub camera: &'a Camera,
    pub light: Point,
}

/// Frame geometry and output behaviour
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSettings {
    /// Declared columns; each row is sampled at twice this many glyphs
    pub width: usize,
    pub height: usize,
    pub threads: usize,
    /// Render and time frames without writing them
    pub skip_output: bool,
    /// Frame counter value before the first render
    pub start_frame: u64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self { width: 98, height: 48, threads: 3, skip_output: false, start_frame: 0 }
    }
}

/// One finished frame
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub buffer: String,
    pub elapsed_ms: f64,
    pub number: u64,
}

/// Split `[0, height)` into contiguous bands of `ceil(height / threads)` rows.
///
/// The last band may be shorter; bands that would start past the end are dropped.
pub fn row_bands(height: usize, threads: usize) -> Vec<Range<usize>> {
    let threads = threads.max(1);
    let step = height.div_ceil(threads).max(1);
    (0..threads)
        .map(|i| (i * step).min(height)..((i + 1) * step).min(height))
        .filter(|band| !band.is_empty())
        .collect()
}

pub struct Renderer {
    settings: RenderSettings,
    palette: Palette,
    shading: ShadingParams,
    pool: rayon::ThreadPool,
    frame_count: u64,
}

impl Renderer {
    pub fn new(
        settings: RenderSettings,
        palette: Palette,
        shading: ShadingParams,
    ) -> Result<Self, RenderError> {
        if settings.width == 0 || settings.height == 0 {
            return Err(RenderError::InvalidDimensions {
                width: settings.width,
                height: settings.height,
            });
        }
        if settings.threads == 0 {
            return Err(RenderError::InvalidThreadCount);
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(settings.threads)
            .thread_name(|i| format!("raster-{}", i))
            .build()?;

        Ok(Self {
            frame_count: settings.start_frame,
            settings,
            palette,
            shading,
            pool,
        })
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Glyph columns per output row
    pub fn columns(&self) -> usize {
        self.settings.width * 2
    }

    pub fn bands(&self) -> Vec<Range<usize>> {
        row_bands(self.settings.height, self.settings.threads)
    }

    /// Shade the output cell at (`column`, `row`)
    pub fn trace_cell<'a>(&self, view: &View<'a>, column: usize, row: usize) -> Shade<'a> {
        let ray = view.camera.get_ray(
            column as f32 / 2.0,
            row as f32,
            self.settings.width,
            self.settings.height,
        );

        match view.scene.intersect(&ray, Probe::Camera) {
            Some(hit) => shade(view.scene, &hit, &view.light, column, &self.shading, &self.palette),
            None => Shade::background(),
        }
    }

    /// Text for `rows`, with escapes emitted only when the attribute changes.
    /// Attribute tracking starts from the terminal default in every band.
    fn rasterize_band(&self, view: &View<'_>, rows: Range<usize>) -> String {
        let columns = self.columns();
        let mut tile = String::with_capacity(rows.len() * (columns * 3 + 1) + RESET.len());
        let mut last: Cow<'_, str> = Cow::Borrowed("");

        for row in rows {
            for column in 0..columns {
                let cell = self.trace_cell(view, column, row);
                if cell.attribute != last {
                    tile.push_str(RESET);
                    if !cell.attribute.is_empty() {
                        tile.push_str("\x1b[");
                        tile.push_str(&cell.attribute);
                        tile.push('m');
                    }
                    last = cell.attribute;
                }
                tile.push_str(self.palette.glyph(cell.level));
            }
            tile.push('\n');
        }

        tile.push_str(RESET);
        tile
    }

    /// Rasterize every band on the worker pool and join the tiles in row order
    pub fn rasterize(&self, view: &View<'_>) -> String {
        let bands = self.bands();
        let tiles: Vec<String> = self.pool.install(|| {
            bands
                .par_iter()
                .map(|rows| self.rasterize_band(view, rows.clone()))
                .collect()
        });
        tiles.concat()
    }

    /// Produce one frame and, unless output is skipped, draw it over the
    /// previous one starting from the top-left corner.
    pub fn render<W: Write>(&mut self, view: &View<'_>, out: &mut W) -> Result<Frame, RenderError> {
        let started = Instant::now();

        let buffer = self.rasterize(view);

        if !self.settings.skip_output {
            queue!(out, cursor::MoveTo(0, 0))?;
            out.write_all(buffer.as_bytes())?;
            out.flush()?;
        }

        self.frame_count += 1;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        tracing::debug!(
            frame = self.frame_count,
            bands = self.bands().len(),
            elapsed_ms,
            "Frame rendered"
        );

        Ok(Frame { buffer, elapsed_ms, number: self.frame_count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec3;
    use crate::primitive::Primitive;

    fn settings(width: usize, height: usize, threads: usize) -> RenderSettings {
        RenderSettings { width, height, threads, skip_output: false, start_frame: 0 }
    }

    fn flat_shading() -> ShadingParams {
        ShadingParams { dither_period: 1, dither_offset: 4, shadow_bias: 0.01 }
    }

    fn flat_renderer(width: usize, height: usize, threads: usize) -> Renderer {
        Renderer::new(settings(width, height, threads), Palette::default(), flat_shading()).unwrap()
    }

    /// Drop every `ESC[...m` sequence, leaving the glyphs and newlines
    fn visible(buffer: &str) -> String {
        let mut text = String::with_capacity(buffer.len());
        let mut in_escape = false;
        for ch in buffer.chars() {
            match ch {
                '\x1b' => in_escape = true,
                'm' if in_escape => in_escape = false,
                _ if in_escape => {}
                _ => text.push(ch),
            }
        }
        text
    }

    fn camera_at(position: Point, target: Point) -> Camera {
        let mut camera = Camera::new(position, 60.0);
        camera.look_at(&target);
        camera
    }

    #[test]
    fn test_row_bands_cover_exactly_once() {
        for height in 0..40 {
            for threads in 1..10 {
                let bands = row_bands(height, threads);
                assert!(bands.len() <= threads);
                let mut next = 0;
                for band in &bands {
                    assert_eq!(band.start, next, "gap or overlap at h={} t={}", height, threads);
                    assert!(band.end > band.start);
                    next = band.end;
                }
                assert_eq!(next, height);
            }
        }
    }

    #[test]
    fn test_row_bands_uneven() {
        assert_eq!(row_bands(10, 4), vec![0..3, 3..6, 6..9, 9..10]);
        assert_eq!(row_bands(5, 4), vec![0..2, 2..4, 4..5]);
        assert_eq!(row_bands(3, 8), vec![0..1, 1..2, 2..3]);
    }

    #[test]
    fn test_renderer_rejects_bad_settings() {
        let palette = Palette::default();
        let shading = ShadingParams::for_palette(&palette);
        assert!(matches!(
            Renderer::new(settings(0, 10, 1), palette.clone(), shading),
            Err(RenderError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            Renderer::new(settings(10, 10, 0), palette, shading),
            Err(RenderError::InvalidThreadCount)
        ));
    }

    #[test]
    fn test_empty_scene_frame_layout() {
        let renderer = flat_renderer(4, 3, 2);
        let scene = Scene::new();
        let camera = Camera::default();
        let view = View { scene: &scene, camera: &camera, light: Point::new(0.0, 10.0, 0.0) };

        let buffer = renderer.rasterize(&view);
        // Two bands (0..2, 2..3), each closed with a reset, no attribute escapes
        assert_eq!(buffer, format!("{0}\n{0}\n{1}{0}\n{1}", " ".repeat(8), RESET));
    }

    #[test]
    fn test_escape_only_on_attribute_change() {
        let renderer = flat_renderer(20, 10, 1);
        let scene = Scene::with_objects(vec![
            Primitive::sphere(Point::origin(), 1.0).with_attribute("31")
        ]);
        let camera = camera_at(Point::new(0.0, 0.0, 5.0), Point::origin());
        let view = View { scene: &scene, camera: &camera, light: Point::new(0.0, 0.0, 10.0) };

        let buffer = renderer.rasterize(&view);
        let red_rows = buffer.lines().filter(|line| line.contains("\x1b[31m")).count();
        let red_escapes = buffer.matches("\x1b[31m").count();
        // One switch into red per row that crosses the sphere
        assert!(red_rows > 0);
        assert_eq!(red_escapes, red_rows);
        assert!(buffer.ends_with(RESET));
    }

    #[test]
    fn test_thread_count_does_not_change_output() {
        let scene = Scene::with_objects(vec![
            Primitive::sphere(Point::new(0.0, 0.5, 0.0), 1.0).with_attribute("32"),
            Primitive::plane(Point::origin(), Vec3::new(0.0, 1.0, 0.0), 4.0),
        ]);
        let camera = camera_at(Point::new(0.0, 2.0, 6.0), Point::origin());
        let view = View { scene: &scene, camera: &camera, light: Point::new(3.0, 8.0, 2.0) };

        let single = flat_renderer(24, 12, 1);
        let multi = flat_renderer(24, 12, 5);

        // Escape state resets per band, so compare the visible glyphs only
        assert_eq!(visible(&single.rasterize(&view)), visible(&multi.rasterize(&view)));
    }

    #[test]
    fn test_render_writes_bulk_frame_and_counts() {
        let mut renderer = Renderer::new(
            RenderSettings { start_frame: 41, ..settings(8, 4, 2) },
            Palette::default(),
            flat_shading(),
        )
        .unwrap();
        let scene = Scene::new();
        let camera = Camera::default();
        let view = View { scene: &scene, camera: &camera, light: Point::new(0.0, 10.0, 0.0) };

        let mut out = Vec::new();
        let frame = renderer.render(&view, &mut out).unwrap();
        assert_eq!(frame.number, 42);
        assert_eq!(renderer.frame_count(), 42);
        assert!(frame.elapsed_ms >= 0.0);

        let written = String::from_utf8(out).unwrap();
        assert_eq!(written, format!("\x1b[1;1H{}", frame.buffer));

        let frame = renderer.render(&view, &mut Vec::new()).unwrap();
        assert_eq!(frame.number, 43);
    }

    #[test]
    fn test_skip_output_writes_nothing() {
        let mut renderer = Renderer::new(
            RenderSettings { skip_output: true, ..settings(8, 4, 1) },
            Palette::default(),
            flat_shading(),
        )
        .unwrap();
        let scene = Scene::new();
        let camera = Camera::default();
        let view = View { scene: &scene, camera: &camera, light: Point::new(0.0, 10.0, 0.0) };

        let mut out = Vec::new();
        let frame = renderer.render(&view, &mut out).unwrap();
        assert!(out.is_empty());
        assert!(!frame.buffer.is_empty());
        assert_eq!(frame.number, 1);
    }
}
