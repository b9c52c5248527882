//! ASCII ray caster demo
//!
//! Orbits the camera around the configured scene and redraws the terminal
//! every frame, printing fps and render time below the picture.
//!
//! Usage:
//!   ascii_caster                        - built-in scene, runs until q, Esc or Ctrl-C
//!   ascii_caster --config scene.yaml    - load scene and settings from YAML
//!   ascii_caster --frames 500 --skip-output   - benchmark without drawing

use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use ascii_caster::config::{load_config, AppConfig};
use ascii_caster::renderer::{Renderer, View};
use ascii_caster::terminal::TerminalDisplay;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

#[derive(Parser)]
#[command(name = "ascii_caster")]
#[command(version = "0.1.0")]
#[command(about = "Ray cast spheres, disks and rings into the terminal")]
struct Cli {
    /// Path to a YAML config file (built-in demo scene when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override declared width (each row is drawn with twice this many glyphs)
    #[arg(long)]
    width: Option<usize>,

    /// Override height in rows
    #[arg(long)]
    height: Option<usize>,

    /// Size the frame to the current terminal
    #[arg(long, conflicts_with_all = ["width", "height"])]
    fit: bool,

    /// Override worker thread count
    #[arg(short, long)]
    threads: Option<usize>,

    /// Stop after this many frames
    #[arg(short, long)]
    frames: Option<u64>,

    /// Render and time frames without drawing them
    #[arg(long)]
    skip_output: bool,

    /// Print the effective configuration as YAML and exit
    #[arg(long)]
    dump_config: bool,

    /// Set logging level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<LogLevel>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level_filter = if let Some(level) = cli.log_level {
        level.to_string()
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
            .to_string()
    };

    // Frames own stdout; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&level_filter))
        .with_writer(std::io::stderr)
        .init();

    let config = build_config(&cli)?;

    if cli.dump_config {
        print!("{}", serde_yaml::to_string(&config)?);
        return Ok(());
    }

    run(&config, cli.frames)
}

/// Load the config file (or defaults) and apply CLI overrides
fn build_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from {:?}", path);
            load_config(path).with_context(|| format!("loading {}", path.display()))?
        }
        None => AppConfig::default(),
    };

    if cli.fit {
        let (columns, rows) = crossterm::terminal::size().context("querying terminal size")?;
        let (width, height) = fit_size(columns, rows);
        config.render.width = width;
        config.render.height = height;
    }
    if let Some(width) = cli.width {
        config.render.width = width;
    }
    if let Some(height) = cli.height {
        config.render.height = height;
    }
    if let Some(threads) = cli.threads {
        config.render.threads = threads;
    }
    if cli.skip_output {
        config.render.skip_output = true;
    }

    config.validate()?;
    Ok(config)
}

/// Frame size for a terminal of `columns` x `rows`.
/// Two glyphs per declared column, two rows left for telemetry.
fn fit_size(columns: u16, rows: u16) -> (usize, usize) {
    let width = columns as usize / 2;
    let height = (rows as usize).saturating_sub(2);
    if width == 0 || height == 0 {
        tracing::warn!(columns, rows, "Terminal too small to fit, clamping to 1x1 minimum");
    }
    (width.max(1), height.max(1))
}

fn run(config: &AppConfig, frames: Option<u64>) -> anyhow::Result<()> {
    let palette = config.palette()?;
    let shading = config.shading_params(&palette);
    let mut renderer = Renderer::new(config.render_settings(), palette, shading)?;

    let scene = config.build_scene();
    let mut camera = config.build_camera();
    let light = config.light();
    let motion = &config.camera.motion;

    tracing::info!(
        width = config.render.width,
        height = config.render.height,
        threads = config.render.threads,
        objects = scene.len(),
        "Renderer ready"
    );

    let mut terminal = TerminalDisplay::new().context("initializing terminal")?;
    let mut total_ms = 0.0;
    let mut rendered = 0u64;

    while frames.map_or(true, |limit| rendered < limit) {
        if terminal.poll_quit()? {
            tracing::debug!("Quit requested");
            break;
        }
        motion.apply(&mut camera, renderer.frame_count());

        let view = View { scene: &scene, camera: &camera, light };
        let frame = renderer.render(&view, terminal.writer())?;
        terminal.telemetry(&frame)?;

        total_ms += frame.elapsed_ms;
        rendered += 1;
    }

    drop(terminal);
    println!();
    if rendered > 0 {
        tracing::info!(
            frames = rendered,
            average_ms = total_ms / rendered as f64,
            "Finished"
        );
    }

    Ok(())
}
