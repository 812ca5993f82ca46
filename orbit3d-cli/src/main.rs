/// Orbit3D - render one orbit viewpoint of a mesh to an image
///
/// Usage:
///   orbit3d render model.obj -o output.png
///   orbit3d orbit car.dae
///   orbit3d demo --preview
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use orbit3d_core::{import, output, pipeline, RenderConfig, Scene};
use orbit3d_cli::{write_orbit_table, TerminalPreview};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_DIRECTIVE: &str = "orbit3d=info";

#[derive(Parser)]
#[command(name = "orbit3d")]
#[command(about = "Flat-shaded orthographic renders from a camera orbit", long_about = None)]
struct Cli {
    /// Log filter directive, e.g. "orbit3d=debug" (defaults to RUST_LOG, then orbit3d=info)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one orbit sample of a mesh file (.dae, .obj, .stl)
    Render {
        input: PathBuf,

        #[arg(short, long, default_value = "output.png")]
        output: PathBuf,

        /// Orbit table position to render (overrides the config)
        #[arg(long)]
        sample: Option<usize>,

        /// TOML render config
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Also draw the result in the terminal
        #[arg(long)]
        preview: bool,
    },
    /// Print the bounding-box center and orbit table of a mesh or point list
    Orbit {
        input: PathBuf,

        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Render the built-in colored cube
    Demo {
        #[arg(short, long, default_value = "cube.png")]
        output: PathBuf,

        #[arg(long)]
        sample: Option<usize>,

        #[arg(long)]
        preview: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    match cli.command {
        Commands::Render {
            input,
            output,
            sample,
            config,
            preview,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(index) = sample {
                config.sample_index = index;
            }
            let scene = import::load(&input)
                .with_context(|| format!("failed to import {}", input.display()))?;
            render_to_file(&scene, &config, &output, preview)
        }
        Commands::Orbit { input, config } => {
            let config = load_config(config.as_deref())?;
            let scene = import::load(&input)
                .with_context(|| format!("failed to import {}", input.display()))?;
            let (bounds, path) = pipeline::orbit_table(&scene, &config)?;

            let stdout = io::stdout();
            let mut out = stdout.lock();
            write_orbit_table(&mut out, &bounds, &path)?;
            out.flush()?;
            Ok(())
        }
        Commands::Demo {
            output,
            sample,
            preview,
        } => {
            let mut config = RenderConfig::default();
            if let Some(index) = sample {
                config.sample_index = index;
            }
            render_to_file(&Scene::cube(2.0), &config, &output, preview)
        }
    }
}

fn init_logging(directive: Option<&str>) {
    let filter = match directive {
        Some(directive) => EnvFilter::try_new(directive)
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVE)),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVE)),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<RenderConfig> {
    match path {
        Some(path) => RenderConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(RenderConfig::default()),
    }
}

fn render_to_file(scene: &Scene, config: &RenderConfig, path: &Path, preview: bool) -> Result<()> {
    let frame = pipeline::render(scene, config).context("render failed")?;

    output::save_framebuffer(&frame.framebuffer, path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(
        "rendered sample {} ({} degrees) to {}",
        config.sample_index,
        frame.sample.angle_degrees,
        path.display()
    );

    if preview {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        TerminalPreview::fit_terminal()
            .unwrap_or_else(|_| TerminalPreview::new(80, 24))
            .draw(&frame.framebuffer, &mut out)?;
    }
    Ok(())
}
