//! Lumen CLI - render an OBJ scene to a PNG file.

mod obj;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use lumen_core::{find_lights, RenderOptions, RenderSettings};
use lumen_renderer::{PassOutcome, Raytracer};

#[derive(Parser)]
#[command(name = "lumen")]
#[command(version)]
#[command(about = "Whitted raytracer for OBJ scenes")]
#[command(long_about = "
Renders a Wavefront OBJ scene with Phong shading, shadows, reflection and
refraction. Materials with a non-black `Ke` become lights.

Example usage:
  lumen scene.obj --options render.json --width 800 --height 600 -o out.png
")]
struct Cli {
    /// OBJ file to render
    scene: PathBuf,

    /// JSON file with render options
    #[arg(short, long)]
    options: Option<PathBuf>,

    /// Image width in pixels
    #[arg(long, default_value_t = 640)]
    width: u32,

    /// Image height in pixels
    #[arg(long, default_value_t = 480)]
    height: u32,

    /// Output PNG path
    #[arg(short = 'o', long, default_value = "render.png")]
    output: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();

    let options = match &cli.options {
        Some(path) => RenderOptions::load(path)
            .with_context(|| format!("Failed to load render options from {}", path.display()))?,
        None => RenderOptions::default(),
    };

    let models = obj::load_obj(&cli.scene)?;
    let lights = find_lights(&models);
    if lights.is_empty() {
        log::warn!("Scene has no emissive materials, only emission will be visible");
    }
    let settings = RenderSettings::new(options, lights);

    let mut raytracer = Raytracer::new(cli.width, cli.height);
    raytracer.render(&models, &settings)?;
    if let Some(PassOutcome::Cancelled { units }) = raytracer.wait()? {
        anyhow::bail!("Render stopped early after {} units", units);
    }

    let frame = raytracer.frame_buffer();
    let image = image::RgbaImage::from_raw(frame.width(), frame.height(), frame.to_rgba_top_down())
        .context("Frame buffer does not match image size")?;
    image
        .save(&cli.output)
        .with_context(|| format!("Failed to write {}", cli.output.display()))?;

    log::info!("Wrote {}", cli.output.display());
    Ok(())
}
