//! CLI export tool for the interactive neuron figures.
//!
//! Builds each figure headlessly with its preset control values, applies
//! optional parameter overrides, and writes `<figure-id>.png`.

use anyhow::{Context, Result};
use clap::Parser;
use spikeplots::export::{self, ExportSize, Overrides};
use std::path::PathBuf;

/// Spike Plots figure export tool.
#[derive(Parser)]
#[command(name = "export", about = "Render the neuron figures to PNG")]
struct Cli {
    /// Which figure to render: a figure id such as `plot3`, or "all"
    #[arg(short, long, default_value = "all")]
    figure: String,

    /// Output directory for generated PNGs
    #[arg(short, long, default_value = "diagrams")]
    output_dir: PathBuf,

    /// Image width in pixels
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Image height in pixels
    #[arg(long, default_value_t = 400)]
    height: u32,

    /// Viewport width used for the responsive layout
    #[arg(long, default_value_t = 1280.0)]
    viewport_width: f32,

    /// JSON file mapping figure ids to parameter overrides
    #[arg(long)]
    overrides: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let figures = export::select_figures(&cli.figure)?;
    let overrides = match &cli.overrides {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            export::parse_overrides(&json)?
        }
        None => Overrides::new(),
    };

    std::fs::create_dir_all(&cli.output_dir)
        .with_context(|| format!("creating {}", cli.output_dir.display()))?;

    let size = ExportSize {
        width: cli.width,
        height: cli.height,
        viewport_width: cli.viewport_width,
    };
    log::info!(
        "Exporting {} figure(s) at {}x{} to {}",
        figures.len(),
        size.width,
        size.height,
        cli.output_dir.display()
    );

    for id in &figures {
        let update = export::export_figure(
            *id,
            overrides.get(id.surface_id()),
            &cli.output_dir,
            size,
        )?;
        log::info!(
            "  {}: {} output spike(s), {} input spike(s)",
            id.surface_id(),
            update.spike_indices.len(),
            update.input_indices.len()
        );
    }

    log::info!("Done, {} diagram(s) exported.", figures.len());
    Ok(())
}
