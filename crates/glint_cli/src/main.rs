//! Glint CLI
//!
//! Play motion scenes headlessly and inspect their configuration.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod scene;
mod simulate;

use scene::Scene;
use simulate::Simulation;

/// Frames played after the last timeline event when `--frames` is omitted
const SETTLE_SECONDS: f64 = 2.0;

#[derive(Parser)]
#[command(name = "glint")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Glint motion scene simulator", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a scene and print every element's style per frame
    Simulate {
        /// Scene file
        scene: PathBuf,

        /// Number of frames to play
        #[arg(short, long)]
        frames: Option<u64>,

        /// Frames per second
        #[arg(long, default_value = "60")]
        fps: f64,

        /// Start with the reduced-motion preference on
        #[arg(long)]
        reduced_motion: bool,

        /// Print JSON lines instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Parse a scene and print its resolved configuration
    Check {
        /// Scene file
        scene: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so simulation output stays pipeable
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Simulate {
            scene,
            frames,
            fps,
            reduced_motion,
            json,
        } => cmd_simulate(&scene, frames, fps, reduced_motion, json),

        Commands::Check { scene } => cmd_check(&scene),
    }
}

fn cmd_simulate(
    path: &Path,
    frames: Option<u64>,
    fps: f64,
    reduced_motion: bool,
    json: bool,
) -> Result<()> {
    if !(fps.is_finite() && fps > 0.0) {
        anyhow::bail!("Invalid frame rate '{}'. Expected a positive number", fps);
    }

    let scene = Scene::load(path)?;
    let frames = frames.unwrap_or_else(|| {
        let settle = (SETTLE_SECONDS * fps).ceil() as u64;
        scene.last_event_frame().map_or(settle, |last| last + 1 + settle)
    });

    info!(
        "Simulating {} ({} elements, {} frames at {} fps)",
        path.display(),
        scene.elements.len(),
        frames,
        fps
    );

    let mut simulation = Simulation::new(&scene, fps, reduced_motion.then_some(true));
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut result = Ok(());

    let summary = simulation.run(frames, |rows| {
        if result.is_err() {
            return;
        }
        for row in rows {
            let line = if json {
                serde_json::to_string(row).context("Failed to serialize frame")
            } else {
                Ok(row.to_text())
            };
            result = line.and_then(|line| writeln!(out, "{}", line).context("Failed to write output"));
            if result.is_err() {
                return;
            }
        }
    });
    result?;

    info!(
        "Done after {} frames: {} pending frame(s), {} observation(s), {} effect(s) mounted",
        summary.frames, summary.pending_frames, summary.active_observations, summary.registered_effects
    );
    Ok(())
}

fn cmd_check(path: &Path) -> Result<()> {
    let scene = Scene::load(path)?;

    info!(
        "{}: {} elements, {} timeline events",
        path.display(),
        scene.elements.len(),
        scene.timeline.len()
    );
    for element in &scene.elements {
        info!(
            "  {:<14} {:?} ({:?} trigger, {:.2}s, {})",
            element.name,
            element.kind,
            element.effect.trigger,
            element.effect.duration,
            if element.is_observed() { "observed" } else { "not observed" }
        );
    }

    let resolved = toml::to_string_pretty(&scene).context("Failed to serialize scene")?;
    println!("{}", resolved);
    Ok(())
}
