//! airsurf CLI - kriging surfaces from air-quality readings

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use airsurf_algorithms::interpolation::fit;
use airsurf_algorithms::samples::{build_sample_set, ReadingSource};
use airsurf_algorithms::{interpolate, VariogramSource};

mod config;
mod output;

use config::RunConfig;

#[derive(Parser)]
#[command(name = "airsurf")]
#[command(author, version, about = "Ordinary kriging surfaces for air-quality readings", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the cleaned sample set and print it as JSON
    Samples {
        /// Run configuration (JSON)
        config: PathBuf,
    },
    /// Fit the semivariogram and print the model
    Variogram {
        /// Run configuration (JSON)
        config: PathBuf,
    },
    /// Run the full pipeline and write <OUTPUT>.rgba and <OUTPUT>.json
    Interpolate {
        /// Run configuration (JSON)
        config: PathBuf,
        /// Output path stem
        #[arg(short, long, default_value = "surface")]
        output: PathBuf,
    },
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install tracing subscriber")
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn load(config: &Path) -> Result<(RunConfig, Vec<ReadingSource>)> {
    let pb = spinner("Reading sources...");
    let run = RunConfig::load(config)?;
    let sources = run.read_sources()?;
    pb.finish_and_clear();
    let readings: usize = sources.iter().map(|s| s.len()).sum();
    info!("Loaded {} readings from {} sources", readings, sources.len());
    Ok((run, sources))
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match cli.command {
        Commands::Samples { config } => {
            let (run, sources) = load(&config)?;
            let samples = build_sample_set(&sources, &run.params.cleaning)
                .context("Failed to build sample set")?;
            let bounds = samples.bounds();
            info!(
                "{} samples in lat [{:.6}, {:.6}], lon [{:.6}, {:.6}]",
                samples.len(),
                bounds.min_lat,
                bounds.max_lat,
                bounds.min_lon,
                bounds.max_lon
            );
            println!("{}", serde_json::to_string_pretty(&samples)?);
        }

        Commands::Variogram { config } => {
            let (run, sources) = load(&config)?;
            let samples = build_sample_set(&sources, &run.params.cleaning)
                .context("Failed to build sample set")?;
            let params = match run.params.variogram {
                VariogramSource::Fit(params) => params,
                VariogramSource::Fixed(model) => {
                    info!("Config fixes the model; fitting with default parameters for comparison");
                    println!("Configured: {}", serde_json::to_string(&model)?);
                    Default::default()
                }
            };
            let fitted = fit(&samples, &params).context("Failed to fit semivariogram")?;
            println!("{}", serde_json::to_string_pretty(&fitted)?);
        }

        Commands::Interpolate { config, output } => {
            let (run, sources) = load(&config)?;
            let start = Instant::now();
            let pb = spinner("Kriging...");
            let result = interpolate(&sources, &run.params, &run.color_map)
                .context("Interpolation failed")?;
            pb.finish_and_clear();
            let elapsed = start.elapsed();

            let (rgba, json) = output::write_outputs(&output, &result)?;
            let stats = result.surface.statistics();
            println!(
                "Surface: {} x {} from {} samples (slope {:.4}, nugget {:.4})",
                result.raster.width(),
                result.raster.height(),
                result.samples.len(),
                result.model.slope,
                result.model.nugget
            );
            println!("  Range: [{:.4}, {:.4}], mean {:.4}", stats.min, stats.max, stats.mean);
            println!("  Raster saved to: {}", rgba.display());
            println!("  Metadata saved to: {}", json.display());
            println!("  Processing time: {:.2?}", elapsed);
        }
    }

    Ok(())
}
