//! Command-line entry point for drawing sweep comparison charts.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use training_charts::{build_chart, Sweep};

/// Draw loss and accuracy comparison charts from a training sweep CSV.
#[derive(Parser, Debug)]
#[command(name = "training-charts")]
#[command(version)]
#[command(about = "Compare training runs of a loss-function or batch-size sweep", long_about = None)]
struct Cli {
    /// Which parameter the CSV sweeps over
    #[arg(value_enum)]
    sweep: Sweep,

    /// CSV log to read
    #[arg(short, long)]
    input: PathBuf,

    /// SVG file to write (defaults to <sweep>_comparison.svg)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Drop rows whose train_loss is at or above this value
    #[arg(long)]
    max_train_loss: Option<f64>,

    /// Enable verbose logging
    #[arg(short, long, default_value = "false")]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let output = cli
        .output
        .unwrap_or_else(|| PathBuf::from(cli.sweep.default_output()));

    tracing::info!("Reading {}", cli.input.display());
    let summary = build_chart(&cli.input, &output, cli.sweep, cli.max_train_loss)?;

    tracing::info!(
        "Plotted {} of {} rows in {} series: {}",
        summary.rows_plotted,
        summary.rows_read,
        summary.series.len(),
        summary.series.join(", ")
    );
    tracing::info!("Chart written to {}", output.display());

    Ok(())
}
