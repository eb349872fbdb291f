//! Kilonova lightcurve predictions for a gravitational-wave event.
//!
//! Usage:
//! ```
//! cargo run --release --bin kn_event -- --model DiUj2017,Me2017 --do-event
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use kilonova_lightcurves::{run, AnalysisConfig, KnModel, ModelParameters, TimeGrid};

#[derive(Parser, Debug)]
#[command(
    name = "kn_event",
    version,
    about = "Kilonova lightcurves from compact-binary posterior samples",
    long_about = None
)]
struct Args {
    /// Directory for per-sample tables and the run summary
    #[arg(short, long, default_value = "../output")]
    output_dir: PathBuf,

    /// Directory for figures and envelope tables
    #[arg(short, long, default_value = "../plots")]
    plot_dir: PathBuf,

    /// Data directory; posterior samples default to <data-dir>/event_data/<name>.dat
    #[arg(short, long, default_value = "../data")]
    data_dir: PathBuf,

    /// Posterior sample table
    #[arg(long)]
    posterior_samples: Option<PathBuf>,

    /// Directory holding observed event photometry
    #[arg(short, long, default_value = "../lightcurves")]
    lightcurves_dir: PathBuf,

    /// Comma-separated kilonova models
    #[arg(short, long, default_value = "DiUj2017,Me2017")]
    model: String,

    /// Event name
    #[arg(long, default_value = "G298048")]
    name: String,

    /// Overlay observed photometry
    #[arg(long)]
    do_event: bool,

    /// Photometry file stem inside the lightcurves directory
    #[arg(short, long, default_value = "G298048_PS1_GROND_SOFI")]
    event: String,

    /// Luminosity distance [Mpc]
    #[arg(long, default_value_t = 40.0, value_parser = parse_distance)]
    distance: f64,

    /// Merger time [MJD]
    #[arg(long, default_value_t = 57982.5285236896)]
    t0: f64,

    /// JSON file overriding model parameters
    #[arg(long)]
    params: Option<PathBuf>,

    /// Keep at most this many posterior samples
    #[arg(long)]
    downsample: Option<usize>,

    /// Seed for downsampling
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Keep samples with negative tidal deformability
    #[arg(long)]
    keep_negative_lambda: bool,
}

fn parse_distance(s: &str) -> std::result::Result<f64, String> {
    let d: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if d.is_finite() && d > 0.0 {
        Ok(d)
    } else {
        Err(format!("distance must be a positive number of Mpc, got {s}"))
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let models = KnModel::parse_list(&args.model)?;

    let params = match &args.params {
        Some(path) => ModelParameters::from_json_file(path)
            .with_context(|| format!("reading model parameters from {}", path.display()))?,
        None => ModelParameters::default(),
    };
    let grid = TimeGrid::new(params.tini, params.tmax, TimeGrid::default().dt)?;

    let posterior_samples = args.posterior_samples.unwrap_or_else(|| {
        args.data_dir
            .join("event_data")
            .join(format!("{}.dat", args.name))
    });

    let config = AnalysisConfig {
        output_dir: args.output_dir,
        plot_dir: args.plot_dir,
        posterior_samples,
        lightcurves_dir: args.lightcurves_dir,
        models,
        name: args.name,
        do_event: args.do_event,
        event: args.event,
        distance: args.distance,
        t0: args.t0,
        params,
        grid,
        remove_negative_lambda: !args.keep_negative_lambda,
        downsample: args.downsample,
        seed: args.seed,
    };

    let summary = run(&config).with_context(|| format!("analysing {}", config.name))?;
    for model in &summary.models {
        info!(
            "{}: {}/{} lightcurves, median mej {:?}",
            model.model, model.accepted, model.rows, model.mej.p50
        );
    }
    info!("figures in {}", summary.plot_dir.display());
    Ok(())
}
