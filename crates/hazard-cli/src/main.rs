/// Command-line runner for the hazard definitions: prints the registry,
/// computes one hazard over JSON inputs, or exercises every registered
/// hazard on synthetic data.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use hazard_core::calendar::ModelCalendar;
use hazard_core::registry::{self, Variable};
use hazard_core::synthetic::SyntheticDataset;
use hazard_core::units::DataSource;
use hazard_core::{DailySource, HazardLayers, HazardRequest, MemorySeries, Raster};

#[derive(Parser, Debug)]
#[command(name = "hazard-cli", version, about = "Annual climate-hazard indicator runner")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the hazard registry as JSON.
    Registry,
    /// Compute one hazard for one or more years.
    Compute(ComputeArgs),
    /// Run every registered hazard on a synthetic dataset.
    Demo(DemoArgs),
}

#[derive(Args, Debug)]
struct ComputeArgs {
    /// Hazard name (registered, or `ehe`).
    #[arg(long)]
    hazard: String,

    /// Year to compute (repeatable).
    #[arg(long, required = true)]
    year: Vec<i32>,

    /// Climate model; omit for observed data or the model-mean percentiles.
    #[arg(long)]
    model: Option<String>,

    /// Treat the series as gridded observations rather than model output.
    #[arg(long)]
    observed: bool,

    /// Daily series JSON: array of `{date, scenario, raster}` records.
    #[arg(long)]
    series: PathBuf,

    /// Static layers JSON (percentiles, susceptibility, ARI 95th percentile).
    #[arg(long)]
    layers: PathBuf,

    /// Output file; stdout when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct DemoArgs {
    #[arg(long, default_value_t = 42)]
    seed: u64,

    #[arg(long, default_value_t = 32)]
    width: usize,

    #[arg(long, default_value_t = 16)]
    height: usize,

    #[arg(long, default_value_t = 2030)]
    year: i32,

    /// Model whose calendar and percentiles the demo uses.
    #[arg(long, default_value = "CanESM2")]
    model: String,
}

#[derive(Serialize)]
struct HazardRecord<'a> {
    hazard: &'a str,
    model: Option<&'a str>,
    year: i32,
    raster: &'a Raster,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Registry => {
            println!("{}", registry::registry_json()?);
            Ok(())
        }
        Command::Compute(args) => compute(args),
        Command::Demo(args) => demo(args),
    }
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn compute(args: ComputeArgs) -> Result<()> {
    let (variable, definition) = registry::definition(&args.hazard)?;
    let series = MemorySeries::from_json(&read_file(&args.series)?)
        .with_context(|| format!("parsing series {}", args.series.display()))?;
    let layers = HazardLayers::from_json(&read_file(&args.layers)?)
        .with_context(|| format!("parsing layers {}", args.layers.display()))?;

    tracing::info!(
        hazard = %args.hazard,
        variable = variable.name(),
        days = series.len(),
        years = args.year.len(),
        "loaded inputs"
    );

    let template = HazardRequest {
        year: 0,
        model: args.model.clone(),
        data_source: DataSource::from_observed_flag(args.observed),
    };

    let mut rasters = Vec::with_capacity(args.year.len());
    for (year, result) in registry::compute_years(definition, &series, &layers, &template, &args.year) {
        let raster = result.with_context(|| format!("{} for {year}", args.hazard))?;
        rasters.push((year, raster));
    }

    let records: Vec<HazardRecord> = rasters
        .iter()
        .map(|(year, raster)| HazardRecord {
            hazard: &args.hazard,
            model: args.model.as_deref(),
            year: *year,
            raster,
        })
        .collect();
    let json = serde_json::to_string_pretty(&records)?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            tracing::info!(path = %path.display(), records = records.len(), "wrote results");
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn demo(args: DemoArgs) -> Result<()> {
    let dataset = SyntheticDataset {
        seed: args.seed,
        width: args.width,
        height: args.height,
        first_year: args.year,
        last_year: args.year,
        calendar: ModelCalendar::for_model(Some(&args.model)),
        data_source: DataSource::Modeled,
    };
    let pr = dataset.precip_series()?;
    let tasmax = dataset.tasmax_series()?;
    let layers = dataset.layers(&[args.model.as_str()])?;
    let request = HazardRequest::modeled(args.year, &args.model);

    println!(
        "{} {}x{} seed={} ({:?} calendar)",
        args.year, args.width, args.height, args.seed, dataset.calendar
    );
    println!("{:<14} {:>10} {:>10} {:>10}", "hazard", "min", "mean", "max");
    for h in registry::all() {
        let source: &dyn DailySource = match h.variable {
            Variable::Tasmax | Variable::Tasmin => &tasmax,
            Variable::Pr => &pr,
        };
        let r = h
            .compute(source, &layers, &request)
            .with_context(|| format!("demo hazard {}", h.name))?;
        println!(
            "{:<14} {:>10.2} {:>10.2} {:>10.2}",
            h.name,
            r.min_value(),
            r.mean_value(),
            r.max_value()
        );
    }
    Ok(())
}
