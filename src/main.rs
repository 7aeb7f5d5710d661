use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rainplan::{
    DailyBalanceRecord, FinalGeneration, PlannedDay, RainfallSeries, RunConfig, TraceSummary,
    optimize, report, schedule,
};
use serde::Serialize;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "rainplan",
    version,
    about = "Plan daily rainwater usage against a rainfall forecast"
)]
struct Cli {
    /// JSON array of `{ "date": "YYYY-MM-DD", "predicted_rainfall_mm": f64 }`.
    #[arg(long)]
    forecast: PathBuf,

    /// JSON run configuration; missing fields use the built-in defaults.
    #[arg(long, env = "RAINPLAN_CONFIG")]
    config: Option<PathBuf>,

    /// Override the optimizer seed.
    #[arg(long, env = "RAINPLAN_SEED")]
    seed: Option<u64>,

    #[arg(long)]
    generations: Option<usize>,

    #[arg(long)]
    population_size: Option<usize>,

    /// Score the last generation's offspring before choosing a plan.
    #[arg(long)]
    evaluate_offspring: bool,
}

#[derive(Serialize)]
struct PlanReport {
    fitness: f64,
    generations_run: usize,
    schedule: Vec<PlannedDay>,
    trace: Vec<DailyBalanceRecord>,
    summary: Option<TraceSummary>,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.optimizer.seed = seed;
    }
    if let Some(generations) = cli.generations {
        config.optimizer.generations = generations;
    }
    if let Some(population_size) = cli.population_size {
        config.optimizer.population_size = population_size;
    }
    if cli.evaluate_offspring {
        config.optimizer.final_generation = FinalGeneration::EvaluateOffspring;
    }
    config.validate()?;

    let raw = fs::read_to_string(&cli.forecast)
        .with_context(|| format!("failed to read forecast {}", cli.forecast.display()))?;
    let forecast: RainfallSeries = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse forecast {}", cli.forecast.display()))?;
    info!(
        days = forecast.len(),
        seed = config.optimizer.seed,
        "loaded forecast"
    );

    let outcome = optimize(&forecast, &config.tank, &config.bounds, &config.optimizer)?;
    let trace = report(outcome.plan(), &forecast, &config.tank)?;
    let summary = TraceSummary::from_records(&trace, config.bounds.usage_max);

    let output = PlanReport {
        fitness: outcome.fitness(),
        generations_run: outcome.generations_run,
        schedule: schedule(outcome.plan(), &forecast)?,
        trace,
        summary,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}
