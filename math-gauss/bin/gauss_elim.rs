//! Gaussian elimination benchmark
//!
//! Generates a random N×N system, solves it with a pool of worker threads,
//! and reports the elapsed wall and CPU time.
//!
//! Usage:
//!   cargo run --release --bin gauss_elim -- <workers> <dimension> [seed]
//!   cargo run --release --bin gauss_elim -- 8 2000 42 --chunk-size 16 --check
//!   cargo run --release --bin gauss_elim -- --help

use clap::{Parser, ValueEnum};
use math_gauss::config::{ConfigOverrides, PivotMode};
use math_gauss::generate::{DEFAULT_ENTRY_RANGE, fill_uniform, time_seed};
use math_gauss::report::{format_inputs, format_parameters, format_solution, format_timing};
use math_gauss::{
    GaussConfig, GaussSolver, Schedule, SolveReport, SystemStore, checked_dimension,
    checked_workers, max_residual,
};
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gauss_elim")]
#[command(
    about = "Parallel Gaussian elimination without pivoting (single precision)",
    long_about = None,
    allow_negative_numbers = true
)]
struct Cli {
    /// Number of worker threads
    workers: i64,

    /// Matrix dimension N
    dimension: i64,

    /// Random seed (defaults to one derived from the clock)
    seed: Option<u64>,

    /// Path to JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Rows per chunk handed to a worker
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Row distribution strategy
    #[arg(long, value_enum)]
    schedule: Option<ScheduleChoice>,

    /// Degenerate pivot handling
    #[arg(long, value_enum)]
    pivot_policy: Option<PivotChoice>,

    /// Pivot magnitude at or below which fail-fast rejects the system
    #[arg(long)]
    tolerance: Option<f64>,

    /// Keep a copy of the inputs and report max |A*X - B|
    #[arg(long)]
    check: bool,

    /// Write a JSON run summary to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ScheduleChoice {
    Dynamic,
    Static,
}

impl From<ScheduleChoice> for Schedule {
    fn from(choice: ScheduleChoice) -> Self {
        match choice {
            ScheduleChoice::Dynamic => Schedule::Dynamic,
            ScheduleChoice::Static => Schedule::Static,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum PivotChoice {
    FailFast,
    Propagate,
}

impl From<PivotChoice> for PivotMode {
    fn from(choice: PivotChoice) -> Self {
        match choice {
            PivotChoice::FailFast => PivotMode::FailFast,
            PivotChoice::Propagate => PivotMode::Propagate,
        }
    }
}

fn build_config(args: &Cli) -> Result<GaussConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => {
            println!("Loading configuration from: {}", path.display());
            GaussConfig::from_file(path)?
        }
        None => GaussConfig::default(),
    };

    let overrides = ConfigOverrides {
        workers: Some(checked_workers(args.workers)?),
        chunk_size: args.chunk_size,
        schedule: args.schedule.map(Schedule::from),
        pivot_mode: args.pivot_policy.map(PivotMode::from),
        tolerance: args.tolerance,
        progress_every: (args.verbose && config.progress_every == 0).then_some(100),
    };
    config.apply_overrides(&overrides)?;
    Ok(config)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();

    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = build_config(&args)?;
    let dim = checked_dimension(args.dimension, config.capacity)?;
    let seed = args.seed.unwrap_or_else(time_seed);

    print!("{}", format_parameters(&config, dim, Some(seed)));

    println!("\nInitializing...");
    let mut store = SystemStore::<f32>::with_capacity(dim, config.capacity)?;
    fill_uniform(&mut store, seed, DEFAULT_ENTRY_RANGE)?;
    if let Some(text) = format_inputs(&store) {
        print!("\n{text}");
    }
    let original = args.check.then(|| store.clone());

    let solver = GaussSolver::new(config)?;

    println!("\nStarting clock.");
    let timing = solver.solve(&mut store)?;
    println!("Stopped clock.");

    if let Some(text) = format_solution(&store) {
        print!("\n{text}");
    }

    let mut report = SolveReport::new(solver.config(), dim, Some(seed), &timing);
    if let Some(original) = &original {
        report = report.with_residual(max_residual(original.a(), original.b(), store.x()));
    }
    print!("\n{}", format_timing(&report));

    if let Some(path) = &args.output {
        println!("Saving results to: {}", path.display());
        fs::write(path, serde_json::to_string_pretty(&report)?)?;
    }

    Ok(())
}
