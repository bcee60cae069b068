use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use simdiff::core::{Config, SizeRange, WritePolicy};
use simdiff::{compare, export, netlist};

/// Simulator validation toolkit
#[derive(Parser)]
#[command(name = "simdiff", version, about)]
struct Cli {
    /// TOML configuration file; flags override its values
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Worker threads for comparisons (default: one per CPU)
    #[arg(short, long, global = true)]
    jobs: Option<usize>,

    /// Log debug output (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Percentage error of candidate exports against reference exports
    Compare(CompareArgs),
    /// Write resistor-ladder stress netlists
    Generate(GenerateArgs),
    /// Split stepped exports into one CSV per run
    Separate {
        /// Stepped export files, e.g. LT.csv
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Resample exports onto a uniform time grid
    Standardize(StandardizeArgs),
}

#[derive(Args)]
struct CompareArgs {
    /// Directory of reference exports
    #[arg(long)]
    reference: Option<PathBuf>,
    /// Directory of candidate exports
    #[arg(long)]
    candidate: Option<PathBuf>,
    /// Substring marking reference exports
    #[arg(long)]
    marker: Option<String>,
    /// Directory for SVG plots
    #[arg(long)]
    plot_dir: Option<PathBuf>,
    /// Skip plotting
    #[arg(long)]
    no_plots: bool,
    /// Compare rows by position without checking time-step spacing
    #[arg(long)]
    no_step_check: bool,
    /// Write the aggregate table as CSV
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Write the aggregate table as JSON
    #[arg(long)]
    json: Option<PathBuf>,
}

#[derive(Args)]
struct GenerateArgs {
    /// Output directory
    #[arg(long)]
    out: Option<PathBuf>,
    #[arg(long)]
    start: Option<usize>,
    /// Exclusive upper bound
    #[arg(long)]
    stop: Option<usize>,
    #[arg(long)]
    step: Option<usize>,
    /// Append to existing files instead of replacing them
    #[arg(long)]
    append: bool,
}

#[derive(Args)]
struct StandardizeArgs {
    /// Directory of exports, e.g. RC_test/LT.csvs
    dir: PathBuf,
    /// Grid spacing in seconds
    #[arg(long)]
    timestep: Option<f64>,
    /// Prefix for resampled files
    #[arg(long)]
    marker: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if cli.jobs.is_some() {
        config.jobs = cli.jobs;
    }

    match cli.command {
        Command::Compare(args) => run_compare(config, args),
        Command::Generate(args) => run_generate(config, args),
        Command::Separate { files } => run_separate(&files),
        Command::Standardize(args) => run_standardize(config, args),
    }
}

fn run_compare(config: Config, args: CompareArgs) -> Result<()> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(config.jobs())
        .build_global()
        .context("failed to start worker pool")?;

    let mut cfg = config.compare;
    if let Some(dir) = args.reference {
        cfg.reference_dir = dir;
    }
    if let Some(dir) = args.candidate {
        cfg.candidate_dir = dir;
    }
    if let Some(marker) = args.marker {
        cfg.marker = marker;
    }
    if let Some(dir) = args.plot_dir {
        cfg.plot_dir = dir;
    }
    cfg.plot &= !args.no_plots;
    cfg.check_step_spacing &= !args.no_step_check;

    let pairs = compare::find_pairs(&cfg)?;
    info!(
        pairs = pairs.len(),
        reference = %cfg.reference_dir.display(),
        candidate = %cfg.candidate_dir.display(),
        "comparing"
    );

    let result = compare::aggregate_and_plot(&pairs, &cfg)?;
    print!("{}", result.to_text());

    if let Some(path) = args.csv {
        result.write_csv(&path)?;
        info!(path = %path.display(), "aggregate CSV written");
    }
    if let Some(path) = args.json {
        std::fs::write(&path, result.to_json()?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "aggregate JSON written");
    }

    Ok(())
}

fn run_generate(config: Config, args: GenerateArgs) -> Result<()> {
    let mut cfg = config.generator;
    if let Some(dir) = args.out {
        cfg.output_dir = dir;
    }
    cfg.sizes = SizeRange::new(
        args.start.unwrap_or(cfg.sizes.start),
        args.stop.unwrap_or(cfg.sizes.stop),
        args.step.unwrap_or(cfg.sizes.step),
    )?;
    if args.append {
        cfg.write_policy = WritePolicy::Append;
    }

    let written = netlist::generate_all(&cfg)?;
    info!(count = written.len(), dir = %cfg.output_dir.display(), "generation complete");
    Ok(())
}

fn run_separate(files: &[PathBuf]) -> Result<()> {
    for file in files {
        let written = export::separate(file)
            .with_context(|| format!("failed to separate {}", file.display()))?;
        info!(source = %file.display(), runs = written.len(), "separated");
    }
    Ok(())
}

fn run_standardize(config: Config, args: StandardizeArgs) -> Result<()> {
    let mut cfg = config.standardize;
    if let Some(timestep) = args.timestep {
        cfg.timestep = timestep;
    }
    if let Some(marker) = args.marker {
        cfg.marker = marker;
    }

    let written = export::standardize_dir(&args.dir, &cfg)?;
    info!(count = written.len(), dir = %args.dir.display(), "standardization complete");
    Ok(())
}
