//! Command-line interface components.
//!
//! A thin front end over [`TlcDataLoader`]: lists the catalog's columns and
//! months, or loads a selection and prints a summary of the result.

use crate::config::LoaderConfig;
use crate::constants::{
    DEFAULT_BATCH_SIZE, DEFAULT_FILE_PREFIX, DEFAULT_RAW_DATA_DIR, DEFAULT_SAMPLE_RATIO,
};
use crate::loader::{TlcDataLoader, batch::concat_frames};
use crate::models::LoadOptions;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use polars::prelude::DataFrame;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "tlc_loader")]
#[command(about = "Load monthly NYC TLC trip-record Parquet partitions with bounded memory")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Raw data directory holding one partition file per month
    #[arg(short, long, global = true, default_value = DEFAULT_RAW_DATA_DIR)]
    pub root: PathBuf,

    /// Partition file name prefix
    #[arg(long, global = true, default_value = DEFAULT_FILE_PREFIX)]
    pub prefix: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the columns declared by the catalog
    Features,
    /// List the months with a partition file
    Months,
    /// Load a selection of columns and months
    Load(LoadArgs),
}

#[derive(Parser, Debug)]
pub struct LoadArgs {
    /// Comma-separated column names, returned in this order
    #[arg(short, long, value_delimiter = ',', required = true)]
    pub features: Vec<String>,

    /// Comma-separated months (YYYY-MM); all available months when omitted
    #[arg(short, long, value_delimiter = ',')]
    pub months: Vec<String>,

    /// Months loaded together per batch
    #[arg(short, long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Load every month in one pass instead of batching
    #[arg(long)]
    pub single_pass: bool,

    /// Fraction of rows kept per partition, in (0, 1]
    #[arg(long, default_value_t = DEFAULT_SAMPLE_RATIO)]
    pub sample_ratio: f64,

    /// Keep rows with non-positive distance, duration or fare
    #[arg(long)]
    pub no_clean: bool,

    /// Sampling seed; fresh randomness when omitted with --unseeded
    #[arg(long, conflicts_with = "unseeded")]
    pub seed: Option<u64>,

    /// Sample without a fixed seed
    #[arg(long)]
    pub unseeded: bool,

    /// Rows of the result to print
    #[arg(long, default_value_t = 10)]
    pub head: usize,
}

impl LoadArgs {
    fn options(&self) -> LoadOptions {
        LoadOptions::default()
            .with_sample_ratio(self.sample_ratio)
            .with_clean(!self.no_clean)
    }
}

/// Run the parsed command
pub async fn run(args: Args) -> Result<()> {
    setup_logging(&args);
    debug!("Command line arguments: {:?}", args);

    let mut config = LoaderConfig {
        file_prefix: args.prefix.clone(),
        ..Default::default()
    };
    if let Command::Load(load_args) = &args.command {
        if load_args.unseeded {
            config.sample_seed = None;
        } else if let Some(seed) = load_args.seed {
            config.sample_seed = Some(seed);
        }
    }

    let loader = TlcDataLoader::new(args.root.clone())
        .and_then(|loader| loader.with_config(config))
        .with_context(|| format!("Failed to open raw data root {}", args.root.display()))?;

    match args.command {
        Command::Features => {
            let features = loader.list_features()?;
            println!(
                "{} ({} total)",
                "Available columns".bright_green().bold(),
                features.len()
            );
            for feature in features {
                println!("  - {}", feature);
            }
        }
        Command::Months => {
            let months = loader.available_months()?;
            println!(
                "{} ({} total)",
                "Available months".bright_green().bold(),
                months.len()
            );
            for month in months {
                println!("  - {}", month);
            }
        }
        Command::Load(load_args) => {
            // Polars work is blocking; keep it off the async workers
            let df = tokio::task::spawn_blocking(move || run_load(&loader, &load_args))
                .await
                .context("Load task failed")??;
            debug!("Load returned {} columns", df.width());
        }
    }

    Ok(())
}

fn run_load(loader: &TlcDataLoader, args: &LoadArgs) -> Result<DataFrame> {
    let start_time = Instant::now();
    let months: Vec<String> = if args.months.is_empty() {
        loader
            .available_months()?
            .iter()
            .map(ToString::to_string)
            .collect()
    } else {
        args.months.clone()
    };

    println!("{}", "Loading TLC trip records".bright_green().bold());
    println!("  {} {}", "Root:".bright_cyan(), loader.root().display());
    println!("  {} {}", "Months:".bright_cyan(), months.join(", "));
    println!("  {} {}", "Columns:".bright_cyan(), args.features.join(", "));

    let df = if args.single_pass {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .context("Invalid progress template")?,
        );
        spinner.set_message(format!("Loading {} partitions...", months.len()));
        spinner.enable_steady_tick(Duration::from_millis(100));

        let df = loader.load(&args.features, &months, args.options())?;
        spinner.finish_with_message(format!("Loaded {} partitions", months.len()));
        df
    } else {
        load_with_progress(loader, args, &months, args.batch_size)?
    };

    println!("\n{}", "Load Summary".bright_green().bold());
    println!(
        "  {} {}ms",
        "Time elapsed:".bright_cyan(),
        start_time.elapsed().as_millis().to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Total rows:".bright_cyan(),
        df.height().to_string().bright_white().bold()
    );
    println!("{}", df.head(Some(args.head)));

    Ok(df)
}

fn load_with_progress(
    loader: &TlcDataLoader,
    args: &LoadArgs,
    months: &[String],
    batch_size: usize,
) -> Result<DataFrame> {
    let batches = loader.iter_batches(&args.features, months, batch_size, args.options())?;

    let pb = ProgressBar::new(batches.total_batches() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .context("Invalid progress template")?
            .progress_chars("#>-"),
    );
    pb.set_message("Loading batches");

    let mut frames = Vec::with_capacity(batches.total_batches());
    for frame in batches {
        let frame = frame?;
        pb.set_message(format!("Last batch: {} rows", frame.height()));
        pb.inc(1);
        frames.push(frame);
    }
    pb.finish_with_message("All batches loaded");

    Ok(concat_frames(frames, loader.config().parallel_scan)?)
}

/// Set up structured logging based on CLI arguments
fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = if args.verbose { "debug" } else { "info" };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tlc_loader={}", log_level)));

    // try_init: a subscriber may already be installed when run from tests
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stderr),
        )
        .try_init();

    debug!("Logging initialized at level: {}", log_level);
}
