//! inpaint - interactive TV inpainting driver
//!
//! Runs a Huber-ROF primal-dual session on a synthetic capture source with
//! scripted pointer strokes and run/step commands.

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "inpaint")]
#[command(author, version, about = "Interactive TV inpainting (Huber-ROF primal-dual)")]
#[command(long_about = "
Drives an inpainting session tick by tick: capture a frame, run a batch of
primal-dual iterations, paint the trust mask under the pointer.

Examples:
  inpaint run                                   # disc pattern, 30 ticks
  inpaint run -p ramp -s 64x48 --paint 32,24    # mask a hole in a ramp
  inpaint run --paused --at 3:step --at 5:toggle
  inpaint run -c inpaint.yaml -b serial -n 100
  inpaint config > inpaint.yaml                 # default configuration
  inpaint config --check inpaint.yaml
  inpaint backends
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (-v ticks, -vv debug log)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Number of threads (0 = auto)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scripted session on a test pattern
    #[command(visible_alias = "r")]
    Run(RunArgs),

    /// Print or validate a configuration
    Config(ConfigArgs),

    /// List compute backends
    Backends,
}

#[derive(Args)]
struct RunArgs {
    /// Configuration file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Test pattern: disc, ramp, checker[:CELL], constant[:LEVEL]
    #[arg(short, long, default_value = "disc")]
    pattern: String,

    /// Frame size WIDTHxHEIGHT
    #[arg(short, long, default_value = "128x96")]
    size: String,

    /// Number of ticks to run
    #[arg(short = 'n', long, default_value = "30")]
    ticks: u64,

    /// Pattern drift in pixels per captured frame
    #[arg(long, default_value = "0")]
    drift: u32,

    /// Pointer stroke: press at X,Y for one tick each, in order
    #[arg(long = "paint", value_name = "X,Y")]
    paint: Vec<String>,

    /// Queue a command before a tick: TICK:toggle or TICK:step
    #[arg(long = "at", value_name = "TICK:CMD")]
    commands: Vec<String>,

    /// Start paused (only the first tick iterates)
    #[arg(long)]
    paused: bool,

    /// Compute backend: auto, cpu, serial
    #[arg(short, long)]
    backend: Option<String>,

    /// Inner iterations per tick
    #[arg(short, long)]
    iterations: Option<usize>,

    /// Stop a tick early once max |u_k - u_k-1| is below this
    #[arg(long)]
    tolerance: Option<f32>,

    /// Brush radius in pixels
    #[arg(short, long)]
    radius: Option<f32>,
}

#[derive(Args)]
struct ConfigArgs {
    /// Validate this file instead of printing defaults
    #[arg(long, value_name = "FILE")]
    check: Option<PathBuf>,

    /// Write the default configuration to FILE
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Configure thread pool
    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    match cli.command {
        Commands::Run(args) => commands::run::run(args, cli.verbose),
        Commands::Config(args) => commands::config::run(args, cli.verbose),
        Commands::Backends => commands::backends::run(cli.verbose),
    }
}
