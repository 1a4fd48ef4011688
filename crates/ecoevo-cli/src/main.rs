//! Ecoevo CLI - run and inspect self-rewiring graph simulations.

mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;

#[derive(Parser)]
#[command(name = "ecoevo")]
#[command(author, version, about = "Ecoevo - self-rewiring computation graphs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default ecoevo.toml
    Init {
        /// Project directory (default: current directory)
        #[arg(short, long)]
        path: Option<String>,
    },

    /// Run the simulation and report structural change
    Run {
        /// Number of ticks to run (default: from config)
        #[arg(short, long)]
        ticks: Option<u64>,

        /// RNG seed (default: from config)
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Evolve the graph, then measure its impulse response
    Impulse {
        /// Input channel to drive
        #[arg(short, long, default_value = "0")]
        channel: usize,

        /// Impulse amplitude
        #[arg(short, long, default_value = "1.0")]
        amplitude: f64,

        /// Propagation steps to record
        #[arg(short = 'k', long, default_value = "20")]
        steps: usize,

        /// Ticks to evolve before measuring
        #[arg(short, long, default_value = "0")]
        warmup: u64,

        /// RNG seed (default: from config)
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Show degree, activation and weight distributions
    Histogram {
        /// Number of ticks to run first (default: from config)
        #[arg(short, long)]
        ticks: Option<u64>,

        /// RNG seed (default: from config)
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Export a graph snapshot as JSON
    Export {
        /// Output file path
        output: String,

        /// Number of ticks to run first (default: from config)
        #[arg(short, long)]
        ticks: Option<u64>,

        /// RNG seed (default: from config)
        #[arg(short, long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Init { path } => commands::init::run(path),
        Commands::Run { ticks, seed } => commands::run::run(ticks, seed, cli.verbose),
        Commands::Impulse {
            channel,
            amplitude,
            steps,
            warmup,
            seed,
        } => commands::impulse::run(channel, amplitude, steps, warmup, seed),
        Commands::Histogram { ticks, seed } => commands::histogram::run(ticks, seed),
        Commands::Export { output, ticks, seed } => commands::export::run(&output, ticks, seed),
    }
}
