//! CLI command implementations.

pub mod export;
pub mod histogram;
pub mod impulse;
pub mod init;
pub mod run;

use anyhow::{Context, Result};
use colored::Colorize;
use ecoevo::prelude::*;
use indicatif::{ProgressBar, ProgressStyle};

/// Build a simulation from config and evolve it for `ticks` ticks behind a
/// progress bar.
pub(crate) fn evolve(config: SimulationConfig, ticks: u64, verbose: bool) -> Result<(Simulation, RunTotals)> {
    let mut sim = Simulation::new(config).context("Failed to create simulation")?;
    if ticks == 0 {
        return Ok((sim, RunTotals::default()));
    }

    println!(
        "{} Running {} ticks...",
        "→".blue(),
        ticks.to_string().cyan()
    );

    let pb = ProgressBar::new(ticks);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ticks")
            .context("Invalid progress template")?
            .progress_chars("#>-"),
    );

    let mut totals = RunTotals::default();
    for _ in 0..ticks {
        let events = sim.step();
        if verbose && !events.triggered.is_empty() {
            pb.println(format!(
                "  tick {}: {} bridged",
                events.tick,
                events.triggered.len()
            ));
        }
        totals.absorb(events);
        pb.inc(1);
    }
    pb.finish_and_clear();

    Ok((sim, totals))
}
