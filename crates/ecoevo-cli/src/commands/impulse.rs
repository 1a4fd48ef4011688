//! Measure the impulse response of an evolved graph.

use anyhow::{Context, Result};
use colored::Colorize;

use crate::config::Config;

const BAR_WIDTH: usize = 40;

pub fn run(channel: usize, amplitude: f64, steps: usize, warmup: u64, seed: Option<u64>) -> Result<()> {
    let config = Config::load()?;
    let (mut sim, _) = super::evolve(config.simulation_with(seed), warmup, false)?;

    let response = sim
        .impulse_response(channel, amplitude, steps)
        .with_context(|| format!("Impulse on channel {channel} failed"))?;

    let stats = sim.stats();
    println!(
        "{} Impulse response: channel {}, amplitude {}, after {} ticks ({} nodes, {} edges)",
        "→".blue(),
        channel.to_string().cyan(),
        amplitude.to_string().cyan(),
        stats.tick.to_string().cyan(),
        stats.node_count,
        stats.edge_count
    );
    println!();

    let peak = response.iter().cloned().fold(0.0, f64::max);
    for (k, norm) in response.iter().enumerate() {
        let filled = if peak > 0.0 {
            ((norm / peak) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        println!(
            "  {:>4}  {:>10.6}  {}",
            k,
            norm,
            "#".repeat(filled).green()
        );
    }

    let energy: f64 = response.iter().map(|v| v * v).sum();
    println!();
    println!("  Peak: {}", format!("{peak:.6}").green());
    println!("  Energy: {}", format!("{energy:.6}").green());

    Ok(())
}
