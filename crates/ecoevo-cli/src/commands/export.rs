//! Export a graph snapshot.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

use crate::config::Config;

pub fn run(output: &str, ticks: Option<u64>, seed: Option<u64>) -> Result<()> {
    let config = Config::load()?;
    let ticks = ticks.unwrap_or(config.run.ticks);
    let (sim, _) = super::evolve(config.simulation_with(seed), ticks, false)?;

    let snapshot = sim.snapshot();
    let content = snapshot.to_json().context("Failed to serialize snapshot")?;
    let output_path = Path::new(output);
    std::fs::write(output_path, content)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    println!();
    println!("{} Exported to {}", "✓".green().bold(), output.cyan());
    println!("  Snapshot: {}", snapshot.metadata.snapshot_id.dimmed());
    println!("  Tick: {}", snapshot.metadata.tick.to_string().cyan());
    println!("  Nodes: {}", snapshot.metadata.node_count.to_string().cyan());
    println!("  Edges: {}", snapshot.metadata.edge_count.to_string().cyan());

    Ok(())
}
